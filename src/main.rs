//! Main application entry point.
//!
//! Parses the command line and hands control to the matching command in
//! `ephemeris::commands`. Errors from any command end up here, are logged as a
//! closing error line, and turn into a non-zero exit status.

use anyhow::Result;

use ephemeris::args::{self, CliAction, ParsedArgs};
use ephemeris::commands;
use ephemeris::constants::EXIT_FAILURE;
use ephemeris::log_error_exit;

fn main() {
    let parsed_args = ParsedArgs::from_env();

    if let Err(e) = dispatch(parsed_args.action) {
        log_error_exit!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn dispatch(action: CliAction) -> Result<()> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => commands::run::handle_run_command(debug_enabled, config_dir.as_deref()),
        CliAction::List {
            debug_enabled,
            config_dir,
        } => commands::list::handle_list_command(debug_enabled, config_dir.as_deref()),
        CliAction::Today {
            debug_enabled,
            config_dir,
        } => commands::today::handle_today_command(debug_enabled, config_dir.as_deref()),
        CliAction::Describe {
            debug_enabled,
            config_dir,
        } => {
            ephemeris::logger::Log::set_debug(debug_enabled);
            commands::describe::handle_describe_command(config_dir.as_deref())
        }
        CliAction::Simulate {
            debug_enabled,
            start_time,
            end_time,
            log_to_file,
            config_dir,
        } => commands::simulate::handle_simulate_command(
            debug_enabled,
            &start_time,
            &end_time,
            log_to_file,
            config_dir.as_deref(),
        ),
    }
}
