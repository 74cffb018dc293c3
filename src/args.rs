//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. It supports the standard help,
//! version, debug and config flags, one subcommand, and rejects anything else.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon until a shutdown signal arrives
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Print the schedule computed from the current time and exit
    List {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Print today's occurrence of every event and exit
    Today {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Print the thing description as JSON and exit
    Describe {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Fast-forward a simulated clock between two local datetimes
    Simulate {
        debug_enabled: bool,
        start_time: String,
        end_time: String,
        log_to_file: bool,
        config_dir: Option<String>,
    },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped. Flags may appear
    /// before or after the subcommand. `--version` takes precedence over
    /// `--help`, which takes precedence over any error.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut log_to_file = false;
        let mut unknown_arg_found = false;
        let mut config_dir: Option<String> = None;
        let mut positionals: Vec<String> = Vec::new();

        let mut args_iter = args.into_iter().skip(1).map(|s| s.as_ref().to_string());
        while let Some(arg) = args_iter.next() {
            match arg.as_str() {
                "--debug" | "-d" => debug_enabled = true,
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--log" => log_to_file = true,
                "--config" | "-c" => match args_iter.next() {
                    Some(dir) if !dir.starts_with('-') => config_dir = Some(dir),
                    _ => {
                        log_warning!("Missing directory for --config. Usage: --config <dir>");
                        unknown_arg_found = true;
                    }
                },
                _ if arg.starts_with('-') => {
                    log_warning!("Unknown argument: {}", arg);
                    unknown_arg_found = true;
                }
                _ => positionals.push(arg),
            }
        }

        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if display_help {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }
        if unknown_arg_found {
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let (command, operands) = match positionals.split_first() {
            Some((command, operands)) => (command.as_str(), operands),
            None => ("run", &[][..]),
        };

        if log_to_file && command != "simulate" {
            log_warning!("--log is only valid with the simulate command");
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let action = match command {
            "simulate" => match simulation_bounds(operands) {
                Some((start_time, end_time)) => CliAction::Simulate {
                    debug_enabled,
                    start_time,
                    end_time,
                    log_to_file,
                    config_dir,
                },
                None => {
                    log_warning!(
                        "Invalid simulate arguments. Usage: ephemeris simulate \"<start>\" \"<end>\" [--log]"
                    );
                    CliAction::ShowHelpDueToError
                }
            },
            _ if !operands.is_empty() => {
                log_warning!("Unexpected argument after '{}': {}", command, operands[0]);
                CliAction::ShowHelpDueToError
            }
            "run" => CliAction::Run {
                debug_enabled,
                config_dir,
            },
            "list" | "l" => CliAction::List {
                debug_enabled,
                config_dir,
            },
            "today" => CliAction::Today {
                debug_enabled,
                config_dir,
            },
            "describe" => CliAction::Describe {
                debug_enabled,
                config_dir,
            },
            other => {
                log_warning!("Unknown command: {}", other);
                CliAction::ShowHelpDueToError
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Start and end of a simulation, either as two quoted datetimes or as four
/// unquoted date and time words.
fn simulation_bounds(operands: &[String]) -> Option<(String, String)> {
    match operands {
        [start, end] => Some((start.clone(), end.clone())),
        [start_date, start_time, end_date, end_time] => Some((
            format!("{start_date} {start_time}"),
            format!("{end_date} {end_time}"),
        )),
        _ => None,
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    crate::logger::write_output(&format!("┗ {}\n", env!("CARGO_PKG_DESCRIPTION")));
}

// Simulation output goes to the log file only, never to both
const LOG_FLAG_HELP: &str = "                       Add --log to write the output to a file instead";

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("ephemeris [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Track events until interrupted (default)");
    log_indented!("list, l                Print the upcoming occurrence of every event");
    log_indented!("today                  Print today's occurrence of every event");
    log_indented!("describe               Print the thing description as JSON");
    log_indented!("simulate <start> <end> Fast-forward through a time range");
    log_indented!("                       Times are \"YYYY-MM-DD HH:MM:SS\" in the configured zone");
    log_indented!(LOG_FLAG_HELP);
    log_end!();
}
