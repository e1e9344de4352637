//! Command-line argument parsing.
//!
//! playd takes positional arguments only: the output device ID, then
//! optionally the host and port to listen on.

/// Default listen address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 1350;

/// Parsed command-line arguments.
#[derive(Debug)]
pub struct CliArgs {
    /// The requested output device ID, verbatim; validated against the
    /// device list at startup.
    pub device_id: Option<String>,
    /// Address to listen on.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether help was requested or parsing failed.
    pub show_help: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            device_id: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            show_help: false,
        }
    }
}

impl CliArgs {
    /// Parses arguments (without the program name).
    pub fn parse(args: impl Iterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        let mut positional = 0usize;

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => parsed.show_help = true,
                _ if arg.starts_with('-') => {
                    eprintln!("Unknown flag: {arg}");
                    parsed.show_help = true;
                }
                _ => {
                    match positional {
                        0 => parsed.device_id = Some(arg),
                        1 => parsed.host = arg,
                        2 => match arg.parse() {
                            Ok(port) => parsed.port = port,
                            Err(_) => {
                                eprintln!("Invalid port: {arg}");
                                parsed.show_help = true;
                            }
                        },
                        _ => {
                            eprintln!("Unexpected argument: {arg}");
                            parsed.show_help = true;
                        }
                    }
                    positional += 1;
                }
            }
        }

        parsed
    }

    /// Prints usage to stderr.
    pub fn print_usage() {
        eprintln!(
            "Usage:\n  playd <device-id> [host [port]]\n\n\
             Arguments:\n\
             \x20 device-id   Output device to play through (run with no\n\
             \x20             arguments to list the available devices)\n\
             \x20 host        Address to listen on (default {DEFAULT_HOST})\n\
             \x20 port        Port to listen on (default {DEFAULT_PORT})\n\n\
             Environment:\n\
             \x20 RUST_LOG    Log filter, e.g. RUST_LOG=playd=debug\n"
        );
    }
}
