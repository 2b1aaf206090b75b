use clap::{builder::ValueParser, Arg, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accepts a level name (`info`) or its index (`2`), as used by `ACCESO_LOG_LEVEL`.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        let level = level.trim().to_lowercase();

        if let Ok(index) = level.parse::<u8>() {
            return if usize::from(index) < LEVELS.len() {
                Ok(index)
            } else {
                Err(format!("log level index must be 0-{}", LEVELS.len() - 1))
            };
        }

        LEVELS
            .iter()
            .position(|name| *name == level)
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("invalid log level, expected one of: {}", LEVELS.join(", ")))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Increase log output for the server and the session client (-v warn ... -vvvv trace)")
            .long_help(
                "Increase log output. Repeat the flag or set ACCESO_LOG_LEVEL to a level name (error, warn, info, debug, trace) or its index. RUST_LOG overrides both.",
            )
            .env("ACCESO_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
