//! Command-line interface for envrun

use crate::config::Precedence;
use argh::FromArgs;

/// Run a command with environment variables loaded from a definitions file
#[derive(FromArgs, Debug)]
pub struct EnvRunArgs {
    /// the file from which to read the environment variables (default: .env)
    #[argh(option, short = 'f', default = "String::from(\".env\")")]
    pub file: String,

    /// let existing environment variables win over the file's values; the
    /// file may still reference them as placeholders
    #[argh(switch, short = 'o', long = "override")]
    pub override_env: bool,

    /// print the computed environment and command without running it
    #[argh(switch)]
    pub dry_run: bool,

    /// log level (error, warn, info, debug, trace)
    #[argh(option, short = 'l', default = "String::from(\"warn\")", from_str_fn(parse_log_level))]
    pub log_level: String,

    /// command to run, followed by its arguments
    #[argh(positional, greedy)]
    pub command: Vec<String>,
}

/// Accept only known log levels
fn parse_log_level(s: &str) -> Result<String, String> {
    let level = s.to_lowercase();
    match level.as_str() {
        "error" | "warn" | "info" | "debug" | "trace" => Ok(level),
        _ => Err(format!(
            "Invalid log level '{}'. Expected error, warn, info, debug or trace",
            s
        )),
    }
}

impl EnvRunArgs {
    /// Precedence selected by the override switch
    pub fn precedence(&self) -> Precedence {
        Precedence::from_override(self.override_env)
    }
}
