//! Command line arguments

use crate::core::logging::LogFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Log levels accepted by `--log-level`, least to most verbose
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Hot-swappable module runtime
///
/// Activates every builtin module, reloads them on SIGHUP and tears them down
/// on SIGINT or SIGTERM.
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "hotmod", version)]
pub struct Args {
    /// Configuration file path
    #[arg(long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Module to leave out of every reload (repeatable, or comma separated)
    #[arg(
        long = "exclude-module",
        value_name = "NAME",
        value_delimiter = ',',
        action = ArgAction::Append
    )]
    pub exclude_modules: Vec<String>,

    /// Delay before slow activations are reported, in milliseconds
    #[arg(long = "watchdog-ms", value_name = "MS")]
    pub watchdog_ms: Option<u64>,

    /// Deactivate modules of a failed reload instead of leaving them running
    #[arg(long = "rollback", action = ArgAction::SetTrue)]
    pub rollback: bool,

    /// Log level
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = LOG_LEVELS)]
    pub log_level: Option<String>,

    /// Log output format (text, ext, json)
    #[arg(long = "log-format", value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Write logs to this file instead of stderr
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// More verbose logging (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Less verbose logging (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// List the available modules and exit
    #[arg(long = "list-modules", action = ArgAction::SetTrue)]
    pub list_modules: bool,
}

impl Args {
    /// Net verbosity adjustment from `-v` and `-q`
    pub fn verbosity(&self) -> i16 {
        i16::from(self.verbose) - i16::from(self.quiet)
    }

    /// Colour preference given on the command line, if any
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("hotmod").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args, Args::default());
        assert_eq!(args.verbosity(), 0);
        assert_eq!(args.color_override(), None);
    }

    #[test]
    fn test_exclusions_accept_repeats_and_commas() {
        let args = parse(&["--exclude-module", "clock,heartbeat", "--exclude-module", "extra"]);
        assert_eq!(args.exclude_modules, vec!["clock", "heartbeat", "extra"]);
    }

    #[test]
    fn test_logging_flags() {
        let args = parse(&["--log-level", "debug", "--log-format", "json", "-vv", "-q"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.log_format, Some(LogFormat::Json));
        assert_eq!(args.verbosity(), 1);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let result = Args::try_parse_from(["hotmod", "--log-level", "loud"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_color_flags_conflict() {
        assert_eq!(parse(&["--no-color"]).color_override(), Some(false));
        assert_eq!(parse(&["--color"]).color_override(), Some(true));
        assert!(Args::try_parse_from(["hotmod", "--color", "--no-color"]).is_err());
    }

    #[test]
    fn test_registry_flags() {
        let args = parse(&["--watchdog-ms", "250", "--rollback", "--list-modules"]);
        assert_eq!(args.watchdog_ms, Some(250));
        assert!(args.rollback);
        assert!(args.list_modules);
    }
}
