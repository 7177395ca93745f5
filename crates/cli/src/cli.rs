//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::LogLevel;
use std::path::PathBuf;

/// logtree - build hierarchical log dispatch trees from configuration
#[derive(Parser, Debug)]
#[command(
    name = "logtree",
    author,
    version,
    about = "Hierarchical log dispatch trees",
    long_about = "Builds a tree of formatters, sinks and nested dispatchers from a TOML or JSON\n\
                  configuration file, then validates it, prints it, or sends messages through it."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGTREE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Diagnostic log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOGTREE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a configuration file without building sinks
    Validate(ValidateArgs),

    /// Build the tree and print its layout
    Describe(DescribeArgs),

    /// Send messages through the configured logger
    Emit(EmitArgs),
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "logging.toml", env = "LOGTREE_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `describe` command
#[derive(Parser, Debug)]
pub struct DescribeArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "logging.toml", env = "LOGTREE_CONFIG")]
    pub config: PathBuf,

    /// Print the normalized configuration as JSON instead of the tree
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `emit` command
#[derive(Parser, Debug)]
pub struct EmitArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "logging.toml", env = "LOGTREE_CONFIG")]
    pub config: PathBuf,

    /// Level of every emitted message
    #[arg(short, long, default_value = "info")]
    pub level: LogLevel,

    /// Send each message this many times
    #[arg(long, default_value = "1")]
    pub repeat: u32,

    /// Print a delivery summary after shutdown
    #[arg(long)]
    pub stats: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOGTREE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Messages to log
    #[arg(required = true)]
    pub messages: Vec<String>,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_emit() {
        let cli = Cli::try_parse_from([
            "logtree", "-v", "emit", "-c", "x.toml", "--level", "wrn", "hello", "world",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Emit(args) => {
                assert_eq!(args.level, LogLevel::Warn);
                assert_eq!(args.messages, vec!["hello", "world"]);
                assert_eq!(args.repeat, 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_emit_requires_message() {
        assert!(Cli::try_parse_from(["logtree", "emit"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["logtree", "-q", "-v", "validate"]).is_err());
    }
}
