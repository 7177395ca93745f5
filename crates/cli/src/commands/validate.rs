//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{LogConfig, LoggerMode};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    mode: LoggerMode,
    min_level: String,
    sink_count: usize,
    dispatcher_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match super::load_config(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    mode: config.mode,
                    min_level: config.min_level.to_string(),
                    sink_count: config.sink_count(),
                    dispatcher_count: config.dispatcher_count(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &LogConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.format.is_none() {
        warnings.push("No root format set - using the default pattern".to_string());
    }
    if config.mode != LoggerMode::AsyncTimer && config.interval_ms != 100 {
        warnings.push(format!(
            "interval_ms = {} has no effect in {:?} mode",
            config.interval_ms, config.mode
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Mode: {:?}", summary.mode);
            println!("  Minimum level: {}", summary.min_level);
            println!("  Sinks: {}", summary.sink_count);
            println!("  Nested dispatchers: {}", summary.dispatcher_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(config: PathBuf) -> ValidateArgs {
        ValidateArgs {
            config,
            json: false,
        }
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let result = validate_config(&args(PathBuf::from("/definitely/not/here.toml")));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not found"));
    }

    #[test]
    fn test_valid_file_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logging.toml");
        std::fs::write(
            &path,
            r#"
mode = "sync"

[[receivers]]
type = "console"

[[receivers]]
type = "dispatcher"

[[receivers.receivers]]
type = "tracing"
"#,
        )
        .unwrap();

        let result = validate_config(&args(path));
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.sink_count, 2);
        assert_eq!(summary.dispatcher_count, 1);
        assert!(result.warnings.unwrap()[0].contains("default pattern"));
    }
}
