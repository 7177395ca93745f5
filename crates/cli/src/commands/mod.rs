//! Command implementations.

mod describe;
mod emit;
mod validate;

pub use describe::run_describe;
pub use emit::run_emit;
pub use validate::run_validate;

use anyhow::Result;
use contracts::LogConfig;
use std::path::Path;

use crate::error::CliError;

/// Load and validate a configuration file
pub(crate) fn load_config(path: &Path) -> Result<LogConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .map_err(|e| CliError::config_invalid(e.to_string()).into())
}
