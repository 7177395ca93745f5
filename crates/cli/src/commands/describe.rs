//! `describe` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::DescribeArgs;

/// Execute the `describe` command
pub fn run_describe(args: &DescribeArgs) -> Result<()> {
    info!(config = %args.config.display(), "Describing dispatch tree");

    let config = super::load_config(&args.config)?;

    if args.json {
        let json = config_loader::ConfigLoader::to_json(&config)
            .context("Failed to serialize configuration")?;
        println!("{}", json);
        return Ok(());
    }

    let mut root = dispatcher::create_dispatcher(&config)
        .context("Failed to build dispatch tree")?;
    println!("{}", root.describe());

    // Sinks were opened to describe them; release them again.
    root.close().context("Failed to close dispatch tree")?;
    Ok(())
}
