//! Profiles command

use anyhow::Result;
use filmstock_core::RenderConfig;

/// Print the built-in configuration; the output is a valid config file.
pub fn run() -> Result<()> {
    println!("{}", RenderConfig::builtin().to_json_pretty()?);
    Ok(())
}
