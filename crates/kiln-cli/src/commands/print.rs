//! Print command implementation.

use crate::cli::PrintArgs;
use crate::config::{self, ConfigOverrides, LoadOptions};
use crate::error::Result;

/// Print the resolved configuration to stdout as pretty JSON.
pub async fn execute(args: PrintArgs) -> Result<()> {
    let loaded = config::load(&LoadOptions::from(&args.project), &ConfigOverrides::default())?;
    println!("{}", serde_json::to_string_pretty(&loaded.config)?);
    Ok(())
}
