//! Check command implementation.
//!
//! Validates the configuration without building.

use kiln_config::{lint, validate_fs};

use crate::cli::CheckArgs;
use crate::config::{self, ConfigOverrides, LoadOptions};
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the check command.
///
/// Validation failures are errors. Lint findings are printed as warnings
/// and only fail the command with `--deny-warnings`.
pub async fn execute(args: CheckArgs) -> Result<()> {
    let loaded = config::load(&LoadOptions::from(&args.project), &ConfigOverrides::default())?;
    ui::info(&format!("Checking {}", loaded.source.display()));

    validate_fs(&loaded.config, &loaded.root)?;
    ui::success("Configuration is valid");

    let warnings = lint(&loaded.config);
    for warning in &warnings {
        ui::warning(&format!("[{}] {}", warning.code(), warning));
    }

    if warnings.is_empty() {
        ui::success("No lint warnings");
    } else if args.deny_warnings {
        return Err(CliError::LintFailed(warnings.len()));
    }
    Ok(())
}
