//! Build command implementation.

use std::time::Instant;

use kiln_bundler::LibraryBuilder;
use kiln_config::validate_fs;

use crate::cli::BuildArgs;
use crate::config::{self, ConfigOverrides, LoadOptions};
use crate::error::Result;
use crate::ui;

/// Execute the build command.
///
/// 1. Load and layer the configuration
/// 2. Validate it, including that the entry module exists
/// 3. Run one bundling pass per format
/// 4. Write every artifact to the output directory
pub async fn execute(args: BuildArgs) -> Result<()> {
    let started = Instant::now();
    let loaded = config::load(
        &LoadOptions::from(&args.project),
        &ConfigOverrides::from(&args),
    )?;
    validate_fs(&loaded.config, &loaded.root)?;

    let formats = loaded.config.output_formats();
    ui::info(&format!(
        "Building {} ({})",
        loaded.config.output_base_file_name,
        formats
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let build = LibraryBuilder::new(loaded.config.clone())
        .cwd(&loaded.root)
        .build()
        .await?;

    for warning in &build.warnings {
        ui::warning(&warning.to_string());
    }

    let out_dir = loaded.out_dir();
    build.write_to(&out_dir, true)?;

    ui::print_build_summary(&build);
    ui::success(&format!(
        "Wrote {} file(s) to {} in {}",
        build.artifacts.len(),
        out_dir.display(),
        ui::format_duration(started.elapsed())
    ));
    Ok(())
}
