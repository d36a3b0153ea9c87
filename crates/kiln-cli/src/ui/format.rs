//! Formatting utilities for sizes, durations and build summaries.

use std::time::Duration;

use console::Term;
use kiln_bundler::{ArtifactKind, LibraryBuild};
use owo_colors::OwoColorize;

use super::{colors_enabled, is_quiet};

/// Format a file size using the largest fitting unit.
///
/// ```
/// use kiln_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration as `ms`, seconds, or minutes and seconds.
///
/// ```
/// use std::time::Duration;
/// use kiln_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn kind_label(kind: &ArtifactKind) -> String {
    match kind {
        ArtifactKind::Bundle(format) => format.to_string(),
        ArtifactKind::Chunk(format) => format!("{format} chunk"),
        ArtifactKind::Declaration => "d.ts".to_string(),
        ArtifactKind::Asset => "asset".to_string(),
    }
}

/// Print one line per artifact plus the total size to stderr.
pub fn print_build_summary(build: &LibraryBuild) {
    if is_quiet() {
        return;
    }
    let width = (Term::stderr().size().1 as usize).clamp(40, 80);

    if colors_enabled() {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{}", "─".repeat(width));

    let name_width = build
        .artifacts
        .iter()
        .map(|a| a.file_name.len())
        .max()
        .unwrap_or(0);

    for artifact in &build.artifacts {
        let label = kind_label(&artifact.kind);
        let size = format_size(artifact.size() as u64);
        if colors_enabled() {
            eprintln!(
                "  {:<name_width$}  {:>10}  {}",
                artifact.file_name.cyan(),
                size,
                label.dimmed(),
            );
        } else {
            eprintln!("  {:<name_width$}  {:>10}  {}", artifact.file_name, size, label);
        }
    }

    eprintln!("{}", "─".repeat(width));
    eprintln!(
        "  {:<name_width$}  {:>10}",
        "total",
        format_size(build.total_size() as u64)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::LibraryFormat;

    #[test]
    fn sizes_between_units() {
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn labels_name_the_format() {
        assert_eq!(kind_label(&ArtifactKind::Bundle(LibraryFormat::Umd)), "umd");
        assert_eq!(kind_label(&ArtifactKind::Declaration), "d.ts");
    }
}
