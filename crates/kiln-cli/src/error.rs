//! Error handling for the kiln CLI.
//!
//! Commands return [`CliError`]. `main` turns it into a [`miette::Report`]
//! through [`cli_error_to_miette`], which keeps the bundler's own diagnostic
//! codes and help text.

use std::path::PathBuf;

use miette::{Diagnostic, Report};
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file problems and validation failures
    #[error(transparent)]
    Config(#[from] kiln_config::ConfigError),

    /// A configuration layer could not be merged or extracted
    #[error("Invalid configuration: {0}")]
    Layering(Box<figment::Error>),

    /// No kiln.toml or package.json `kiln` field in the project root
    #[error("No kiln configuration found in {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Build driver failures
    #[error(transparent)]
    Bundler(#[from] kiln_bundler::Error),

    /// `check --deny-warnings` found lint warnings
    #[error("{0} lint warning(s) reported")]
    LintFailed(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        CliError::Layering(Box::new(err))
    }
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

impl Diagnostic for CliError {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        let code = match self {
            CliError::Config(_) => "kiln::config",
            CliError::Layering(_) => "kiln::config::layering",
            CliError::ConfigNotFound(_) => "kiln::config::not_found",
            CliError::Bundler(_) => "kiln::build",
            CliError::LintFailed(_) => "kiln::lint",
            CliError::Io(_) => "kiln::io",
            CliError::Json(_) => "kiln::json",
        };
        Some(Box::new(code))
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            CliError::ConfigNotFound(_) => Some(Box::new(
                "Create a kiln.toml with a [library] table, or add a \"kiln\" field to package.json",
            )),
            CliError::Layering(_) => Some(Box::new(
                "Check KILN_* environment variables and command-line flags for mistyped values",
            )),
            CliError::Config(kiln_config::ConfigError::ProfileNotFound(_)) => Some(Box::new(
                "Profiles are declared as [profiles.<name>.library] tables",
            )),
            CliError::LintFailed(_) => Some(Box::new(
                "Fix the warnings above or run without --deny-warnings",
            )),
            _ => None,
        }
    }
}

/// Convert a CLI error into a report for display.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundler(e) => Report::new(e),
        other => Report::new(other),
    }
}
