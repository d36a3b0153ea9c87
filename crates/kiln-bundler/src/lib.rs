#![cfg_attr(docsrs, feature(doc_cfg))]

//! # kiln-bundler
//!
//! Rolldown-based build driver for kiln library configurations.
//!
//! A [`BuildConfiguration`](kiln_config::BuildConfiguration) describes *what*
//! a component library build produces. This crate turns it into Rolldown runs,
//! one per output format, with the configured transform plugins installed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kiln_config::BuildConfigurator;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfigurator::shared_ui(".").produce_configuration();
//! let build = kiln_bundler::LibraryBuilder::new(config).cwd(".").build().await?;
//!
//! build.write_to("dist", true)?;
//! # Ok(()) }
//! ```

pub mod diagnostics;
pub mod driver;
pub mod output;
pub mod plugins;
pub mod sfc;

// Re-export core Rolldown types for library users
pub use rolldown::{BundleOutput, BundlerOptions, OutputFormat, Platform};

pub use rolldown_common::{ModuleType, Output, OutputAsset, OutputChunk};

// Re-export plugin types for hook-level use and testing
pub use rolldown_plugin::{
    __inner::SharedPluginable, HookLoadArgs, HookLoadOutput, HookUsage, Plugin, PluginContext,
};

pub use driver::{LibraryBuilder, build};
pub use output::{Artifact, ArtifactKind, LibraryBuild};
pub use plugins::{
    DtsEmitPlugin, ExternalPlugin, KilnPlugin, PluginPhase, PluginRegistry, VueJsxPlugin,
    VuePlugin, VuetifyPlugin,
};

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

/// Error types for kiln-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from Rolldown bundler, including failed plugin hooks.
    #[error("Rolldown bundler error: {}", format_bundler_error(.0))]
    Bundler(Vec<diagnostics::ExtractedDiagnostic>),

    /// Configured entry module does not exist.
    #[error("Entry module not found: {}", .0.display())]
    EntryNotFound(std::path::PathBuf),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration failed schema validation.
    #[error(transparent)]
    Config(#[from] kiln_config::ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// Output file already exists and overwrite is disabled.
    #[error("Output exists: {0}")]
    OutputExists(String),
}

/// Result type alias for kiln-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bundler error from a Rolldown error.
    ///
    /// Extracts structured diagnostics from Rolldown's error types.
    pub fn from_rolldown_batch(error: &dyn std::fmt::Debug) -> Self {
        Error::Bundler(diagnostics::extract_from_rolldown_error(error))
    }
}

/// Format bundler error diagnostics for display.
fn format_bundler_error(diagnostics: &[diagnostics::ExtractedDiagnostic]) -> String {
    if diagnostics.is_empty() {
        return "Unknown bundler error".to_string();
    }

    if diagnostics.len() == 1 {
        let diag = &diagnostics[0];
        format!("{}: {}", diag.kind, diag.message)
    } else {
        format!(
            "{} errors: {}",
            diagnostics.len(),
            diagnostics
                .iter()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .collect::<Vec<_>>()
                .join("; ")
        )
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::OutputExists(_) => "OUTPUT_EXISTS",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::EntryNotFound(path) => Some(Box::new(format!(
                "Create {} or point entry_path at the library's entry module.",
                path.display()
            ))),
            Error::InvalidConfig(msg) => Some(Box::new(format!(
                "Check your kiln.toml for invalid values.\nError: {}",
                msg
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it stays inside the output directory and doesn't contain '..' components.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            Error::OutputExists(msg) => Some(Box::new(format!(
                "Output file already exists: {}\nRemove it or allow overwriting.",
                msg
            ))),
            Error::Bundler(diagnostics) => {
                if diagnostics.len() == 1 {
                    diagnostics[0]
                        .help
                        .as_ref()
                        .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>)
                } else {
                    Some(Box::new(
                        "Multiple bundler errors occurred. See details above.".to_string(),
                    ))
                }
            }
            _ => None,
        }
    }
}
