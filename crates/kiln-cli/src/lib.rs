//! kiln CLI: builds a component library described by `kiln.toml`.
//!
//! # Architecture
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - layered configuration (defaults, file, `KILN_*`, flags)
//! - [`commands`] - `build`, `check` and `print`
//! - [`error`] - [`CliError`] and its conversion to miette reports
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and the build summary
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::config::{ConfigOverrides, LoadOptions};
//!
//! let options = LoadOptions::new("packages/ui").with_profile("production");
//! let loaded = kiln_cli::config::load(&options, &ConfigOverrides::default())?;
//! println!("{}", loaded.config.output_base_file_name);
//! # Ok::<(), kiln_cli::CliError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
