//! Declarative build configuration for packaging a component library.
//!
//! A [`BuildConfigurator`] produces an immutable [`BuildConfiguration`]
//! describing the entry module, bundle naming, external dependencies and
//! their globals, and the ordered transforms. The build driver in
//! `kiln-bundler` consumes it.

pub mod config;
pub mod configurator;
pub mod discovery;
pub mod error;
pub mod library;
pub mod lint;
pub mod validation;

pub use config::{KilnConfig, ProfileConfig};
pub use configurator::BuildConfigurator;
pub use error::{ConfigError, Result};
pub use library::{
    BuildConfiguration, DtsOptions, LibraryFormat, PackageType, TransformPlugin, VuetifyOptions,
};
pub use lint::{LintWarning, lint};

pub use discovery::{ConfigDiscovery, discover, discover_with_profile};
pub use validation::{ConfigValidator, FsValidator, SchemaValidator, validate_fs, validate_schema};
