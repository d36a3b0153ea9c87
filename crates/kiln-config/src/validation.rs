//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation (for library use).

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::library::BuildConfiguration;

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &BuildConfiguration) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use kiln_config::{BuildConfiguration, ConfigValidator, SchemaValidator};
///
/// let config = BuildConfiguration::new("src/index.ts", "my-lib");
/// SchemaValidator.validate(&config).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &BuildConfiguration) -> Result<()> {
        if config.entry_path.as_os_str().is_empty() {
            return Err(ConfigError::NoEntry);
        }

        let base = config.output_base_file_name.trim();
        if base.is_empty() {
            return Err(ConfigError::SchemaValidation {
                message: "output_base_file_name cannot be empty".to_string(),
                hint: Some("Set output_base_file_name, e.g. \"my-lib\"".to_string()),
            });
        }
        if base.contains(['/', '\\']) {
            return Err(ConfigError::SchemaValidation {
                message: format!("output_base_file_name '{base}' contains a path separator"),
                hint: Some("Use out_dir to place bundles in a subdirectory".to_string()),
            });
        }

        for external in &config.external_dependencies {
            if external.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: "external dependency names cannot be empty".to_string(),
                    hint: Some(
                        "Remove empty strings from the 'external_dependencies' array".to_string(),
                    ),
                });
            }
        }

        for (dependency, global) in &config.global_name_map {
            if global.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: format!("global name for '{dependency}' cannot be empty"),
                    hint: None,
                });
            }
        }

        if config.library_name.is_none() {
            if let Some(format) = config
                .output_formats()
                .into_iter()
                .find(|format| format.needs_global_name())
            {
                return Err(ConfigError::SchemaValidation {
                    message: format!("library_name is required for the {format} format"),
                    hint: Some(
                        "Set library_name or drop umd/iife from 'formats'".to_string(),
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Filesystem validator (for CLI use)
///
/// Runs schema validation, then checks that the entry module exists.
pub struct FsValidator {
    root: PathBuf,
}

impl FsValidator {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &BuildConfiguration) -> Result<()> {
        SchemaValidator.validate(config)?;

        let path = self.root.join(&config.entry_path);
        if !path.is_file() {
            return Err(ConfigError::EntryNotFound { path });
        }

        Ok(())
    }
}

/// Convenience function for schema-only validation
pub fn validate_schema(config: &BuildConfiguration) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Convenience function for filesystem validation
pub fn validate_fs(config: &BuildConfiguration, root: impl AsRef<Path>) -> Result<()> {
    FsValidator::new(root).validate(config)
}
