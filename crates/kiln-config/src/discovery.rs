//! File-based config discovery for CLI use
//!
//! Handles finding and loading kiln configuration files from the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::KilnConfig;
use crate::error::{ConfigError, Result};

/// File-based configuration discovery
///
/// Library users can build a [`crate::BuildConfiguration`] directly; this is
/// for projects that describe their library in a file.
///
/// # Example
///
/// ```no_run
/// use kiln_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. TOML config: kiln.toml
    /// 2. package.json (kiln field)
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join("kiln.toml");
        if toml_path.exists() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        match read_package_json(&pkg_path) {
            Some(parsed) if parsed.get("kiln").is_some_and(|v| !v.is_null()) => Some(pkg_path),
            _ => None,
        }
    }

    /// Load config from discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<KilnConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        tracing::debug!(path = %path.display(), "loading configuration");
        let mut config = self.load_from(&path)?;
        self.fill_package_defaults(&mut config);
        Ok(config)
    }

    /// Load config with profile merging
    pub fn load_with_profile(&self, profile: &str) -> Result<KilnConfig> {
        self.load()?.materialize_profile(Some(profile))
    }

    fn load_from(&self, path: &Path) -> Result<KilnConfig> {
        if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            return self.load_from_package_json(path);
        }

        let content = fs::read_to_string(path)?;

        let toml_val: toml::Value =
            toml::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                field: "toml".to_string(),
                hint: Some(format!("Invalid TOML syntax: {}", e)),
            })?;

        let value = serde_json::to_value(toml_val).map_err(|e| ConfigError::InvalidValue {
            field: "toml".to_string(),
            hint: Some(format!("TOML to JSON conversion failed: {}", e)),
        })?;

        KilnConfig::from_value(value)
    }

    fn load_from_package_json(&self, path: &Path) -> Result<KilnConfig> {
        let content = fs::read_to_string(path)?;

        let parsed: Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                field: "package.json".to_string(),
                hint: Some(format!("Invalid JSON: {}", e)),
            })?;

        match parsed.get("kiln") {
            Some(value) if !value.is_null() => KilnConfig::from_value(value.clone()),
            _ => Err(ConfigError::InvalidValue {
                field: "kiln".to_string(),
                hint: Some("Add a 'kiln' field to your package.json".to_string()),
            }),
        }
    }

    /// Without an explicit base file name the package name is used, with any
    /// npm scope removed.
    fn fill_package_defaults(&self, config: &mut KilnConfig) {
        if !config.library.output_base_file_name.trim().is_empty() {
            return;
        }

        let name = read_package_json(&self.root.join("package.json"))
            .and_then(|pkg| pkg.get("name").and_then(Value::as_str).map(str::to_string));

        if let Some(name) = name {
            let stem = name.rsplit('/').next().unwrap_or(&name).to_string();
            tracing::debug!(base = %stem, "using package name as output base file name");
            config.library.output_base_file_name = stem;
        }
    }
}

fn read_package_json(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Discover and load config from current directory (convenience function)
pub fn discover() -> Result<KilnConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}

/// Discover and load config with profile (convenience function)
pub fn discover_with_profile(profile: &str) -> Result<KilnConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load_with_profile(profile)
}
