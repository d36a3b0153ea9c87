//! Layered configuration for the CLI.
//!
//! Layers, lowest precedence first:
//!
//! 1. [`BuildConfiguration::default`]
//! 2. the discovered config file (`kiln.toml` or package.json `kiln`), with
//!    the selected profile applied
//! 3. `KILN_*` environment variables (`KILN_MINIFY=true`,
//!    `KILN_FORMATS=[es,cjs]`, `KILN_OUT_DIR=build`)
//! 4. command-line flags
//!
//! Tables merge key by key and arrays replace, so `--format es` drops every
//! configured format.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Serialized};
use kiln_config::{BuildConfiguration, BuildConfigurator, ConfigDiscovery, LibraryFormat};
use serde::Serialize;

use crate::cli::BuildArgs;
use crate::error::{CliError, Result};

/// Prefix of environment variables overriding library fields.
pub const ENV_PREFIX: &str = "KILN_";

/// Where to look for configuration and which profile to apply.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub root: PathBuf,
    pub profile: Option<String>,
}

impl LoadOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

impl From<&crate::cli::ProjectArgs> for LoadOptions {
    fn from(args: &crate::cli::ProjectArgs) -> Self {
        Self {
            root: args.root.clone(),
            profile: args.profile.clone(),
        }
    }
}

/// Flag-level overrides. Unset fields leave lower layers untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<LibraryFormat>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<bool>,

    /// Drop declaration transforms after layering
    #[serde(skip)]
    pub skip_declarations: bool,
}

impl From<&BuildArgs> for ConfigOverrides {
    fn from(args: &BuildArgs) -> Self {
        Self {
            out_dir: args.out_dir.clone(),
            formats: (!args.format.is_empty())
                .then(|| args.format.iter().copied().map(Into::into).collect()),
            minify: args.minify.then_some(true),
            sourcemap: args.sourcemap.then_some(true),
            skip_declarations: args.no_dts,
        }
    }
}

/// A configuration ready for the build driver.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Absolute project root
    pub root: PathBuf,
    /// File the library table was read from
    pub source: PathBuf,
    /// Configuration with `entry_path` resolved against `root`
    pub config: BuildConfiguration,
}

impl LoadedConfig {
    /// Absolute output directory.
    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.config.out_dir)
    }
}

/// Discover, layer and resolve the project configuration.
pub fn load(options: &LoadOptions, overrides: &ConfigOverrides) -> Result<LoadedConfig> {
    load_with_env(options, overrides, ENV_PREFIX)
}

pub(crate) fn load_with_env(
    options: &LoadOptions,
    overrides: &ConfigOverrides,
    env_prefix: &str,
) -> Result<LoadedConfig> {
    let root = project_root(&options.root)?;
    let discovery = ConfigDiscovery::new(&root);
    let source = discovery
        .find()
        .ok_or_else(|| CliError::ConfigNotFound(root.clone()))?;

    let file = match options.profile.as_deref() {
        Some(profile) => discovery.load_with_profile(profile)?,
        None => discovery.load()?,
    };
    tracing::debug!(
        source = %source.display(),
        profile = options.profile.as_deref().unwrap_or("-"),
        "loaded configuration file"
    );

    let declared = layer(file.library, Env::prefixed(env_prefix), overrides)?;
    let config = BuildConfigurator::from_declared(&root, declared).produce_configuration();

    Ok(LoadedConfig {
        root,
        source,
        config,
    })
}

fn layer(
    file: BuildConfiguration,
    env: Env,
    overrides: &ConfigOverrides,
) -> Result<BuildConfiguration> {
    let mut config: BuildConfiguration =
        Figment::from(Serialized::defaults(BuildConfiguration::default()))
            .merge(Serialized::defaults(file))
            .merge(env)
            .merge(Serialized::defaults(overrides))
            .extract()?;

    if overrides.skip_declarations {
        config
            .transform_plugins
            .retain(|plugin| !plugin.emits_declarations());
    }
    Ok(config)
}

fn project_root(root: &Path) -> Result<PathBuf> {
    if root.as_os_str().is_empty() {
        return Ok(std::env::current_dir()?);
    }
    Ok(std::path::absolute(root)?)
}
