//! Produces the build configuration handed to the build driver.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::error::Result;
use crate::library::{BuildConfiguration, TransformPlugin};

/// Produces a [`BuildConfiguration`] with its entry resolved against a
/// project root.
///
/// Producing a configuration performs no I/O and has no side effects, so
/// repeated calls return equal values.
///
/// # Example
///
/// ```
/// use kiln_config::BuildConfigurator;
///
/// let configurator = BuildConfigurator::shared_ui("/work/xrd-shared-ui");
/// let config = configurator.produce_configuration();
/// assert!(config.entry_path.ends_with("src/index.ts"));
/// assert_eq!(config, configurator.produce_configuration());
/// ```
#[derive(Debug, Clone)]
pub struct BuildConfigurator {
    root: PathBuf,
    declared: BuildConfiguration,
}

impl BuildConfigurator {
    /// Wrap a declared configuration whose relative paths are rooted at `root`.
    pub fn from_declared(root: impl AsRef<Path>, declared: BuildConfiguration) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            declared,
        }
    }

    /// Wrap a declared configuration rooted at the process working directory.
    pub fn in_current_dir(declared: BuildConfiguration) -> Result<Self> {
        let root = std::env::current_dir()?;
        Ok(Self::from_declared(root, declared))
    }

    /// The shared UI component library: a Vue + Vuetify library published
    /// as ES and UMD bundles with `vue` and `vuetify` left to the consumer.
    pub fn shared_ui(root: impl AsRef<Path>) -> Self {
        let declared = BuildConfiguration::new("src/index.ts", "xrd-shared-ui")
            .with_library_name("XrdSharedUI")
            .with_external("vue")
            .with_external("vuetify")
            .with_global("vue", "Vue")
            .with_plugin(TransformPlugin::Vue)
            .with_plugin(TransformPlugin::dts())
            .with_plugin(TransformPlugin::VueJsx)
            .with_plugin(TransformPlugin::vuetify(true));

        Self::from_declared(root, declared)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration as declared, before path resolution.
    pub fn declared(&self) -> &BuildConfiguration {
        &self.declared
    }

    /// Produce the configuration with `entry_path` made absolute.
    pub fn produce_configuration(&self) -> BuildConfiguration {
        let mut config = self.declared.clone();
        config.entry_path = self.resolve(&self.declared.entry_path);
        config
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.clean()
        } else {
            self.root.join(path).clean()
        }
    }
}
