//! The library build configuration consumed by the build driver.

mod format;
mod helpers;
mod plugin;

use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

pub use format::{LibraryFormat, PackageType};
pub use plugin::{DtsOptions, TransformPlugin, VuetifyOptions};

use helpers::{default_entry_path, default_out_dir};

/// Declarative description of how a component library is bundled.
///
/// The value is immutable for the duration of a build. Externals and
/// globals keep their declaration order so emitted output is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    /// The sole public entry module
    #[serde(default = "default_entry_path")]
    pub entry_path: PathBuf,

    /// Global identifier exposed by formats without a module system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_name: Option<String>,

    /// File name stem shared by every emitted bundle
    #[serde(default)]
    pub output_base_file_name: String,

    /// Dependencies left as unresolved imports
    #[serde(default)]
    pub external_dependencies: IndexSet<String>,

    /// External identifier to global variable, for global formats
    #[serde(default)]
    pub global_name_map: IndexMap<String, String>,

    /// Transforms in application order
    #[serde(default)]
    pub transform_plugins: Vec<TransformPlugin>,

    /// Requested output formats; empty selects the defaults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<LibraryFormat>,

    #[serde(default)]
    pub package_type: PackageType,

    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default)]
    pub sourcemap: bool,

    #[serde(default)]
    pub minify: bool,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            entry_path: default_entry_path(),
            library_name: None,
            output_base_file_name: String::new(),
            external_dependencies: IndexSet::new(),
            global_name_map: IndexMap::new(),
            transform_plugins: Vec::new(),
            formats: Vec::new(),
            package_type: PackageType::default(),
            out_dir: default_out_dir(),
            sourcemap: false,
            minify: false,
        }
    }
}

impl BuildConfiguration {
    pub fn new(entry_path: impl Into<PathBuf>, output_base_file_name: impl Into<String>) -> Self {
        Self {
            entry_path: entry_path.into(),
            output_base_file_name: output_base_file_name.into(),
            ..Self::default()
        }
    }

    pub fn with_library_name(mut self, name: impl Into<String>) -> Self {
        self.library_name = Some(name.into());
        self
    }

    pub fn with_external(mut self, dependency: impl Into<String>) -> Self {
        self.external_dependencies.insert(dependency.into());
        self
    }

    pub fn with_global(mut self, dependency: impl Into<String>, global: impl Into<String>) -> Self {
        self.global_name_map.insert(dependency.into(), global.into());
        self
    }

    pub fn with_plugin(mut self, plugin: TransformPlugin) -> Self {
        self.transform_plugins.push(plugin);
        self
    }

    pub fn with_formats(mut self, formats: impl IntoIterator<Item = LibraryFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    /// Formats to emit, in order, with duplicates removed.
    pub fn output_formats(&self) -> Vec<LibraryFormat> {
        if self.formats.is_empty() {
            return LibraryFormat::defaults(self.library_name.is_some());
        }

        let mut seen = IndexSet::new();
        for format in &self.formats {
            seen.insert(*format);
        }
        seen.into_iter().collect()
    }

    /// Bundle file name emitted for `format`.
    pub fn bundle_file_name(&self, format: LibraryFormat) -> String {
        format.file_name(&self.output_base_file_name, self.package_type)
    }

    /// Returns the external dependency matching an import specifier.
    ///
    /// A dependency matches its own name and any subpath of it, so
    /// `vuetify` covers `vuetify/components`.
    pub fn matching_external(&self, specifier: &str) -> Option<&str> {
        self.external_dependencies
            .iter()
            .find(|dependency| is_same_package(dependency, specifier))
            .map(String::as_str)
    }

    pub fn is_external(&self, specifier: &str) -> bool {
        self.matching_external(specifier).is_some()
    }

    /// The first declarations transform, if any.
    pub fn declarations(&self) -> Option<&DtsOptions> {
        self.transform_plugins.iter().find_map(|plugin| match plugin {
            TransformPlugin::Dts(options) => Some(options),
            _ => None,
        })
    }

    pub fn emits_declarations(&self) -> bool {
        self.transform_plugins
            .iter()
            .any(TransformPlugin::emits_declarations)
    }

    /// Whether any requested format exposes the library through a global.
    pub fn uses_globals(&self) -> bool {
        self.output_formats()
            .into_iter()
            .any(LibraryFormat::needs_global_name)
    }
}

fn is_same_package(dependency: &str, specifier: &str) -> bool {
    match specifier.strip_prefix(dependency) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
