//! Turns a [`BuildConfiguration`] into Rolldown runs.
//!
//! Formats are built one after another, each with its own Rolldown instance
//! and a fresh plugin set. The declarations transform is installed only for
//! the first format, so `.d.ts` files are produced exactly once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_config::{BuildConfiguration, LibraryFormat, TransformPlugin, lint, validate_schema};
use path_clean::PathClean;
use rolldown::{
    BundleOutput, BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, GlobalsOutputOption,
    InputItem, OutputFormat, Platform, SourceMapType,
};
use rolldown_common::Output;
use rustc_hash::FxHashMap;

use crate::diagnostics::{HookFailures, extract_from_rolldown_error};
use crate::output::{Artifact, ArtifactKind, LibraryBuild};
use crate::plugins::{
    DtsEmitPlugin, ExternalPlugin, PluginRegistry, VueJsxPlugin, VuePlugin, VuetifyPlugin,
};
use crate::{Error, Result};

/// Builds every output format of a library.
///
/// ```no_run
/// use kiln_config::BuildConfiguration;
///
/// # #[tokio::main]
/// # async fn main() -> kiln_bundler::Result<()> {
/// let config = BuildConfiguration::new("src/index.ts", "widgets").with_external("vue");
/// let build = kiln_bundler::LibraryBuilder::new(config)
///     .cwd("packages/widgets")
///     .build()
///     .await?;
/// for bundle in build.bundles() {
///     println!("{} ({} bytes)", bundle.file_name, bundle.size());
/// }
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct LibraryBuilder {
    config: BuildConfiguration,
    cwd: Option<PathBuf>,
}

impl LibraryBuilder {
    pub fn new(config: BuildConfiguration) -> Self {
        Self { config, cwd: None }
    }

    /// Directory relative entry paths and module resolution start from.
    ///
    /// Defaults to the process working directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub async fn build(self) -> Result<LibraryBuild> {
        validate_schema(&self.config)?;

        let cwd = absolute(self.cwd.unwrap_or_default())?;
        let entry = if self.config.entry_path.is_absolute() {
            self.config.entry_path.clean()
        } else {
            cwd.join(&self.config.entry_path).clean()
        };
        if !entry.is_file() {
            return Err(Error::EntryNotFound(entry));
        }

        let warnings = lint(&self.config);
        for warning in &warnings {
            tracing::warn!(code = warning.code(), "{}", warning);
        }

        let config = Arc::new(self.config);
        let formats = config.output_formats();
        let mut artifacts: Vec<Artifact> = Vec::new();

        for (index, format) in formats.iter().copied().enumerate() {
            let started = std::time::Instant::now();
            let options = rolldown_options(&config, format, &entry, &cwd);
            let failures = HookFailures::default();
            let registry = plugin_registry(&config, &entry, index == 0, &failures);
            tracing::debug!(format = %format, plugins = ?registry.names(), "bundling");

            let mut bundler = RolldownBundlerBuilder::default()
                .with_options(options)
                .with_plugins(registry.into_rolldown_plugins())
                .build()
                .map_err(|e| Error::from_rolldown_batch(&e))?;

            let output = bundler
                .generate()
                .await
                .map_err(|e| Error::Bundler(failures.merge(extract_from_rolldown_error(&e))))?;

            for artifact in collect_artifacts(&config, format, output) {
                if artifacts.iter().any(|a| a.file_name == artifact.file_name) {
                    return Err(Error::InvalidConfig(format!(
                        "'{}' is emitted by more than one output format",
                        artifact.file_name
                    )));
                }
                artifacts.push(artifact);
            }

            tracing::info!(
                format = %format,
                file = %config.bundle_file_name(format),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "bundled"
            );
        }

        Ok(LibraryBuild {
            artifacts,
            warnings,
        })
    }
}

/// Builds `config` relative to the process working directory.
pub async fn build(config: &BuildConfiguration) -> Result<LibraryBuild> {
    LibraryBuilder::new(config.clone()).build().await
}

fn absolute(dir: PathBuf) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.clean());
    }
    Ok(std::env::current_dir()?.join(dir).clean())
}

pub(crate) fn output_format(format: LibraryFormat) -> OutputFormat {
    match format {
        LibraryFormat::Es => OutputFormat::Esm,
        LibraryFormat::Cjs => OutputFormat::Cjs,
        LibraryFormat::Umd => OutputFormat::Umd,
        LibraryFormat::Iife => OutputFormat::Iife,
    }
}

fn rolldown_options(
    config: &BuildConfiguration,
    format: LibraryFormat,
    entry: &Path,
    cwd: &Path,
) -> BundlerOptions {
    let mut options = BundlerOptions {
        format: Some(output_format(format)),
        sourcemap: config.sourcemap.then_some(SourceMapType::Hidden),
        ..Default::default()
    };

    options.input = Some(vec![InputItem {
        name: Some(config.output_base_file_name.clone()),
        import: entry.to_string_lossy().into_owned(),
    }]);
    options.cwd = Some(cwd.to_path_buf());
    options.platform = Some(Platform::Browser);

    if config.minify {
        options.minify = Some(rolldown::RawMinifyOptions::from(true));
    }

    if format.needs_global_name() {
        options.name = config.library_name.clone();
        let globals: FxHashMap<String, String> = config
            .global_name_map
            .iter()
            .map(|(dependency, global)| (dependency.clone(), global.clone()))
            .collect();
        if !globals.is_empty() {
            options.globals = Some(GlobalsOutputOption::from(globals));
        }
    }

    options
}

/// External resolution first, then the configured transforms in declared
/// order. Only the first declarations transform is installed, and only when
/// `emit_declarations` is set. Hook failures are recorded into `failures`.
pub(crate) fn plugin_registry(
    config: &Arc<BuildConfiguration>,
    entry: &Path,
    emit_declarations: bool,
    failures: &HookFailures,
) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.add(ExternalPlugin::new(Arc::clone(config)));

    let mut declarations_installed = false;
    for plugin in &config.transform_plugins {
        match plugin {
            TransformPlugin::Vue => {
                registry.add(VuePlugin::new().with_failures(failures.clone()))
            }
            TransformPlugin::VueJsx => registry.add(VueJsxPlugin::new()),
            TransformPlugin::Vuetify(options) => {
                registry.add(
                    VuetifyPlugin::new(options.auto_import).with_failures(failures.clone()),
                )
            }
            TransformPlugin::Dts(options) => {
                if emit_declarations && !declarations_installed {
                    registry.add(
                        DtsEmitPlugin::new(
                            entry,
                            config.output_base_file_name.clone(),
                            options.clone(),
                        )
                        .with_failures(failures.clone()),
                    );
                    declarations_installed = true;
                }
            }
        }
    }

    registry
}

fn collect_artifacts(
    config: &BuildConfiguration,
    format: LibraryFormat,
    output: BundleOutput,
) -> Vec<Artifact> {
    let mut artifacts = Vec::new();

    for item in output.assets {
        match item {
            Output::Chunk(chunk) => {
                let (file_name, kind) = if chunk.is_entry {
                    (config.bundle_file_name(format), ArtifactKind::Bundle(format))
                } else {
                    (chunk.filename.to_string(), ArtifactKind::Chunk(format))
                };

                let mut code = chunk.code.clone();
                let map = if config.sourcemap {
                    chunk.map.as_ref().map(|map| map.to_json_string())
                } else {
                    None
                };
                if let Some(map) = map {
                    let map_name = format!("{}.map", file_name);
                    code = with_source_map_comment(&code, &map_name);
                    artifacts.push(Artifact {
                        file_name: map_name,
                        kind: ArtifactKind::Asset,
                        contents: map.into_bytes(),
                        modules: vec![],
                    });
                }

                artifacts.push(Artifact {
                    file_name,
                    kind,
                    contents: code.into_bytes(),
                    modules: chunk.module_ids.iter().map(|id| id.to_string()).collect(),
                });
            }
            Output::Asset(asset) => {
                let file_name = asset.filename.to_string();
                if file_name.ends_with(".map") {
                    continue;
                }
                let kind = if file_name.ends_with(".d.ts") {
                    ArtifactKind::Declaration
                } else {
                    ArtifactKind::Asset
                };
                artifacts.push(Artifact {
                    file_name,
                    kind,
                    contents: asset.source.as_bytes().to_vec(),
                    modules: vec![],
                });
            }
        }
    }

    artifacts
}

/// Points the code at `map_name`, replacing any existing mapping comment.
fn with_source_map_comment(code: &str, map_name: &str) -> String {
    let body: Vec<&str> = code
        .lines()
        .filter(|line| !line.starts_with("//# sourceMappingURL="))
        .collect();
    let file = Path::new(map_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(map_name);
    format!("{}\n//# sourceMappingURL={}\n", body.join("\n").trim_end(), file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::BuildConfigurator;

    #[test]
    fn maps_library_formats() {
        assert!(matches!(output_format(LibraryFormat::Es), OutputFormat::Esm));
        assert!(matches!(output_format(LibraryFormat::Cjs), OutputFormat::Cjs));
        assert!(matches!(output_format(LibraryFormat::Umd), OutputFormat::Umd));
        assert!(matches!(output_format(LibraryFormat::Iife), OutputFormat::Iife));
    }

    #[test]
    fn registry_follows_declared_order() {
        let config = Arc::new(BuildConfigurator::shared_ui("/work").produce_configuration());
        let entry = config.entry_path.clone();

        assert_eq!(
            plugin_registry(&config, &entry, true, &HookFailures::default()).names(),
            vec!["kiln:external", "kiln:vue", "kiln:dts", "kiln:vue-jsx", "kiln:vuetify"]
        );
        assert_eq!(
            plugin_registry(&config, &entry, false, &HookFailures::default()).names(),
            vec!["kiln:external", "kiln:vue", "kiln:vue-jsx", "kiln:vuetify"]
        );
    }

    #[test]
    fn duplicate_declarations_transform_installs_once() {
        let config = Arc::new(
            BuildConfiguration::new("src/index.ts", "lib")
                .with_plugin(TransformPlugin::dts())
                .with_plugin(TransformPlugin::dts()),
        );
        let entry = Path::new("/work/src/index.ts");
        let names = plugin_registry(&config, entry, true, &HookFailures::default()).names();
        assert_eq!(names, vec!["kiln:external", "kiln:dts"]);
    }

    #[test]
    fn global_options_only_for_global_formats() {
        let config = BuildConfigurator::shared_ui("/work").produce_configuration();
        let entry = Path::new("/work/src/index.ts");

        let umd = rolldown_options(&config, LibraryFormat::Umd, entry, Path::new("/work"));
        assert_eq!(umd.name.as_deref(), Some("XrdSharedUI"));
        assert!(umd.globals.is_some());

        let es = rolldown_options(&config, LibraryFormat::Es, entry, Path::new("/work"));
        assert!(es.name.is_none());
        assert!(es.globals.is_none());
        assert!(es.minify.is_none());
    }

    #[test]
    fn replaces_existing_source_map_comment() {
        let code = "var a = 1;\n//# sourceMappingURL=index.js.map\n";
        assert_eq!(
            with_source_map_comment(code, "ui.umd.js.map"),
            "var a = 1;\n//# sourceMappingURL=ui.umd.js.map\n"
        );
    }
}
