//! Rolldown plugin emitting TypeScript declaration files (.d.ts).
//!
//! ```text
//! TypeScript source → Rolldown (OXC transform) → JavaScript bundle
//!                              ↓
//!                     DtsEmitPlugin (OXC isolated declarations)
//!                              ↓
//!                         .d.ts assets
//! ```
//!
//! Runs in `generate_bundle`, after every transform, with the full module
//! list of the entry chunk. The entry's declarations are named after the
//! library (`<base>.d.ts`); every other TypeScript module keeps its path
//! relative to the entry directory so relative type imports still resolve.
//! Vue components get a `<name>.vue.d.ts` stub typing their default export.
//!
//! Failing to declare the entry fails the build. Other modules that cannot be
//! declared are skipped with a warning.

use crate::diagnostics::HookFailures;
use crate::plugins::KilnPlugin;
use anyhow::{Context, Result};
use kiln_config::DtsOptions;
use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_isolated_declarations::{IsolatedDeclarations, IsolatedDeclarationsOptions};
use oxc_parser::Parser;
use oxc_span::SourceType as OxcSourceType;
use rolldown_common::{Output, OutputAsset};
use rolldown_plugin::{HookGenerateBundleArgs, HookNoopReturn, HookUsage, Plugin, PluginContext};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Declarations of a Vue component's default export.
const VUE_COMPONENT_DTS: &str =
    "declare const _default: import('vue').DefineComponent;\nexport default _default;\n";

#[derive(Debug, Clone)]
pub struct DtsEmitPlugin {
    /// Absolute path of the library entry module
    entry: PathBuf,
    /// Output base file name of the library
    base: String,
    options: DtsOptions,
    failures: HookFailures,
}

impl DtsEmitPlugin {
    pub fn new(entry: impl Into<PathBuf>, base: impl Into<String>, options: DtsOptions) -> Self {
        Self {
            entry: entry.into(),
            base: base.into(),
            options,
            failures: HookFailures::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: HookFailures) -> Self {
        self.failures = failures;
        self
    }
}

impl Plugin for DtsEmitPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:dts".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::GenerateBundle
    }

    fn generate_bundle(
        &self,
        _ctx: &PluginContext,
        args: &mut HookGenerateBundleArgs<'_>,
    ) -> impl std::future::Future<Output = HookNoopReturn> + Send {
        let plugin = self.clone();

        async move {
            let mut modules: Vec<String> = Vec::new();
            for output in args.bundle.iter() {
                if let Output::Chunk(chunk) = output {
                    if chunk.is_entry {
                        modules.extend(chunk.modules.keys.iter().map(|id| id.to_string()));
                    }
                }
            }

            let mut dts_assets = Vec::new();
            for module_id in modules {
                let is_entry = Path::new(&module_id) == plugin.entry;
                let dts_content = if module_id.ends_with(".vue") {
                    VUE_COMPONENT_DTS.to_string()
                } else if is_typescript_module(&module_id) {
                    match declare_module(&module_id, plugin.options.strip_internal).await {
                        Ok(content) => content,
                        Err(err) if is_entry => {
                            let err = err.context(format!(
                                "failed to generate declarations for entry {}",
                                module_id
                            ));
                            return Err(plugin.failures.record("kiln:dts", &module_id, err));
                        }
                        Err(err) => {
                            tracing::warn!(module = %module_id, "skipping .d.ts: {err:#}");
                            continue;
                        }
                    }
                } else {
                    continue;
                };

                let Some(dts_filename) = plugin.declaration_file_name(Path::new(&module_id)) else {
                    tracing::warn!(module = %module_id, "module lies outside the entry directory, skipping .d.ts");
                    continue;
                };

                tracing::debug!(module = %module_id, file = %dts_filename, "emitting declarations");
                dts_assets.push(Output::Asset(Arc::new(OutputAsset {
                    names: vec![],
                    original_file_names: vec![module_id],
                    filename: dts_filename.into(),
                    source: dts_content.into(),
                })));
            }

            args.bundle.extend(dts_assets);
            Ok(())
        }
    }
}

impl KilnPlugin for DtsEmitPlugin {}

impl DtsEmitPlugin {
    /// `<base>.d.ts` for the entry, `<relative path>.d.ts` for the rest and
    /// `<relative path>.vue.d.ts` for components, all under `out_dir` when set.
    fn declaration_file_name(&self, module: &Path) -> Option<String> {
        let relative = if module == self.entry {
            PathBuf::from(format!("{}.d.ts", self.base))
        } else {
            let entry_dir = self.entry.parent()?;
            let relative = module.strip_prefix(entry_dir).ok()?;
            let name = if module.extension().is_some_and(|ext| ext == "vue") {
                relative.file_name()?.to_str()?
            } else {
                relative.file_stem()?.to_str()?
            };
            relative.with_file_name(format!("{}.d.ts", name))
        };

        let path = match &self.options.out_dir {
            Some(dir) => dir.join(relative),
            None => relative,
        };
        Some(path.to_string_lossy().replace('\\', "/"))
    }
}

fn is_typescript_module(path: &str) -> bool {
    if path.ends_with(".d.ts") {
        return false;
    }
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext, "ts" | "tsx" | "mts" | "cts"))
        .unwrap_or(false)
}

async fn declare_module(module_id: &str, strip_internal: bool) -> Result<String> {
    let source = tokio::fs::read_to_string(module_id)
        .await
        .with_context(|| format!("Failed to read {}", module_id))?;
    generate_dts(&source, module_id, strip_internal)
}

/// Generate .d.ts content from TypeScript source using OXC.
///
/// Fails when the module does not parse or lacks the explicit type
/// annotations isolated declarations need.
fn generate_dts(source: &str, file_path: &str, strip_internal: bool) -> Result<String> {
    let allocator = Allocator::default();

    let source_type = OxcSourceType::from_path(file_path)
        .with_context(|| format!("Invalid TypeScript file: {}", file_path))?;

    let parse_result = Parser::new(&allocator, source, source_type).parse();
    if !parse_result.errors.is_empty() {
        let error_messages: Vec<String> = parse_result
            .errors
            .iter()
            .map(|e| format!("{:?}", e))
            .collect();
        anyhow::bail!(
            "Failed to parse TypeScript file {}: {}",
            file_path,
            error_messages.join(", ")
        );
    }

    let options = IsolatedDeclarationsOptions { strip_internal };
    let dts_result = IsolatedDeclarations::new(&allocator, options).build(&parse_result.program);
    if !dts_result.errors.is_empty() {
        let error_messages: Vec<String> = dts_result
            .errors
            .iter()
            .map(|e| format!("{:?}", e))
            .collect();
        anyhow::bail!(
            "Errors generating declarations for {}: {}",
            file_path,
            error_messages.join(", ")
        );
    }

    Ok(Codegen::new().build(&dts_result.program).code)
}
