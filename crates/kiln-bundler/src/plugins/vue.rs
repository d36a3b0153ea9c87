//! Rolldown plugin for Vue Single File Components.
//!
//! ```text
//! .vue file → load() → SfcDescriptor → component module → Rolldown
//! ```
//!
//! The component's `<script>` becomes the module body. Its default export is
//! rebound to [`SFC_BINDING`] so the `<template>` source can be attached as
//! the `template` option and compiled by Vue at runtime. `<script setup>` is
//! rejected since it needs the full SFC compiler.

use crate::diagnostics::HookFailures;
use crate::plugins::KilnPlugin;
use crate::sfc::{SFC_BINDING, SfcDescriptor};
use anyhow::Context;
use rolldown_common::ModuleType;
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookUsage, Plugin, PluginContext,
};
use std::borrow::Cow;

#[derive(Debug, Clone, Default)]
pub struct VuePlugin {
    failures: HookFailures,
}

impl VuePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_failures(mut self, failures: HookFailures) -> Self {
        self.failures = failures;
        self
    }
}

impl Plugin for VuePlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:vue".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Load
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let failures = self.failures.clone();

        async move {
            if !id.ends_with(".vue") {
                return Ok(None);
            }

            let compiled = match tokio::fs::read_to_string(&id).await {
                Ok(source) => compile_component(&id, &source),
                Err(e) => {
                    Err(anyhow::Error::new(e).context(format!("Failed to read Vue file: {}", id)))
                }
            };
            let (code, module_type) =
                compiled.map_err(|err| failures.record("kiln:vue", &id, err))?;

            Ok(Some(HookLoadOutput {
                code: code.into(),
                module_type: Some(module_type),
                ..Default::default()
            }))
        }
    }
}

impl KilnPlugin for VuePlugin {}

/// Turns an SFC into a module exporting its component options.
pub(crate) fn compile_component(id: &str, source: &str) -> anyhow::Result<(String, ModuleType)> {
    let sfc =
        SfcDescriptor::parse(source).with_context(|| format!("Failed to parse Vue file: {}", id))?;

    if sfc.has_setup_script() {
        anyhow::bail!(
            "<script setup> is not supported in {}: use a <script> block exporting defineComponent(...)",
            id
        );
    }
    if sfc.scripts.len() > 1 {
        anyhow::bail!(
            "{} has {} <script> blocks, expected at most one",
            id,
            sfc.scripts.len()
        );
    }
    if sfc.style_count > 0 {
        tracing::warn!(
            module = %id,
            blocks = sfc.style_count,
            "<style> blocks are not bundled; ship component styles separately"
        );
    }

    let script = sfc.scripts.first();
    let module_type = script
        .map(|s| module_type_for_lang(s.lang))
        .unwrap_or(ModuleType::Js);

    let mut code = String::with_capacity(source.len() + 128);
    match script.map(|s| s.content) {
        Some(body) if body.contains("export default") => {
            code.push_str(&body.replacen("export default", &format!("const {} =", SFC_BINDING), 1));
        }
        Some(body) => {
            code.push_str(body);
            code.push_str(&format!("\nconst {} = {{}};", SFC_BINDING));
        }
        None => code.push_str(&format!("const {} = {{}};", SFC_BINDING)),
    }
    code.push('\n');

    if let Some(template) = sfc.template {
        let literal = serde_json::to_string(template.trim())
            .with_context(|| format!("Failed to encode template of {}", id))?;
        code.push_str(&format!("{}.template = {};\n", SFC_BINDING, literal));
    }
    code.push_str(&format!("export default {};\n", SFC_BINDING));

    Ok((code, module_type))
}

fn module_type_for_lang(lang: &str) -> ModuleType {
    match lang {
        "ts" => ModuleType::Ts,
        "tsx" => ModuleType::Tsx,
        "jsx" => ModuleType::Jsx,
        _ => ModuleType::Js,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_template_to_default_export() {
        let vue = r#"
<template>
  <div class="card">{{ title }}</div>
</template>
<script lang="ts">
import { defineComponent } from 'vue'
export default defineComponent({ props: { title: String } })
</script>
"#;
        let (code, module_type) = compile_component("Card.vue", vue).unwrap();
        assert!(matches!(module_type, ModuleType::Ts));
        assert!(code.contains("const __sfc__ = defineComponent("));
        assert!(code.contains(r#"__sfc__.template = "<div class=\"card\">{{ title }}</div>";"#));
        assert!(code.trim_end().ends_with("export default __sfc__;"));
        assert!(!code.contains("export default defineComponent"));
    }

    #[test]
    fn template_only_component() {
        let (code, module_type) =
            compile_component("Divider.vue", "<template><hr /></template>").unwrap();
        assert!(matches!(module_type, ModuleType::Js));
        assert!(code.starts_with("const __sfc__ = {};"));
        assert!(code.contains(r#"__sfc__.template = "<hr />";"#));
    }

    #[test]
    fn script_without_default_export_gets_empty_options() {
        let (code, _) =
            compile_component("Util.vue", "<script>export const size = 4</script>").unwrap();
        assert!(code.contains("export const size = 4\nconst __sfc__ = {};"));
    }

    #[test]
    fn script_setup_is_rejected() {
        let err = compile_component(
            "Counter.vue",
            "<script setup>const n = 1</script><template>{{ n }}</template>",
        )
        .unwrap_err();
        assert!(err.to_string().contains("<script setup> is not supported in Counter.vue"));
    }

    #[test]
    fn styles_are_dropped() {
        let (code, _) = compile_component(
            "Styled.vue",
            "<template><p/></template><style>p { color: red }</style>",
        )
        .unwrap();
        assert!(!code.contains("color"));
    }

    #[test]
    fn lang_maps_to_module_type() {
        assert!(matches!(module_type_for_lang("tsx"), ModuleType::Tsx));
        assert!(matches!(module_type_for_lang("jsx"), ModuleType::Jsx));
        assert!(matches!(module_type_for_lang("coffee"), ModuleType::Js));
    }
}
