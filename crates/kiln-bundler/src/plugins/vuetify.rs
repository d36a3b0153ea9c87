//! Vuetify component auto-import.
//!
//! Scans the `<template>` of each SFC for Vuetify components (`<v-btn>`,
//! `<VBtn>`) and directives (`v-ripple`) and registers them locally on the
//! component compiled by the Vue plugin. Imports target `vuetify/components`
//! and `vuetify/directives`, which stay external.

use crate::diagnostics::HookFailures;
use crate::plugins::KilnPlugin;
use crate::sfc::{SFC_BINDING, SfcDescriptor};
use anyhow::Context;
use memchr::memchr_iter;
use rolldown_plugin::{
    HookTransformArgs, HookTransformOutput, HookTransformReturn, HookUsage, Plugin,
    SharedTransformPluginContext,
};
use std::borrow::Cow;
use std::collections::BTreeSet;

const COMPONENTS_MODULE: &str = "vuetify/components";
const DIRECTIVES_MODULE: &str = "vuetify/directives";
const LOCAL_PREFIX: &str = "__vuetify_";

/// Vuetify directives, as written in templates and as exported.
const DIRECTIVES: &[(&str, &str)] = &[
    ("click-outside", "ClickOutside"),
    ("intersect", "Intersect"),
    ("mutate", "Mutate"),
    ("resize", "Resize"),
    ("ripple", "Ripple"),
    ("scroll", "Scroll"),
    ("touch", "Touch"),
    ("tooltip", "Tooltip"),
];

#[derive(Debug, Clone)]
pub struct VuetifyPlugin {
    auto_import: bool,
    failures: HookFailures,
}

impl VuetifyPlugin {
    pub fn new(auto_import: bool) -> Self {
        Self {
            auto_import,
            failures: HookFailures::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: HookFailures) -> Self {
        self.failures = failures;
        self
    }
}

impl Plugin for VuetifyPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:vuetify".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Transform
    }

    fn transform(
        &self,
        _ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let id = args.id.to_string();
        let code = args.code.to_string();
        let auto_import = self.auto_import;
        let failures = self.failures.clone();

        async move {
            if !auto_import || !id.ends_with(".vue") {
                return Ok(None);
            }

            let source = tokio::fs::read_to_string(&id)
                .await
                .with_context(|| format!("Failed to read Vue file: {}", id))
                .map_err(|err| failures.record("kiln:vuetify", &id, err))?;
            let sfc = SfcDescriptor::parse(&source)
                .with_context(|| format!("Failed to parse Vue file: {}", id))
                .map_err(|err| failures.record("kiln:vuetify", &id, err))?;
            let Some(template) = sfc.template else {
                return Ok(None);
            };

            let usage = VuetifyUsage::scan(template);
            if usage.is_empty() {
                return Ok(None);
            }

            let Some(code) = usage.inject(&code) else {
                tracing::debug!(module = %id, "no component export to register Vuetify imports on");
                return Ok(None);
            };

            tracing::debug!(
                module = %id,
                components = usage.components.len(),
                directives = usage.directives.len(),
                "registered Vuetify imports"
            );
            Ok(Some(HookTransformOutput {
                code: Some(code),
                map: None,
                side_effects: None,
                module_type: None,
            }))
        }
    }
}

impl KilnPlugin for VuetifyPlugin {}

/// Vuetify exports referenced by one template.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct VuetifyUsage {
    pub components: BTreeSet<String>,
    pub directives: BTreeSet<&'static str>,
}

impl VuetifyUsage {
    pub fn scan(template: &str) -> Self {
        let bytes = template.as_bytes();
        let mut usage = VuetifyUsage::default();

        for start in memchr_iter(b'<', bytes) {
            let name: String = template[start + 1..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            if let Some(component) = component_name(&name) {
                usage.components.insert(component);
            }
        }

        for (attribute, export) in DIRECTIVES {
            if uses_directive(template, attribute) {
                usage.directives.insert(*export);
            }
        }

        usage
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.directives.is_empty()
    }

    /// Adds imports and local registration to a compiled SFC module.
    ///
    /// Returns `None` when the module does not end with the component export
    /// produced by the Vue plugin.
    pub fn inject(&self, code: &str) -> Option<String> {
        let export = format!("export default {};", SFC_BINDING);
        let at = code.rfind(&export)?;

        let mut out = String::with_capacity(code.len() + 256);
        push_import(&mut out, self.components.iter().map(String::as_str), COMPONENTS_MODULE);
        push_import(&mut out, self.directives.iter().copied(), DIRECTIVES_MODULE);
        out.push_str(&code[..at]);
        push_registration(&mut out, "components", self.components.iter().map(String::as_str));
        push_registration(&mut out, "directives", self.directives.iter().copied());
        out.push_str(&code[at..]);
        Some(out)
    }
}

/// `v-btn` → `VBtn`, `VListItem` → `VListItem`, anything else → `None`.
fn component_name(tag: &str) -> Option<String> {
    if let Some(rest) = tag.strip_prefix("v-") {
        if rest.is_empty() || !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        let mut name = String::from("V");
        for part in rest.split('-').filter(|p| !p.is_empty()) {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                name.push(first.to_ascii_uppercase());
                name.push_str(chars.as_str());
            }
        }
        return Some(name);
    }

    let mut chars = tag.chars();
    match (chars.next(), chars.next()) {
        (Some('V'), Some(second)) if second.is_ascii_uppercase() && !tag.contains('-') => {
            Some(tag.to_string())
        }
        _ => None,
    }
}

/// Directive attributes start after whitespace and end at a value,
/// argument, modifier or the end of the tag.
fn uses_directive(template: &str, attribute: &str) -> bool {
    let needle = format!("v-{attribute}");
    template.match_indices(&needle).any(|(at, _)| {
        let before = template[..at].chars().next_back();
        let after = template[at + needle.len()..].chars().next();
        before.is_some_and(char::is_whitespace)
            && after.is_none_or(|c| matches!(c, '=' | ':' | '.' | '>' | '/') || c.is_whitespace())
    })
}

fn push_import<'a>(out: &mut String, names: impl Iterator<Item = &'a str>, module: &str) {
    let specifiers: Vec<String> = names
        .map(|name| format!("{name} as {LOCAL_PREFIX}{name}"))
        .collect();
    if !specifiers.is_empty() {
        out.push_str(&format!(
            "import {{ {} }} from \"{}\";\n",
            specifiers.join(", "),
            module
        ));
    }
}

fn push_registration<'a>(out: &mut String, option: &str, names: impl Iterator<Item = &'a str>) {
    let entries: Vec<String> = names
        .map(|name| format!("{name}: {LOCAL_PREFIX}{name}"))
        .collect();
    if !entries.is_empty() {
        out.push_str(&format!(
            "{binding}.{option} = Object.assign({{ {} }}, {binding}.{option});\n",
            entries.join(", "),
            binding = SFC_BINDING,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_kebab_and_pascal_components() {
        let usage = VuetifyUsage::scan(
            r#"<v-card><VCardTitle>Hi</VCardTitle><v-list-item /></v-card><div>plain</div>"#,
        );
        let components: Vec<_> = usage.components.iter().map(String::as_str).collect();
        assert_eq!(components, vec!["VCard", "VCardTitle", "VListItem"]);
        assert!(usage.directives.is_empty());
    }

    #[test]
    fn ignores_closing_tags_and_non_vuetify_elements() {
        let usage = VuetifyUsage::scan("<Vue></Vue><my-v-btn></my-v-btn><v-></v->");
        assert!(usage.is_empty());
    }

    #[test]
    fn finds_directives() {
        let usage = VuetifyUsage::scan(
            r#"<div v-ripple v-click-outside="close" v-scroll.self="onScroll" v-intersectx></div>"#,
        );
        let directives: Vec<_> = usage.directives.iter().copied().collect();
        assert_eq!(directives, vec!["ClickOutside", "Ripple", "Scroll"]);
    }

    #[test]
    fn injects_imports_and_registration() {
        let usage = VuetifyUsage::scan("<v-btn v-ripple>Go</v-btn>");
        let code = "const __sfc__ = {};\n__sfc__.template = \"<v-btn>Go</v-btn>\";\nexport default __sfc__;\n";
        let out = usage.inject(code).unwrap();

        assert!(out.starts_with(
            "import { VBtn as __vuetify_VBtn } from \"vuetify/components\";\nimport { Ripple as __vuetify_Ripple } from \"vuetify/directives\";\n"
        ));
        assert!(out.contains(
            "__sfc__.components = Object.assign({ VBtn: __vuetify_VBtn }, __sfc__.components);\n"
        ));
        assert!(out.contains(
            "__sfc__.directives = Object.assign({ Ripple: __vuetify_Ripple }, __sfc__.directives);\nexport default __sfc__;"
        ));
    }

    #[test]
    fn inject_requires_component_export() {
        let usage = VuetifyUsage::scan("<v-btn />");
        assert!(usage.inject("export default {}").is_none());
    }
}
