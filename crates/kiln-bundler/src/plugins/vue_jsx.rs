//! JSX/TSX against Vue's JSX runtime.
//!
//! Rolldown compiles JSX itself. This plugin only points the automatic
//! runtime at `vue` through pragma comments, so `<div />` becomes a call into
//! `vue/jsx-runtime`, which the external plugin then keeps as an import.

use crate::plugins::KilnPlugin;
use rolldown_common::ModuleType;
use rolldown_plugin::{
    HookTransformArgs, HookTransformOutput, HookTransformReturn, HookUsage, Plugin,
    SharedTransformPluginContext,
};
use std::borrow::Cow;

const JSX_PRAGMA: &str = "/** @jsxRuntime automatic */\n/** @jsxImportSource vue */\n";

#[derive(Debug, Clone, Default)]
pub struct VueJsxPlugin;

impl VueJsxPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for VueJsxPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:vue-jsx".into()
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
        let module_type = args.module_type.clone();

        async move {
            if !is_jsx_module(&id, &module_type) {
                return Ok(None);
            }

            Ok(with_vue_pragma(&code).map(|code| HookTransformOutput {
                code: Some(code),
                map: None,
                side_effects: None,
                module_type: None,
            }))
        }
    }
}

impl KilnPlugin for VueJsxPlugin {}

fn is_jsx_module(id: &str, module_type: &ModuleType) -> bool {
    matches!(module_type, ModuleType::Jsx | ModuleType::Tsx)
        || id.ends_with(".jsx")
        || id.ends_with(".tsx")
}

/// Prepends the Vue JSX pragmas unless the module already picks a source.
fn with_vue_pragma(code: &str) -> Option<String> {
    if code.contains("@jsxImportSource") {
        return None;
    }
    Some(format!("{JSX_PRAGMA}{code}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_jsx_by_type_or_extension() {
        assert!(is_jsx_module("src/Badge.tsx", &ModuleType::Ts));
        assert!(is_jsx_module("src/Card.vue", &ModuleType::Tsx));
        assert!(!is_jsx_module("src/index.ts", &ModuleType::Ts));
    }

    #[test]
    fn prepends_pragma_once() {
        let code = with_vue_pragma("export const A = () => <div />;").unwrap();
        assert!(code.starts_with("/** @jsxRuntime automatic */"));
        assert!(code.contains("@jsxImportSource vue"));
        assert!(with_vue_pragma(&code).is_none());
    }

    #[test]
    fn respects_explicit_import_source() {
        assert!(with_vue_pragma("/** @jsxImportSource preact */\n<a />").is_none());
    }
}
