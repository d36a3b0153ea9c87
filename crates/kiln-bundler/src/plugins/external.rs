//! Externalization of peer dependencies.
//!
//! Every import of a configured external dependency (or one of its subpaths)
//! is left as an import in the output instead of being inlined. The plugin
//! runs before any transform so nothing gets a chance to load those modules.

use crate::plugins::{KilnPlugin, PluginPhase};
use kiln_config::BuildConfiguration;
use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use std::borrow::Cow;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ExternalPlugin {
    config: Arc<BuildConfiguration>,
}

impl ExternalPlugin {
    pub fn new(config: Arc<BuildConfiguration>) -> Self {
        Self { config }
    }
}

impl Plugin for ExternalPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:external".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let external = self.config.is_external(&specifier);

        async move {
            if !external {
                return Ok(None);
            }

            tracing::trace!(specifier = %specifier, "externalized");
            Ok(Some(HookResolveIdOutput {
                id: specifier.into(),
                external: Some(ResolvedExternal::Bool(true)),
                ..Default::default()
            }))
        }
    }
}

impl KilnPlugin for ExternalPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Resolve
    }
}
