//! Plugin registry with execution phases.
//!
//! Rolldown runs plugin hooks in registration order. The registry groups
//! plugins by phase and keeps declaration order within a phase, so the
//! transforms a configuration lists run in exactly that order.

use crate::SharedPluginable;
use rolldown_plugin::Plugin;
use std::sync::Arc;

/// Plugin execution phases
///
/// Plugins are executed in phase order (lower numbers first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginPhase {
    /// Externalization of peer dependencies (always first)
    Resolve = 10,

    /// Configured transform plugins, in declaration order
    Transform = 20,
}

/// Trait for kiln plugins that specify their execution phase
///
/// `Plugin` already requires `Send + Sync`.
pub trait KilnPlugin: Plugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Transform
    }
}

/// Plugin registry that maintains plugins in phase order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<(PluginPhase, String, SharedPluginable)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin to the registry.
    ///
    /// Sorting happens once, in `into_rolldown_plugins()`.
    pub fn add<P: KilnPlugin + 'static>(&mut self, plugin: P) {
        let phase = plugin.phase();
        self.add_with_phase(plugin, phase);
    }

    /// Add a plugin with an explicit phase.
    pub fn add_with_phase<P: Plugin + 'static>(&mut self, plugin: P, phase: PluginPhase) {
        let name = plugin.name().into_owned();
        let plugin_arc: SharedPluginable = Arc::new(plugin);
        self.plugins.push((phase, name, plugin_arc));
    }

    /// Plugin names in the order Rolldown will run them.
    pub fn names(&self) -> Vec<String> {
        let mut named: Vec<_> = self
            .plugins
            .iter()
            .map(|(phase, name, _)| (*phase, name.clone()))
            .collect();
        named.sort_by_key(|(phase, _)| *phase);
        named.into_iter().map(|(_, name)| name).collect()
    }

    /// Convert to Rolldown plugins in execution order.
    ///
    /// The sort is stable: plugins sharing a phase keep their insertion order.
    pub fn into_rolldown_plugins(mut self) -> Vec<SharedPluginable> {
        self.plugins.sort_by_key(|(phase, _, _)| *phase);
        self.plugins
            .into_iter()
            .map(|(_, _, plugin)| plugin)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
