//! Plugin system for kiln-bundler.
//!
//! - Plugin registry with execution phases
//! - The built-in plugins behind each configured transform

pub mod dts_emit;
pub mod external;
pub mod registry;
pub mod vue;
pub mod vue_jsx;
pub mod vuetify;

pub use dts_emit::DtsEmitPlugin;
pub use external::ExternalPlugin;
pub use registry::{KilnPlugin, PluginPhase, PluginRegistry};
pub use vue::VuePlugin;
pub use vue_jsx::VueJsxPlugin;
pub use vuetify::VuetifyPlugin;
