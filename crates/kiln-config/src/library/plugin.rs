use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::helpers::default_true;

/// A source transform applied to modules reachable from the entry.
///
/// Transforms run in the order they are declared in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum TransformPlugin {
    /// Compiles Vue single-file components (`.vue`).
    Vue,

    /// Declarations emission (`.d.ts`) for the entry's public surface.
    Dts(DtsOptions),

    /// Compiles `.jsx`/`.tsx` modules against Vue's JSX runtime.
    VueJsx,

    /// Vuetify integration.
    Vuetify(VuetifyOptions),
}

/// Options of the declarations transform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtsOptions {
    /// Remove declarations tagged `@internal`
    #[serde(default)]
    pub strip_internal: bool,

    /// Directory for declaration files, relative to the bundle output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

/// Options of the Vuetify transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VuetifyOptions {
    /// Register Vuetify components used by SFC templates automatically
    #[serde(default = "default_true")]
    pub auto_import: bool,
}

impl Default for VuetifyOptions {
    fn default() -> Self {
        Self { auto_import: true }
    }
}

impl TransformPlugin {
    pub fn dts() -> Self {
        TransformPlugin::Dts(DtsOptions::default())
    }

    pub fn vuetify(auto_import: bool) -> Self {
        TransformPlugin::Vuetify(VuetifyOptions { auto_import })
    }

    /// Stable identifier, as written in configuration files.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformPlugin::Vue => "vue",
            TransformPlugin::Dts(_) => "dts",
            TransformPlugin::VueJsx => "vue-jsx",
            TransformPlugin::Vuetify(_) => "vuetify",
        }
    }

    /// Whether this transform emits declaration artifacts.
    pub fn emits_declarations(&self) -> bool {
        matches!(self, TransformPlugin::Dts(_))
    }
}

impl std::fmt::Display for TransformPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_tagged_plugins() {
        let plugins: Vec<TransformPlugin> = serde_json::from_value(json!([
            { "name": "vue" },
            { "name": "dts", "strip_internal": true },
            { "name": "vue-jsx" },
            { "name": "vuetify" }
        ]))
        .unwrap();

        assert_eq!(
            plugins,
            vec![
                TransformPlugin::Vue,
                TransformPlugin::Dts(DtsOptions {
                    strip_internal: true,
                    out_dir: None,
                }),
                TransformPlugin::VueJsx,
                TransformPlugin::vuetify(true),
            ]
        );
    }

    #[test]
    fn only_dts_emits_declarations() {
        assert!(TransformPlugin::dts().emits_declarations());
        assert!(!TransformPlugin::Vue.emits_declarations());
        assert!(!TransformPlugin::VueJsx.emits_declarations());
        assert!(!TransformPlugin::vuetify(false).emits_declarations());
    }

    #[test]
    fn rejects_unknown_plugin() {
        let result = serde_json::from_value::<TransformPlugin>(json!({ "name": "svelte" }));
        assert!(result.is_err());
    }
}
