//! Non-fatal consistency checks over a [`BuildConfiguration`].
//!
//! Lint findings never stop a build. Structural problems that would make
//! the build meaningless are reported by [`crate::validation`] instead.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::library::{BuildConfiguration, LibraryFormat, TransformPlugin};

/// A configuration inconsistency worth reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum LintWarning {
    /// A global is declared for a dependency that is not external.
    DanglingGlobal { dependency: String, global: String },

    /// An external has no global while a global format is requested, so the
    /// global format has to guess the binding.
    MissingGlobal {
        dependency: String,
        format: LibraryFormat,
    },

    /// The same transform is listed more than once.
    DuplicateTransform { kind: &'static str },

    /// A transform is listed before the transform whose output it consumes.
    TransformOrder {
        plugin: &'static str,
        requires: &'static str,
    },

    /// `library_name` is not usable as a JavaScript global.
    InvalidLibraryName { name: String },

    /// `library_name` is set but no requested format reads it.
    UnusedLibraryName { name: String },
}

impl LintWarning {
    /// Short stable code for the warning.
    pub fn code(&self) -> &'static str {
        match self {
            LintWarning::DanglingGlobal { .. } => "dangling-global",
            LintWarning::MissingGlobal { .. } => "missing-global",
            LintWarning::DuplicateTransform { .. } => "duplicate-transform",
            LintWarning::TransformOrder { .. } => "transform-order",
            LintWarning::InvalidLibraryName { .. } => "invalid-library-name",
            LintWarning::UnusedLibraryName { .. } => "unused-library-name",
        }
    }
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintWarning::DanglingGlobal { dependency, global } => write!(
                f,
                "global '{global}' is declared for '{dependency}', which is not an external dependency"
            ),
            LintWarning::MissingGlobal { dependency, format } => write!(
                f,
                "external '{dependency}' has no global name for the {format} bundle"
            ),
            LintWarning::DuplicateTransform { kind } => {
                write!(f, "transform '{kind}' is listed more than once")
            }
            LintWarning::TransformOrder { plugin, requires } => write!(
                f,
                "transform '{plugin}' is listed before '{requires}', which it depends on"
            ),
            LintWarning::InvalidLibraryName { name } => {
                write!(f, "library name '{name}' is not a valid JavaScript identifier")
            }
            LintWarning::UnusedLibraryName { name } => write!(
                f,
                "library name '{name}' is unused because no umd or iife format is requested"
            ),
        }
    }
}

/// Run every lint over `config`, in a stable order.
///
/// # Example
///
/// ```
/// use kiln_config::{lint, BuildConfiguration, LintWarning};
///
/// let config = BuildConfiguration::new("src/index.ts", "lib").with_global("react", "React");
/// let warnings = lint(&config);
/// assert!(matches!(warnings[0], LintWarning::DanglingGlobal { .. }));
/// ```
pub fn lint(config: &BuildConfiguration) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    check_globals(config, &mut warnings);
    check_transforms(config, &mut warnings);
    check_library_name(config, &mut warnings);
    warnings
}

fn check_globals(config: &BuildConfiguration, warnings: &mut Vec<LintWarning>) {
    for (dependency, global) in &config.global_name_map {
        if !config.external_dependencies.contains(dependency) {
            warnings.push(LintWarning::DanglingGlobal {
                dependency: dependency.clone(),
                global: global.clone(),
            });
        }
    }

    let Some(format) = config
        .output_formats()
        .into_iter()
        .find(|format| format.needs_global_name())
    else {
        return;
    };

    for dependency in &config.external_dependencies {
        if !config.global_name_map.contains_key(dependency) {
            warnings.push(LintWarning::MissingGlobal {
                dependency: dependency.clone(),
                format,
            });
        }
    }
}

fn check_transforms(config: &BuildConfiguration, warnings: &mut Vec<LintWarning>) {
    let mut seen = HashSet::new();
    for plugin in &config.transform_plugins {
        if !seen.insert(plugin.kind()) {
            let kind = plugin.kind();
            let duplicate = LintWarning::DuplicateTransform { kind };
            if !warnings.contains(&duplicate) {
                warnings.push(duplicate);
            }
        }
    }

    let position = |wanted: &TransformPlugin| {
        config
            .transform_plugins
            .iter()
            .position(|plugin| plugin.kind() == wanted.kind())
    };
    if let (Some(vuetify), Some(vue)) = (
        position(&TransformPlugin::vuetify(true)),
        position(&TransformPlugin::Vue),
    ) {
        if vuetify < vue {
            warnings.push(LintWarning::TransformOrder {
                plugin: "vuetify",
                requires: "vue",
            });
        }
    }
}

fn check_library_name(config: &BuildConfiguration, warnings: &mut Vec<LintWarning>) {
    let Some(name) = &config.library_name else {
        return;
    };

    if !config.uses_globals() {
        warnings.push(LintWarning::UnusedLibraryName { name: name.clone() });
    } else if !is_global_identifier(name) {
        warnings.push(LintWarning::InvalidLibraryName { name: name.clone() });
    }
}

/// Accepts identifiers and dotted namespaces such as `Acme.Widgets`.
fn is_global_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => chars
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
                _ => false,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildConfigurator;

    #[test]
    fn shared_ui_preset_only_warns_about_vuetify_global() {
        let config = BuildConfigurator::shared_ui("/project").produce_configuration();
        assert_eq!(
            lint(&config),
            vec![LintWarning::MissingGlobal {
                dependency: "vuetify".into(),
                format: LibraryFormat::Umd,
            }]
        );
    }

    #[test]
    fn dangling_global_is_reported() {
        let config = BuildConfiguration::new("src/index.ts", "lib")
            .with_external("vue")
            .with_global("vue", "Vue")
            .with_global("pinia", "Pinia");
        let warnings = lint(&config);
        assert_eq!(
            warnings,
            vec![LintWarning::DanglingGlobal {
                dependency: "pinia".into(),
                global: "Pinia".into(),
            }]
        );
        assert_eq!(warnings[0].code(), "dangling-global");
    }

    #[test]
    fn missing_global_only_matters_for_global_formats() {
        let config = BuildConfiguration::new("src/index.ts", "lib").with_external("vue");
        assert!(lint(&config).is_empty());

        let config = config.with_formats([LibraryFormat::Iife]);
        assert!(matches!(
            lint(&config)[0],
            LintWarning::MissingGlobal { format: LibraryFormat::Iife, .. }
        ));
    }

    #[test]
    fn duplicate_transforms_are_reported_once() {
        let config = BuildConfiguration::new("src/index.ts", "lib")
            .with_plugin(TransformPlugin::Vue)
            .with_plugin(TransformPlugin::Vue)
            .with_plugin(TransformPlugin::Vue);
        assert_eq!(
            lint(&config),
            vec![LintWarning::DuplicateTransform { kind: "vue" }]
        );
    }

    #[test]
    fn vuetify_before_vue_is_reported() {
        let config = BuildConfiguration::new("src/index.ts", "lib")
            .with_plugin(TransformPlugin::vuetify(true))
            .with_plugin(TransformPlugin::Vue);
        assert_eq!(
            lint(&config),
            vec![LintWarning::TransformOrder {
                plugin: "vuetify",
                requires: "vue",
            }]
        );
    }

    #[test]
    fn library_name_checks() {
        let config = BuildConfiguration::new("src/index.ts", "lib").with_library_name("my-lib");
        assert_eq!(
            lint(&config),
            vec![LintWarning::InvalidLibraryName {
                name: "my-lib".into()
            }]
        );

        let config = config.with_formats([LibraryFormat::Es]);
        assert!(matches!(
            lint(&config)[0],
            LintWarning::UnusedLibraryName { .. }
        ));
    }

    #[test]
    fn identifier_rules() {
        assert!(is_global_identifier("XrdSharedUI"));
        assert!(is_global_identifier("Acme.Widgets"));
        assert!(is_global_identifier("$lib_2"));
        assert!(!is_global_identifier("2lib"));
        assert!(!is_global_identifier("Acme..Widgets"));
        assert!(!is_global_identifier(""));
    }
}
