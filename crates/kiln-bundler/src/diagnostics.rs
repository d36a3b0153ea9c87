//! Diagnostic extraction from Rolldown errors.
//!
//! Rolldown reports failures as batched diagnostics whose structure changes
//! between releases. This module reads their debug rendering and keeps the
//! parts kiln reports: the kind, the offending file, the plugin that failed
//! and any help text.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Extracted diagnostic information from Rolldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDiagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    pub help: Option<String>,
    /// Name of the plugin that raised the error, for transform failures
    pub plugin: Option<String>,
}

/// Diagnostic kind (subset of Rolldown's event kinds that kiln distinguishes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnresolvedEntry,
    UnresolvedImport,
    ParseError,
    /// A transform plugin hook failed
    Transform,
    MissingGlobalName,
    Other(String),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnresolvedEntry => write!(f, "UnresolvedEntry"),
            DiagnosticKind::UnresolvedImport => write!(f, "UnresolvedImport"),
            DiagnosticKind::ParseError => write!(f, "ParseError"),
            DiagnosticKind::Transform => write!(f, "Transform"),
            DiagnosticKind::MissingGlobalName => write!(f, "MissingGlobalName"),
            DiagnosticKind::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl ExtractedDiagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            file: None,
            help: None,
            plugin: None,
        }
    }
}

/// Failures raised by kiln's own plugin hooks during one Rolldown run.
///
/// Rolldown replaces a hook's error with a generic "plugin threw an error"
/// event, so each hook records the real cause here before failing. Clones
/// share the same list.
#[derive(Debug, Clone, Default)]
pub(crate) struct HookFailures(Arc<Mutex<Vec<ExtractedDiagnostic>>>);

impl HookFailures {
    /// Logs and records `err` for `module`, then hands it back to the hook.
    pub(crate) fn record(&self, plugin: &str, module: &str, err: anyhow::Error) -> anyhow::Error {
        tracing::error!(plugin, module, "{err:#}");
        self.0.lock().push(ExtractedDiagnostic {
            kind: DiagnosticKind::Transform,
            severity: DiagnosticSeverity::Error,
            message: format!("{err:#}"),
            file: Some(module.to_string()),
            help: None,
            plugin: Some(plugin.to_string()),
        });
        err
    }

    /// Recorded failures followed by the Rolldown diagnostics they do not
    /// already explain.
    pub(crate) fn merge(&self, rolldown: Vec<ExtractedDiagnostic>) -> Vec<ExtractedDiagnostic> {
        let mut diagnostics = std::mem::take(&mut *self.0.lock());
        if diagnostics.is_empty() {
            return rolldown;
        }
        let recorded: Vec<String> = diagnostics.iter().filter_map(|d| d.plugin.clone()).collect();
        diagnostics.extend(
            rolldown
                .into_iter()
                .filter(|d| d.plugin.as_ref().is_none_or(|name| !recorded.contains(name))),
        );
        diagnostics
    }
}

/// Extract diagnostics from Rolldown error types.
pub fn extract_from_rolldown_error(error: &dyn fmt::Debug) -> Vec<ExtractedDiagnostic> {
    let error_str = format!("{error:?}");

    let parts: Vec<&str> = error_str
        .split("BatchedBuildDiagnostic")
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .collect();

    if parts.len() > 1 {
        parts.iter().map(|part| extract_single(part)).collect()
    } else {
        vec![extract_single(&error_str)]
    }
}

fn extract_single(error_str: &str) -> ExtractedDiagnostic {
    let plugin = extract_plugin_name(error_str);

    let kind = if plugin.is_some() {
        DiagnosticKind::Transform
    } else if error_str.contains("UnresolvedEntry") {
        DiagnosticKind::UnresolvedEntry
    } else if error_str.contains("UnresolvedImport") || error_str.contains("Could not resolve") {
        DiagnosticKind::UnresolvedImport
    } else if error_str.contains("MissingGlobalName") || error_str.contains("MISSING_GLOBAL_NAME")
    {
        DiagnosticKind::MissingGlobalName
    } else if error_str.contains("Parse error")
        || error_str.contains("Syntax")
        || error_str.contains("Expected")
    {
        DiagnosticKind::ParseError
    } else {
        DiagnosticKind::Other("BundlerError".to_string())
    };

    let severity = if error_str.contains("Warning") || error_str.contains("warning") {
        DiagnosticSeverity::Warning
    } else {
        DiagnosticSeverity::Error
    };

    let help = extract_help_text(error_str).or_else(|| default_help(&kind));

    ExtractedDiagnostic {
        kind,
        severity,
        message: error_str.trim().to_string(),
        file: extract_file_path(error_str),
        help,
        plugin,
    }
}

fn default_help(kind: &DiagnosticKind) -> Option<String> {
    let help = match kind {
        DiagnosticKind::UnresolvedEntry => "Check that entry_path points at an existing module",
        DiagnosticKind::UnresolvedImport => {
            "Install the dependency or list it in external_dependencies"
        }
        DiagnosticKind::MissingGlobalName => {
            "Add the external to global_name_map so umd/iife bundles can read it"
        }
        _ => return None,
    };
    Some(help.to_string())
}

/// Plugin names are prefixed with `kiln:`.
fn extract_plugin_name(text: &str) -> Option<String> {
    let start = text.find("kiln:")?;
    let name: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '-' | '_'))
        .collect();
    (name.len() > "kiln:".len()).then_some(name)
}

fn extract_file_path(text: &str) -> Option<String> {
    for ext in [".vue", ".tsx", ".ts", ".jsx", ".mjs", ".cjs", ".js"] {
        let Some(pos) = text.find(ext) else {
            continue;
        };
        let before = &text[..pos + ext.len()];
        for indicator in ["in ", "at ", "file: ", "path: ", "\"", "'"] {
            if let Some(start) = before.rfind(indicator) {
                let path_str = &before[start + indicator.len()..];
                if !path_str.contains(char::is_whitespace) {
                    return Some(path_str.trim().to_string());
                }
            }
        }
    }
    None
}

fn extract_help_text(text: &str) -> Option<String> {
    for indicator in ["help: ", "Help: ", "hint: ", "Hint: "] {
        if let Some(pos) = text.find(indicator) {
            let after = &text[pos + indicator.len()..];
            let help_str = after.lines().next().unwrap_or("").trim();
            if !help_str.is_empty() {
                return Some(help_str.to_string());
            }
        }
    }
    None
}
