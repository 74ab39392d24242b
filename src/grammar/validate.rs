//! Command marker validation.
//!
//! Every violation for one marker is collected into a single
//! [`ValidationReport`] so a caller sees the complete list of problems in one
//! diagnostic instead of the first one found.

use serde::{Deserialize, Serialize};

use super::attrs::CommandAttr;
use super::CommandMarker;

/// Severity level of a validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
    pub attribute: Option<String>,
}

/// Aggregated result of validating one marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .collect()
    }

    /// One-line rendering of every error message, for embedding in error
    /// displays.
    pub fn describe(&self) -> String {
        self.errors()
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn error(code: &str, message: String, attribute: Option<String>) -> Diagnostic {
    Diagnostic {
        level: DiagnosticLevel::Error,
        code: code.to_string(),
        message,
        attribute,
    }
}

/// Validate a marker against the attribute grammar.
pub fn validate_marker(marker: &CommandMarker) -> ValidationReport {
    let mut diagnostics = Vec::new();
    let mut recognized = 0usize;
    let mut seen: Vec<&str> = Vec::new();

    for (name, _) in marker.attributes() {
        match CommandAttr::from_name(name) {
            Some(_) => {
                recognized += 1;
                if seen.contains(&name) {
                    diagnostics.push(Diagnostic {
                        level: DiagnosticLevel::Warning,
                        code: "W001".to_string(),
                        message: format!("duplicate attribute: {}", name),
                        attribute: Some(name.to_string()),
                    });
                } else {
                    seen.push(name);
                }
            }
            None => diagnostics.push(error(
                "E002",
                format!("unknown attribute: {}", name),
                Some(name.to_string()),
            )),
        }
    }

    if recognized == 0 {
        diagnostics.push(error(
            "E001",
            "command carries no recognized attribute".to_string(),
            None,
        ));
    }

    let has_target = marker.has(CommandAttr::Target);
    for attr in [CommandAttr::Swap, CommandAttr::Select] {
        if marker.has(attr) && !has_target {
            diagnostics.push(error(
                "E003",
                format!("'{}' requires 'target'", attr.name()),
                Some(attr.name().to_string()),
            ));
        }
    }

    let is_valid = diagnostics
        .iter()
        .all(|d| d.level != DiagnosticLevel::Error);

    ValidationReport {
        is_valid,
        diagnostics,
    }
}
