//! Command marker data model and attribute grammar.

mod attrs;
mod validate;

pub use attrs::CommandAttr;
pub use validate::{validate_marker, Diagnostic, DiagnosticLevel, ValidationReport};

/// One command marker lifted out of a response fragment.
///
/// Constructed during fragment extraction, consumed exactly once by the
/// executor. The backing DOM nodes are already detached by the time a marker
/// exists, regardless of whether the command later fails.
#[derive(Debug, Clone)]
pub struct CommandMarker {
    attributes: Vec<(String, String)>,
    inner_html: String,
}

impl CommandMarker {
    pub fn new(attributes: Vec<(String, String)>, inner_html: String) -> Self {
        Self {
            attributes,
            inner_html,
        }
    }

    /// Attributes in document order, duplicates preserved.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// First value of `attr`, if present.
    pub fn get(&self, attr: CommandAttr) -> Option<&str> {
        let name = attr.name();
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, attr: CommandAttr) -> bool {
        self.get(attr).is_some()
    }

    /// Raw HTML nested inside the marker — the swap payload when `target`
    /// is present.
    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }
}
