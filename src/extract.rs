//! Fragment extraction: split a raw response into command markers and the
//! marker-free remainder.
//!
//! Only top-level markers (direct children of the parsed fragment root) are
//! returned for execution. Nested markers are deleted with a diagnostic and
//! never run; neither kind survives into the remainder.

use crate::dom::parse::parse_fragment;
use crate::dom::tree::{NodeId, Tree};
use crate::error::ExtractError;
use crate::grammar::CommandMarker;

/// Reserved tag name for command markers.
pub const COMMAND_TAG: &str = "htmx";

/// Extract top-level command markers from `response_text`.
///
/// Returns the markers in document order plus the remainder HTML. Responses
/// without markers pass through byte-identical.
pub fn extract(response_text: &str) -> Result<(Vec<CommandMarker>, String), ExtractError> {
    // fast no-op path: nothing resembling a command tag
    if response_text.is_empty() || !contains_command_tag(response_text) {
        return Ok((Vec::new(), response_text.to_string()));
    }

    let mut tree = parse_fragment(response_text)?;
    let root = tree.root();

    let all_markers: Vec<NodeId> = tree
        .descendants(root)
        .into_iter()
        .filter(|node| tree.tag_name(*node) == Some(COMMAND_TAG))
        .collect();

    if all_markers.is_empty() {
        return Ok((Vec::new(), response_text.to_string()));
    }

    let (top_level, nested): (Vec<NodeId>, Vec<NodeId>) = all_markers
        .into_iter()
        .partition(|node| tree.parent(*node) == Some(root));

    if !nested.is_empty() {
        tracing::warn!(
            count = nested.len(),
            "discarding nested command markers; commands must be top-level"
        );
        // delete nested markers first so they never leak into a top-level
        // marker's payload
        for node in &nested {
            tree.detach(*node);
        }
    }

    let markers: Vec<CommandMarker> = top_level
        .iter()
        .map(|node| build_marker(&tree, *node))
        .collect();

    for node in &top_level {
        tree.detach(*node);
    }

    Ok((markers, tree.serialize(root)))
}

/// Case-insensitive scan for `<htmx` without allocating.
fn contains_command_tag(text: &str) -> bool {
    let bytes = text.as_bytes();
    let needle = COMMAND_TAG.as_bytes();
    bytes.windows(needle.len() + 1).any(|window| {
        window[0] == b'<' && window[1..].eq_ignore_ascii_case(needle)
    })
}

fn build_marker(tree: &Tree, node: NodeId) -> CommandMarker {
    let attributes = tree
        .element(node)
        .map(|element| {
            element
                .attrs()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();
    CommandMarker::new(attributes, tree.serialize_children(node))
}
