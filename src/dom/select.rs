//! CSS selector subset used for target and trigger resolution.
//!
//! Supports compound simple selectors (`tag`, `#id`, `.class` and their
//! combinations), descendant chains separated by whitespace, and
//! comma-separated groups. That covers the selector surface command markers
//! use; anything richer is rejected as unsupported.

use super::tree::{NodeId, Tree};

#[derive(Debug, Clone, PartialEq, Eq)]
struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

#[derive(Debug, Clone)]
struct SelectorChain(Vec<SimpleSelector>);

#[derive(Debug, Clone)]
pub struct Selector {
    groups: Vec<SelectorChain>,
}

impl Selector {
    /// Parse a selector string; `Err` carries the reason it is unsupported.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut groups = Vec::new();
        for group in input.split(',') {
            let group = group.trim();
            if group.is_empty() {
                return Err(format!("empty selector group in {:?}", input));
            }
            let mut chain = Vec::new();
            for step in group.split_whitespace() {
                chain.push(parse_step(step)?);
            }
            if chain.is_empty() {
                return Err(format!("empty selector chain in {:?}", input));
            }
            groups.push(SelectorChain(chain));
        }
        if groups.is_empty() {
            return Err("empty selector".into());
        }
        Ok(Self { groups })
    }

    /// First attached descendant of `scope` matching any group, in document
    /// order.
    pub fn query_first(&self, tree: &Tree, scope: NodeId) -> Option<NodeId> {
        tree.descendants(scope)
            .into_iter()
            .find(|node| self.matches(tree, *node))
    }

    /// All attached descendants of `scope` matching any group.
    pub fn query_all(&self, tree: &Tree, scope: NodeId) -> Vec<NodeId> {
        tree.descendants(scope)
            .into_iter()
            .filter(|node| self.matches(tree, *node))
            .collect()
    }

    fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        self.groups.iter().any(|chain| chain_matches(tree, node, chain))
    }
}

fn chain_matches(tree: &Tree, node: NodeId, chain: &SelectorChain) -> bool {
    let steps = &chain.0;
    let last = match steps.last() {
        Some(step) => step,
        None => return false,
    };
    if !step_matches(tree, node, last) {
        return false;
    }
    // remaining steps must match ancestors, outermost first
    let mut remaining = steps.len() - 1;
    let mut cursor = tree.parent(node);
    while remaining > 0 {
        let ancestor = match cursor {
            Some(a) => a,
            None => return false,
        };
        if step_matches(tree, ancestor, &steps[remaining - 1]) {
            remaining -= 1;
        }
        cursor = tree.parent(ancestor);
    }
    true
}

fn step_matches(tree: &Tree, node: NodeId, step: &SimpleSelector) -> bool {
    let element = match tree.element(node) {
        Some(e) => e,
        None => return false,
    };
    if let Some(tag) = &step.tag {
        if !element.tag().eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &step.id {
        if element.attr("id") != Some(id.as_str()) {
            return false;
        }
    }
    step.classes.iter().all(|class| element.has_class(class))
}

fn parse_step(step: &str) -> Result<SimpleSelector, String> {
    let mut tag = None;
    let mut id = None;
    let mut classes = Vec::new();

    let mut rest = step;
    if !rest.starts_with('#') && !rest.starts_with('.') && rest != "*" {
        let end = rest
            .find(|c| c == '#' || c == '.')
            .unwrap_or(rest.len());
        let name = &rest[..end];
        if name.is_empty() || !name.chars().all(is_name_char) {
            return Err(format!("unsupported selector step {:?}", step));
        }
        tag = Some(name.to_ascii_lowercase());
        rest = &rest[end..];
    } else if rest == "*" {
        return Ok(SimpleSelector {
            tag: None,
            id: None,
            classes: Vec::new(),
        });
    }

    while !rest.is_empty() {
        let (marker, tail) = rest.split_at(1);
        let end = tail.find(|c| c == '#' || c == '.').unwrap_or(tail.len());
        let name = &tail[..end];
        if name.is_empty() || !name.chars().all(is_name_char) {
            return Err(format!("unsupported selector step {:?}", step));
        }
        match marker {
            "#" => {
                if id.replace(name.to_string()).is_some() {
                    return Err(format!("multiple ids in selector step {:?}", step));
                }
            }
            "." => classes.push(name.to_string()),
            _ => return Err(format!("unsupported selector step {:?}", step)),
        }
        rest = &tail[end..];
    }

    if tag.is_none() && id.is_none() && classes.is_empty() {
        return Err(format!("unsupported selector step {:?}", step));
    }

    Ok(SimpleSelector { tag, id, classes })
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse::parse_fragment;

    fn fixture() -> Tree {
        parse_fragment(
            "<div id=\"wrap\" class=\"box outer\">\
               <span class=\"label\">a</span>\
               <div id=\"inner\"><span class=\"label hot\">b</span></div>\
             </div>\
             <span class=\"label\">c</span>",
        )
        .unwrap()
    }

    #[test]
    fn test_id_selector() {
        let tree = fixture();
        let sel = Selector::parse("#inner").unwrap();
        let hit = sel.query_first(&tree, tree.root()).unwrap();
        assert_eq!(tree.element(hit).unwrap().attr("id"), Some("inner"));
    }

    #[test]
    fn test_class_selector_all() {
        let tree = fixture();
        let sel = Selector::parse(".label").unwrap();
        assert_eq!(sel.query_all(&tree, tree.root()).len(), 3);
    }

    #[test]
    fn test_tag_selector_first_in_document_order() {
        let tree = fixture();
        let sel = Selector::parse("span").unwrap();
        let hit = sel.query_first(&tree, tree.root()).unwrap();
        assert_eq!(tree.text_content(hit), "a");
    }

    #[test]
    fn test_compound_selector() {
        let tree = fixture();
        let sel = Selector::parse("span.label.hot").unwrap();
        let hits = sel.query_all(&tree, tree.root());
        assert_eq!(hits.len(), 1);
        assert_eq!(tree.text_content(hits[0]), "b");
    }

    #[test]
    fn test_descendant_chain() {
        let tree = fixture();
        let sel = Selector::parse("#wrap .label").unwrap();
        assert_eq!(sel.query_all(&tree, tree.root()).len(), 2);

        let deep = Selector::parse("#inner span").unwrap();
        let hits = deep.query_all(&tree, tree.root());
        assert_eq!(hits.len(), 1);
        assert_eq!(tree.text_content(hits[0]), "b");
    }

    #[test]
    fn test_group_selector() {
        let tree = fixture();
        let sel = Selector::parse("#inner, .outer").unwrap();
        assert_eq!(sel.query_all(&tree, tree.root()).len(), 2);
    }

    #[test]
    fn test_no_match() {
        let tree = fixture();
        let sel = Selector::parse("#missing").unwrap();
        assert!(sel.query_first(&tree, tree.root()).is_none());
    }

    #[test]
    fn test_unsupported_selector_rejected() {
        assert!(Selector::parse("div > span").is_err());
        assert!(Selector::parse("a[href]").is_err());
        assert!(Selector::parse("").is_err());
    }
}
