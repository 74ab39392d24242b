//! Arena-indexed node tree used for both detached response fragments and the
//! live document double.

use std::collections::HashMap;

/// Index of a node in a [`Tree`] arena. Never reused within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// An element node: tag name plus attributes in document order.
///
/// Attributes are kept as an ordered list rather than a map so that
/// serialization and diagnostics are deterministic.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: String, attrs: Vec<(String, String)>) -> Self {
        Self { tag, attrs }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// First value for `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class_name))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Root,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// A node arena with one root. Detached nodes stay in the arena but are
/// unreachable from the root and invisible to the id index.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    id_index: HashMap<String, Vec<NodeId>>,
}

impl Tree {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Root,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Create an element, appended under `parent` when given.
    pub fn create_element(
        &mut self,
        parent: Option<NodeId>,
        tag: String,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        let id = self.push_node(Node {
            parent,
            children: Vec::new(),
            kind: NodeKind::Element(Element::new(tag, attrs)),
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
            if self.is_attached(id) {
                self.index_subtree(id);
            }
        }
        id
    }

    /// Create a text node, appended under `parent` when given.
    pub fn create_text(&mut self, parent: Option<NodeId>, text: String) -> NodeId {
        let id = self.push_node(Node {
            parent,
            children: Vec::new(),
            kind: NodeKind::Text(text),
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    /// Create a detached container used to stage parsed fragments before they
    /// are grafted into place.
    pub fn create_fragment(&mut self) -> NodeId {
        self.push_node(Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Root,
        })
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// True when `id` is reachable from the tree root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn child_position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    /// Detach `id` from its parent. The subtree stays intact but becomes
    /// unreachable; its ids leave the index.
    pub fn detach(&mut self, id: NodeId) {
        let was_attached = self.is_attached(id);
        if let Some(parent) = self.nodes[id.0].parent {
            self.nodes[parent.0].children.retain(|c| *c != id);
            self.nodes[id.0].parent = None;
        }
        if was_attached {
            self.unindex_subtree(id);
        }
    }

    /// Attach a detached node under `parent` at `index` in its child list.
    pub fn attach(&mut self, parent: NodeId, index: usize, id: NodeId) {
        if let Some(old_parent) = self.nodes[id.0].parent {
            self.nodes[old_parent.0].children.retain(|c| *c != id);
        }
        self.nodes[id.0].parent = Some(parent);
        let index = index.min(self.nodes[parent.0].children.len());
        self.nodes[parent.0].children.insert(index, id);
        if self.is_attached(id) {
            self.index_subtree(id);
        }
    }

    pub fn append(&mut self, parent: NodeId, id: NodeId) {
        let end = self.children(parent).len();
        self.attach(parent, end, id);
    }

    /// Detach every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
    }

    fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for child in self.children(current).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    fn index_subtree(&mut self, id: NodeId) {
        for node in self.subtree_ids(id) {
            if let Some(id_attr) = self.element(node).and_then(|e| e.attr("id")) {
                let id_attr = id_attr.to_string();
                if !id_attr.is_empty() {
                    self.id_index.entry(id_attr).or_default().push(node);
                }
            }
        }
    }

    fn unindex_subtree(&mut self, id: NodeId) {
        for node in self.subtree_ids(id) {
            if let Some(id_attr) = self.element(node).and_then(|e| e.attr("id")) {
                let id_attr = id_attr.to_string();
                if let Some(nodes) = self.id_index.get_mut(&id_attr) {
                    nodes.retain(|candidate| *candidate != node);
                    if nodes.is_empty() {
                        self.id_index.remove(&id_attr);
                    }
                }
            }
        }
    }

    /// First attached element carrying `id="..."`, in insertion order.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).and_then(|ids| ids.first().copied())
    }

    /// Concatenated text content of the subtree rooted at `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        match &self.nodes[id.0].kind {
            NodeKind::Root | NodeKind::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeKind::Text(text) => text.clone(),
        }
    }

    /// Serialize the subtree rooted at `id` back to HTML text.
    pub fn serialize(&self, id: NodeId) -> String {
        match &self.nodes[id.0].kind {
            NodeKind::Root => {
                let mut out = String::new();
                for child in &self.nodes[id.0].children {
                    out.push_str(&self.serialize(*child));
                }
                out
            }
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element(element) => {
                let mut out = String::new();
                out.push('<');
                out.push_str(element.tag());
                for (name, value) in element.attrs() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if is_void_tag(element.tag()) {
                    return out;
                }
                for child in &self.nodes[id.0].children {
                    out.push_str(&self.serialize(*child));
                }
                out.push_str("</");
                out.push_str(element.tag());
                out.push('>');
                out
            }
        }
    }

    /// Serialize only the children of `id`.
    pub fn serialize_children(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            out.push_str(&self.serialize(*child));
        }
        out
    }

    /// Attached descendants of `scope` in document order (pre-order,
    /// excluding `scope` itself).
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            for child in self.children(current).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}
