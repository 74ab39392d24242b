//! Document model — the live-document double the processor mutates and
//! dispatches events against.
//!
//! Embedders targeting a real DOM implement the swap and navigation
//! collaborator traits against their own platform; everything in this module
//! is plain data, so tests and server-side embedders get a complete document
//! without one.

pub mod parse;
pub mod select;
pub mod tree;

pub use select::Selector;
pub use tree::{Element, NodeId, Tree};

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

/// An event dispatched at a document node.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub name: String,
    pub target: NodeId,
    pub detail: Option<Value>,
}

type ListenerFn = dyn Fn(&DomEvent) + Send + Sync;

/// Listeners registered by event name. Dispatch scope is the whole document;
/// the resolved target travels on the event itself.
#[derive(Default)]
pub struct ListenerStore {
    listeners: HashMap<String, Vec<Arc<ListenerFn>>>,
}

impl ListenerStore {
    pub fn add(&mut self, name: &str, listener: Arc<ListenerFn>) {
        self.listeners.entry(name.to_string()).or_default().push(listener);
    }

    fn get(&self, name: &str) -> Vec<Arc<ListenerFn>> {
        self.listeners.get(name).cloned().unwrap_or_default()
    }
}

/// Shared document: node tree plus event listeners.
///
/// The tree sits behind a mutex; only the swap engine mutates it, and the
/// strictly sequential marker pipeline keeps mutations ordered.
pub struct Document {
    tree: Mutex<Tree>,
    listeners: Mutex<ListenerStore>,
}

impl Document {
    /// Empty document (just a root).
    pub fn new() -> Self {
        Self {
            tree: Mutex::new(Tree::new()),
            listeners: Mutex::new(ListenerStore::default()),
        }
    }

    /// Build the initial document from HTML text.
    pub fn from_html(html: &str) -> Result<Self, crate::error::ExtractError> {
        let tree = parse::parse_fragment(html)?;
        Ok(Self {
            tree: Mutex::new(tree),
            listeners: Mutex::new(ListenerStore::default()),
        })
    }

    pub fn root(&self) -> NodeId {
        self.tree.lock().root()
    }

    /// Resolve a selector against the whole document. Unsupported selectors
    /// resolve to nothing, with a diagnostic.
    pub fn query(&self, selector: &str) -> Option<NodeId> {
        let parsed = match Selector::parse(selector) {
            Ok(parsed) => parsed,
            Err(reason) => {
                tracing::warn!(selector, %reason, "ignoring unsupported selector");
                return None;
            }
        };
        let tree = self.tree.lock();
        let root = tree.root();
        parsed.query_first(&tree, root)
    }

    /// Whether `id` is still attached to the document.
    pub fn contains(&self, id: NodeId) -> bool {
        self.tree.lock().is_attached(id)
    }

    /// Serialize the whole document.
    pub fn html(&self) -> String {
        let tree = self.tree.lock();
        let root = tree.root();
        tree.serialize(root)
    }

    /// Concatenated text content of a node's subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        self.tree.lock().text_content(id)
    }

    /// Run `f` with exclusive access to the tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&mut Tree) -> R) -> R {
        f(&mut self.tree.lock())
    }

    /// Register a listener for events named `name`.
    pub fn add_listener(&self, name: &str, listener: impl Fn(&DomEvent) + Send + Sync + 'static) {
        self.listeners.lock().add(name, Arc::new(listener));
    }

    /// Dispatch an event, returning how many listeners ran.
    ///
    /// Listeners are invoked outside the tree lock so they may query the
    /// document.
    pub fn dispatch(&self, name: &str, target: NodeId, detail: Option<Value>) -> usize {
        let listeners = self.listeners.lock().get(name);
        let event = DomEvent {
            name: name.to_string(),
            target,
            detail,
        };
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
