//! Trigger dispatch.
//!
//! A trigger value is either a JSON object mapping event name → detail, or a
//! comma-separated list of bare event names. The dual-mode parse mirrors the
//! trigger-header convention the markers are modeled on: the same attribute
//! slot carries both the simple and the rich form.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use super::event_bus::{EventEmitter, ProcessorEvent};
use crate::dom::{Document, NodeId};

pub struct TriggerDispatcher {
    document: Arc<Document>,
    emitter: EventEmitter,
}

impl TriggerDispatcher {
    pub fn new(document: Arc<Document>, emitter: EventEmitter) -> Self {
        Self { document, emitter }
    }

    /// Dispatch every event named by `value`.
    pub fn dispatch(&self, value: &str) {
        match serde_json::from_str::<Value>(value) {
            Ok(Value::Object(map)) => {
                for (name, detail) in map {
                    let (target, detail) = self.resolve_detail(detail);
                    self.fire(&name, target, detail);
                }
            }
            _ => {
                for name in value.split(',') {
                    let name = name.trim();
                    if !name.is_empty() {
                        self.fire(name, self.document.root(), None);
                    }
                }
            }
        }
    }

    /// Pull a `target` selector override out of an object detail; everything
    /// else fires bare at the document root.
    fn resolve_detail(&self, detail: Value) -> (NodeId, Option<Value>) {
        let root = self.document.root();
        match detail {
            Value::Object(mut obj) => {
                let target = match obj.remove("target") {
                    Some(Value::String(selector)) => match self.document.query(&selector) {
                        Some(node) => node,
                        None => {
                            tracing::warn!(
                                %selector,
                                "trigger target not found, falling back to document root"
                            );
                            root
                        }
                    },
                    Some(other) => {
                        tracing::warn!(?other, "ignoring non-string trigger target");
                        root
                    }
                    None => root,
                };
                (target, Some(Value::Object(obj)))
            }
            _ => (root, None),
        }
    }

    fn fire(&self, name: &str, target: NodeId, detail: Option<Value>) {
        let listeners = self.document.dispatch(name, target, detail);
        tracing::debug!(name, listeners, "dispatched trigger event");
        self.emitter.emit(ProcessorEvent::TriggerFired {
            name: name.to_string(),
            timestamp: Utc::now(),
        });
    }
}
