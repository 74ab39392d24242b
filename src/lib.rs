//! # hxcmd — A Command-Fragment Processor for Hypermedia Responses
//!
//! `hxcmd` lets a server response drive client-side UI mutation, event
//! dispatch, and navigation/history changes by embedding declarative command
//! markers in the HTML fragments it returns. A marker is an element with the
//! reserved tag name `htmx`:
//!
//! ```html
//! <htmx target="#status" swap="innerHTML">Saved.</htmx>
//! ```
//!
//! The processor splits a raw response into its top-level command markers and
//! a marker-free remainder, hands the remainder back to the host engine for
//! its own swap decision, and drives each marker through a fixed pipeline —
//! validation, DOM swap, triggers at three timing phases, navigation, and
//! history mutation — strictly sequentially, with per-marker error isolation:
//!
//! - **Attribute grammar**: markers are validated against a closed attribute
//!   vocabulary; every violation for a marker is reported in one diagnostic.
//! - **Swap collaborators**: DOM mutation happens behind the [`swap`] trait
//!   seams; a default engine over the in-crate document model is included.
//! - **Triggers**: `trigger`, `trigger-after-swap`, and
//!   `trigger-after-settle` fire events at the document, as a JSON
//!   name→detail map or a comma-separated list.
//! - **Navigation**: `location` fetches and swaps content then pushes
//!   history; `redirect` and `refresh` are terminal; `push-url` and
//!   `replace-url` snapshot the page before mutating history.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hxcmd::{CommandProcessor, Document};
//!
//! #[tokio::main]
//! async fn main() {
//!     let document = Arc::new(Document::from_html("<div id=\"t\">Old</div>").unwrap());
//!     let processor = CommandProcessor::builder()
//!         .document(document.clone())
//!         .build();
//!
//!     let response = "<htmx target=\"#t\" swap=\"outerHTML\"><div id=\"t\">Hi</div></htmx>";
//!     let (remainder, handle) = processor.transform(response).unwrap();
//!     assert!(remainder.is_empty());
//!
//!     let summary = handle.wait().await.unwrap();
//!     assert!(summary.is_clean());
//! }
//! ```

pub mod api;
pub mod core;
pub mod dom;
pub mod error;
pub mod extract;
pub mod grammar;
pub mod hooks;
pub mod swap;

pub use crate::api::{CommandProcessor, CommandProcessorBuilder, CommandRunHandle};
pub use crate::core::event_bus::{
    create_event_channel, EventEmitter, EventReceiver, EventSender, ProcessorEvent,
};
pub use crate::core::executor::{CommandDispatcher, CommandState, MarkerOutcome, RunSummary};
pub use crate::core::history::{HistoryState, HistoryStore, PageSnapshot, SessionHistory, UrlChange};
pub use crate::core::navigation::{FakeNavigator, NavigationController, Navigator};
pub use crate::core::trigger::TriggerDispatcher;
pub use crate::dom::{Document, DomEvent, NodeId};
pub use crate::error::{
    CommandError, CommandResult, ExtractError, NavigationError, ProcessError, ProcessResult,
};
pub use crate::extract::{extract, COMMAND_TAG};
pub use crate::grammar::{
    validate_marker, CommandAttr, CommandMarker, Diagnostic, DiagnosticLevel, ValidationReport,
};
pub use crate::hooks::{CommandHooks, NoopHooks};
pub use crate::swap::{
    BasicSwapSpecResolver, DomSwapEngine, SwapEngine, SwapError, SwapHandle, SwapJob, SwapSpec,
    SwapSpecResolver, SwapStyle,
};
