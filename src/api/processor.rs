//! Builder-configured command processor.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use parking_lot::Mutex;

use super::handle::CommandRunHandle;
use crate::core::event_bus::{create_event_channel, EventEmitter, EventReceiver};
use crate::core::executor::CommandDispatcher;
use crate::core::history::{HistoryState, HistoryStore, SessionHistory};
use crate::core::navigation::{FakeNavigator, NavigationController, Navigator};
use crate::core::trigger::TriggerDispatcher;
use crate::dom::Document;
use crate::error::ProcessResult;
use crate::extract::extract;
use crate::hooks::{CommandHooks, NoopHooks};
use crate::swap::{BasicSwapSpecResolver, DomSwapEngine, SwapEngine, SwapSpecResolver};

/// Response-transform processor with builder-based configuration.
///
/// Use [`CommandProcessor::builder()`] to wire the document and the
/// collaborators; every seam has an in-crate default.
pub struct CommandProcessor {
    document: Arc<Document>,
    engine: Arc<dyn SwapEngine>,
    resolver: Arc<dyn SwapSpecResolver>,
    navigator: Arc<dyn Navigator>,
    history: Arc<dyn HistoryStore>,
    state: Arc<HistoryState>,
    hooks: Arc<dyn CommandHooks>,
    emitter: EventEmitter,
    events: Mutex<Option<EventReceiver>>,
}

impl CommandProcessor {
    pub fn builder() -> CommandProcessorBuilder {
        CommandProcessorBuilder::default()
    }

    /// The live document this processor mutates.
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// Current history path.
    pub fn history_state(&self) -> &Arc<HistoryState> {
        &self.state
    }

    /// Take the event receiver. Only available once, and only when the
    /// processor was built with `collect_events(true)`.
    pub fn take_events(&self) -> Option<EventReceiver> {
        self.events.lock().take()
    }

    /// Transform one response: strip command markers and kick off their
    /// execution.
    ///
    /// Returns the marker-free remainder for the host's own swap decision
    /// immediately; the markers run on a background task, strictly
    /// sequentially, reachable through the returned handle.
    pub fn transform(&self, response_text: &str) -> ProcessResult<(String, CommandRunHandle)> {
        let (markers, remainder) = extract(response_text)?;

        let dispatcher = CommandDispatcher::new(
            self.document.clone(),
            self.engine.clone(),
            self.resolver.clone(),
            self.hooks.clone(),
            TriggerDispatcher::new(self.document.clone(), self.emitter.clone()),
            NavigationController::new(
                self.document.clone(),
                self.engine.clone(),
                self.resolver.clone(),
                self.navigator.clone(),
                self.history.clone(),
                self.state.clone(),
            ),
            self.emitter.clone(),
        );

        let join = tokio::spawn(async move { dispatcher.run(markers).await });
        Ok((remainder, CommandRunHandle::new(join)))
    }
}

/// Builder for [`CommandProcessor`].
#[derive(Default)]
pub struct CommandProcessorBuilder {
    document: Option<Arc<Document>>,
    engine: Option<Arc<dyn SwapEngine>>,
    resolver: Option<Arc<dyn SwapSpecResolver>>,
    navigator: Option<Arc<dyn Navigator>>,
    history: Option<Arc<dyn HistoryStore>>,
    hooks: Option<Arc<dyn CommandHooks>>,
    initial_path: Option<String>,
    collect_events: bool,
}

impl CommandProcessorBuilder {
    /// Live document to mutate. Defaults to an empty document.
    pub fn document(mut self, document: Arc<Document>) -> Self {
        self.document = Some(document);
        self
    }

    /// Swap collaborator. Defaults to [`DomSwapEngine`] over the document.
    pub fn swap_engine(mut self, engine: Arc<dyn SwapEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Swap-spec resolver. Defaults to [`BasicSwapSpecResolver`].
    pub fn swap_spec_resolver(mut self, resolver: Arc<dyn SwapSpecResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Navigation collaborator. Defaults to a recording [`FakeNavigator`].
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// History snapshot store. Defaults to [`SessionHistory`].
    pub fn history_store(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    /// Cancellation hooks. Defaults to [`NoopHooks`].
    pub fn hooks(mut self, hooks: Arc<dyn CommandHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Initial history path. Defaults to `"/"`.
    pub fn initial_path(mut self, path: impl Into<String>) -> Self {
        self.initial_path = Some(path.into());
        self
    }

    /// Keep lifecycle events; read them via
    /// [`CommandProcessor::take_events`].
    pub fn collect_events(mut self, collect: bool) -> Self {
        self.collect_events = collect;
        self
    }

    pub fn build(self) -> CommandProcessor {
        let document = self.document.unwrap_or_else(|| Arc::new(Document::new()));
        let engine = self
            .engine
            .unwrap_or_else(|| Arc::new(DomSwapEngine::new(document.clone())));
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(BasicSwapSpecResolver));
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(FakeNavigator::new()));
        let history = self.history.unwrap_or_else(|| Arc::new(SessionHistory::new()));
        let hooks = self.hooks.unwrap_or_else(|| Arc::new(NoopHooks));
        let state = Arc::new(HistoryState::new(
            self.initial_path.unwrap_or_else(|| "/".to_string()),
        ));

        let (tx, rx) = create_event_channel();
        let active = Arc::new(AtomicBool::new(self.collect_events));
        let emitter = EventEmitter::new(tx, active);
        let events = if self.collect_events { Some(rx) } else { None };

        CommandProcessor {
            document,
            engine,
            resolver,
            navigator,
            history,
            state,
            hooks,
            emitter,
            events: Mutex::new(events),
        }
    }
}
