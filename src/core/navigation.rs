//! Client navigation: the `location` flow plus the terminal
//! `redirect`/`refresh` actions.
//!
//! The content fetch and the hard navigation both live behind the
//! [`Navigator`] collaborator; the controller owns the ordering contract:
//! snapshot first, fetch, swap, and only then mutate history.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::history::{HistoryState, HistoryStore};
use crate::dom::Document;
use crate::error::{CommandError, CommandResult, NavigationError};
use crate::swap::{SwapEngine, SwapJob, SwapSpecResolver};

/// Issues navigation fetches and performs hard navigations.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// GET-equivalent content fetch for `path`, returning HTML.
    async fn fetch(&self, path: &str) -> Result<String, NavigationError>;
    /// Set the browser location. Terminal for the calling marker.
    fn redirect(&self, url: &str);
    /// Reload the page. Terminal for the calling marker.
    fn refresh(&self);
}

/// Recording navigator used by tests and as the wiring default when an
/// embedder supplies none: serves canned routes and records hard
/// navigations instead of performing them.
#[derive(Default)]
pub struct FakeNavigator {
    routes: Mutex<HashMap<String, String>>,
    redirects: Mutex<Vec<String>>,
    refreshes: Mutex<usize>,
}

impl FakeNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for subsequent fetches of `path`.
    pub fn route(&self, path: &str, body: &str) {
        self.routes
            .lock()
            .insert(path.to_string(), body.to_string());
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }

    pub fn refresh_count(&self) -> usize {
        *self.refreshes.lock()
    }
}

#[async_trait]
impl Navigator for FakeNavigator {
    async fn fetch(&self, path: &str) -> Result<String, NavigationError> {
        self.routes
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| NavigationError::Fetch(format!("no route for {}", path)))
    }

    fn redirect(&self, url: &str) {
        self.redirects.lock().push(url.to_string());
    }

    fn refresh(&self) {
        *self.refreshes.lock() += 1;
    }
}

/// Options extracted from the JSON form of a `location` value.
struct LocationRequest {
    path: String,
    target: Option<String>,
    swap: Option<String>,
}

fn parse_location(value: &str) -> Result<LocationRequest, NavigationError> {
    if !value.trim_start().starts_with('{') {
        return Ok(LocationRequest {
            path: value.to_string(),
            target: None,
            swap: None,
        });
    }

    let parsed: Value =
        serde_json::from_str(value).map_err(|e| NavigationError::BadOptions(e.to_string()))?;
    let obj = parsed
        .as_object()
        .ok_or_else(|| NavigationError::BadOptions("expected a JSON object".into()))?;

    let path = obj
        .get("path")
        .and_then(Value::as_str)
        .ok_or(NavigationError::MissingPath)?
        .to_string();

    let option_str = |key: &str| -> Result<Option<String>, NavigationError> {
        match obj.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(NavigationError::BadOptions(format!(
                "'{}' must be a string, got {}",
                key, other
            ))),
        }
    };

    for key in obj.keys() {
        if !matches!(key.as_str(), "path" | "target" | "swap") {
            tracing::debug!(option = %key, "ignoring unrecognized location option");
        }
    }

    Ok(LocationRequest {
        path,
        target: option_str("target")?,
        swap: option_str("swap")?,
    })
}

pub struct NavigationController {
    document: Arc<Document>,
    engine: Arc<dyn SwapEngine>,
    resolver: Arc<dyn SwapSpecResolver>,
    navigator: Arc<dyn Navigator>,
    history: Arc<dyn HistoryStore>,
    state: Arc<HistoryState>,
}

impl NavigationController {
    pub fn new(
        document: Arc<Document>,
        engine: Arc<dyn SwapEngine>,
        resolver: Arc<dyn SwapSpecResolver>,
        navigator: Arc<dyn Navigator>,
        history: Arc<dyn HistoryStore>,
        state: Arc<HistoryState>,
    ) -> Self {
        Self {
            document,
            engine,
            resolver,
            navigator,
            history,
            state,
        }
    }

    /// The `location` flow: snapshot, fetch, swap, then push history.
    pub async fn location(&self, value: &str) -> CommandResult<()> {
        let request = parse_location(value)?;

        self.save_snapshot();

        let body = self.navigator.fetch(&request.path).await?;

        let target = match &request.target {
            Some(selector) => {
                self.document
                    .query(selector)
                    .ok_or_else(|| CommandError::TargetResolution {
                        selector: selector.clone(),
                    })?
            }
            None => self.document.root(),
        };
        let spec = self
            .resolver
            .resolve(request.swap.as_deref().unwrap_or("innerHTML"))?;

        let handle = self.engine.swap(SwapJob {
            target,
            content: body,
            spec,
        });
        handle
            .applied
            .await
            .map_err(|_| CommandError::Swap("swap task dropped".into()))??;

        self.history.push_url(&request.path);
        self.state.set(&request.path);
        Ok(())
    }

    /// Save the current page, then push `url`.
    pub fn push_url(&self, url: &str) {
        self.save_snapshot();
        self.history.push_url(url);
        self.state.set(url);
    }

    /// Save the current page, then replace the current entry with `url`.
    pub fn replace_url(&self, url: &str) {
        self.save_snapshot();
        self.history.replace_url(url);
        self.state.set(url);
    }

    pub fn redirect(&self, url: &str) {
        tracing::debug!(url, "redirecting");
        self.navigator.redirect(url);
    }

    pub fn refresh(&self) {
        tracing::debug!("refreshing page");
        self.navigator.refresh();
    }

    fn save_snapshot(&self) {
        self.history
            .save_current_page(&self.state.get(), &self.document.html());
    }
}
