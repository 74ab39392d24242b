//! Swap collaborator interface.
//!
//! The executor never mutates the document directly; it hands a [`SwapJob`]
//! to a [`SwapEngine`] and awaits the two signals on the returned
//! [`SwapHandle`]: *applied* (DOM mutation done) and *settled* (settle phase
//! done, possibly after a configured delay). [`DomSwapEngine`] is the default
//! engine over the in-crate document; embedders with a real DOM supply their
//! own.

mod dom_engine;

pub use dom_engine::DomSwapEngine;

use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::dom::NodeId;
use crate::error::CommandError;

/// Content placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStyle {
    InnerHtml,
    OuterHtml,
    BeforeBegin,
    AfterBegin,
    BeforeEnd,
    AfterEnd,
    Delete,
    None,
}

impl SwapStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        let style = match token.to_ascii_lowercase().as_str() {
            "innerhtml" => SwapStyle::InnerHtml,
            "outerhtml" => SwapStyle::OuterHtml,
            "beforebegin" => SwapStyle::BeforeBegin,
            "afterbegin" => SwapStyle::AfterBegin,
            "beforeend" => SwapStyle::BeforeEnd,
            "afterend" => SwapStyle::AfterEnd,
            "delete" => SwapStyle::Delete,
            "none" => SwapStyle::None,
            _ => return None,
        };
        Some(style)
    }
}

/// Resolved swap behavior: style plus timing modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSpec {
    pub style: SwapStyle,
    pub swap_delay: Duration,
    pub settle_delay: Duration,
}

impl Default for SwapSpec {
    fn default() -> Self {
        Self {
            style: SwapStyle::InnerHtml,
            swap_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
        }
    }
}

/// Default style for a command marker that carries `target` but no `swap`.
pub const DEFAULT_COMMAND_SWAP: &str = "outerHTML";

/// One swap to perform: borrowed target, payload, resolved spec.
#[derive(Debug, Clone)]
pub struct SwapJob {
    pub target: NodeId,
    pub content: String,
    pub spec: SwapSpec,
}

/// Signals for an in-flight swap. `applied` resolves once the DOM mutation
/// is done; `settled` resolves once the settle phase finishes. On a failed
/// swap the `settled` sender is dropped.
pub struct SwapHandle {
    pub applied: oneshot::Receiver<Result<(), SwapError>>,
    pub settled: oneshot::Receiver<()>,
}

#[derive(Debug, Clone, Error)]
pub enum SwapError {
    #[error("swap content parse error: {0}")]
    Parse(String),
    #[error("swap target is no longer attached to the document")]
    TargetDetached,
    #[error("unknown swap style: {0}")]
    UnknownStyle(String),
}

impl From<SwapError> for CommandError {
    fn from(err: SwapError) -> Self {
        CommandError::Swap(err.to_string())
    }
}

/// Resolves a `swap` attribute value into a [`SwapSpec`].
pub trait SwapSpecResolver: Send + Sync {
    fn resolve(&self, value: &str) -> Result<SwapSpec, SwapError>;
}

/// Performs swaps. `swap` applies (or schedules) the mutation and returns
/// immediately; completion travels on the handle.
pub trait SwapEngine: Send + Sync {
    fn swap(&self, job: SwapJob) -> SwapHandle;
}

/// Default resolver for the `"<style> [swap:<time>] [settle:<time>]"`
/// micro-format, e.g. `"innerHTML settle:120ms"`.
pub struct BasicSwapSpecResolver;

impl SwapSpecResolver for BasicSwapSpecResolver {
    fn resolve(&self, value: &str) -> Result<SwapSpec, SwapError> {
        let mut spec = SwapSpec::default();
        let mut saw_style = false;

        for token in value.split_whitespace() {
            if let Some(delay) = token.strip_prefix("swap:") {
                spec.swap_delay = parse_interval(delay)
                    .ok_or_else(|| SwapError::Parse(format!("bad swap delay: {}", delay)))?;
            } else if let Some(delay) = token.strip_prefix("settle:") {
                spec.settle_delay = parse_interval(delay)
                    .ok_or_else(|| SwapError::Parse(format!("bad settle delay: {}", delay)))?;
            } else if !saw_style {
                spec.style = SwapStyle::from_token(token)
                    .ok_or_else(|| SwapError::UnknownStyle(token.to_string()))?;
                saw_style = true;
            } else {
                return Err(SwapError::Parse(format!("unexpected modifier: {}", token)));
            }
        }

        Ok(spec)
    }
}

/// Parse an interval literal: `"500ms"`, `"2s"`, or a bare millisecond count.
fn parse_interval(value: &str) -> Option<Duration> {
    if let Some(ms) = value.strip_suffix("ms") {
        return ms.parse::<u64>().ok().map(Duration::from_millis);
    }
    if let Some(secs) = value.strip_suffix('s') {
        return secs
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(Duration::from_secs_f64);
    }
    value.parse::<u64>().ok().map(Duration::from_millis)
}
