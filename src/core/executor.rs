//! Command executor — drives each marker through its pipeline.
//!
//! Markers are processed strictly sequentially in document order: marker
//! *n+1* never starts until marker *n*'s full pipeline (through history
//! mutation) has completed or failed. Failures are isolated at the marker
//! boundary; the run itself never aborts.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::event_bus::{EventEmitter, ProcessorEvent};
use super::navigation::NavigationController;
use super::trigger::TriggerDispatcher;
use crate::dom::parse::parse_fragment;
use crate::dom::{Document, Selector};
use crate::error::{CommandError, CommandResult};
use crate::grammar::{validate_marker, CommandAttr, CommandMarker};
use crate::hooks::CommandHooks;
use crate::swap::{SwapEngine, SwapJob, SwapSpecResolver, DEFAULT_COMMAND_SWAP};

/// Where a marker's pipeline ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandState {
    Pending,
    Validating,
    SwapStarted,
    SwapSettled,
    Completed,
    Aborted,
    Failed,
}

/// Outcome of one marker.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerOutcome {
    pub index: usize,
    pub state: CommandState,
    pub error: Option<String>,
}

/// Outcomes for every marker of one response, in document order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<MarkerOutcome>,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.count(CommandState::Completed)
    }

    pub fn aborted(&self) -> usize {
        self.count(CommandState::Aborted)
    }

    pub fn failed(&self) -> usize {
        self.count(CommandState::Failed)
    }

    /// True when no marker failed.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, state: CommandState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }
}

pub struct CommandDispatcher {
    document: Arc<Document>,
    engine: Arc<dyn SwapEngine>,
    resolver: Arc<dyn SwapSpecResolver>,
    hooks: Arc<dyn CommandHooks>,
    triggers: TriggerDispatcher,
    navigation: NavigationController,
    emitter: EventEmitter,
}

impl CommandDispatcher {
    pub fn new(
        document: Arc<Document>,
        engine: Arc<dyn SwapEngine>,
        resolver: Arc<dyn SwapSpecResolver>,
        hooks: Arc<dyn CommandHooks>,
        triggers: TriggerDispatcher,
        navigation: NavigationController,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            document,
            engine,
            resolver,
            hooks,
            triggers,
            navigation,
            emitter,
        }
    }

    /// Run every marker, strictly in order, isolating failures per marker.
    pub async fn run(&self, markers: Vec<CommandMarker>) -> RunSummary {
        let mut summary = RunSummary::default();

        for (index, marker) in markers.iter().enumerate() {
            match self.run_marker(index, marker).await {
                Ok(state) => summary.outcomes.push(MarkerOutcome {
                    index,
                    state,
                    error: None,
                }),
                Err(err) => {
                    tracing::error!(index, error = %err, "command failed");
                    self.emitter.emit(ProcessorEvent::CommandFailed {
                        index,
                        error: err.to_string(),
                        timestamp: Utc::now(),
                    });
                    summary.outcomes.push(MarkerOutcome {
                        index,
                        state: CommandState::Failed,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        self.emitter.emit(ProcessorEvent::BatchFinished {
            completed: summary.completed(),
            aborted: summary.aborted(),
            failed: summary.failed(),
            timestamp: Utc::now(),
        });
        summary
    }

    async fn run_marker(&self, index: usize, marker: &CommandMarker) -> CommandResult<CommandState> {
        self.emitter.emit(ProcessorEvent::CommandStarted {
            index,
            timestamp: Utc::now(),
        });

        if !self.hooks.before_command(marker) {
            tracing::debug!(index, "command canceled by pre-command hook");
            self.emitter.emit(ProcessorEvent::CommandAborted {
                index,
                timestamp: Utc::now(),
            });
            return Ok(CommandState::Aborted);
        }

        let report = validate_marker(marker);
        for warning in report.warnings() {
            tracing::warn!(index, code = %warning.code, "{}", warning.message);
        }
        if !report.is_valid {
            return Err(report.into());
        }

        let job = self.gather_swap_job(marker)?;

        let mut swapped = false;
        if let Some(job) = job {
            if self.hooks.before_swap(&job) {
                let handle = self.engine.swap(job);
                handle
                    .applied
                    .await
                    .map_err(|_| CommandError::Swap("swap task dropped".into()))??;
                swapped = true;
                self.emitter.emit(ProcessorEvent::SwapApplied {
                    index,
                    timestamp: Utc::now(),
                });

                if let Some(value) = marker.get(CommandAttr::TriggerAfterSwap) {
                    self.triggers.dispatch(value);
                }

                // SwapSettled once the settle phase resolves
                handle
                    .settled
                    .await
                    .map_err(|_| CommandError::Swap("settle signal dropped".into()))?;
            } else {
                tracing::debug!(index, "swap canceled by pre-swap hook");
            }
        }

        // Without a swap there is no after-swap point to wait for; the
        // payloads still dispatch at their pipeline positions.
        if !swapped {
            if let Some(value) = marker.get(CommandAttr::TriggerAfterSwap) {
                self.triggers.dispatch(value);
            }
        }
        if let Some(value) = marker.get(CommandAttr::TriggerAfterSettle) {
            self.triggers.dispatch(value);
        }

        // immediate phase, fixed order regardless of attribute order
        if let Some(value) = marker.get(CommandAttr::Trigger) {
            self.triggers.dispatch(value);
        }
        if let Some(value) = marker.get(CommandAttr::Location) {
            self.navigation.location(value).await?;
        }
        if let Some(url) = marker.get(CommandAttr::Redirect) {
            // terminal: no post-command event for this marker
            self.navigation.redirect(url);
            return Ok(CommandState::Completed);
        }
        if let Some(value) = marker.get(CommandAttr::Refresh) {
            if value != "false" {
                self.navigation.refresh();
                return Ok(CommandState::Completed);
            }
        }
        if let Some(url) = marker.get(CommandAttr::PushUrl) {
            self.navigation.push_url(url);
        }
        if let Some(url) = marker.get(CommandAttr::ReplaceUrl) {
            self.navigation.replace_url(url);
        }

        self.emitter.emit(ProcessorEvent::CommandCompleted {
            index,
            timestamp: Utc::now(),
        });
        Ok(CommandState::Completed)
    }

    /// Build the marker's swap job, if any.
    ///
    /// An unresolved `target` is reported and yields no job; the rest of the
    /// marker's pipeline still runs.
    fn gather_swap_job(&self, marker: &CommandMarker) -> CommandResult<Option<SwapJob>> {
        let selector = match marker.get(CommandAttr::Target) {
            Some(selector) => selector,
            None => return Ok(None),
        };

        let target = match self.document.query(selector) {
            Some(node) => node,
            None => {
                tracing::warn!(selector, "swap target not found");
                self.emitter.emit(ProcessorEvent::TargetResolutionError {
                    selector: selector.to_string(),
                    timestamp: Utc::now(),
                });
                return Ok(None);
            }
        };

        let spec = self
            .resolver
            .resolve(marker.get(CommandAttr::Swap).unwrap_or(DEFAULT_COMMAND_SWAP))?;

        let content = match marker.get(CommandAttr::Select) {
            Some(select) => select_content(marker.inner_html(), select)?,
            None => marker.inner_html().to_string(),
        };

        Ok(Some(SwapJob {
            target,
            content,
            spec,
        }))
    }
}

/// Reduce a swap payload to the elements matching `selector`.
fn select_content(inner_html: &str, selector: &str) -> CommandResult<String> {
    let tree =
        parse_fragment(inner_html).map_err(|e| CommandError::Swap(e.to_string()))?;
    let parsed =
        Selector::parse(selector).map_err(|reason| CommandError::Swap(reason.to_string()))?;
    let out = parsed
        .query_all(&tree, tree.root())
        .into_iter()
        .map(|node| tree.serialize(node))
        .collect::<String>();
    Ok(out)
}
