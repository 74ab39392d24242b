//! Synchronous cancellation hooks.
//!
//! The pre-command and pre-swap points are synchronous: a hook returns a
//! boolean proceed signal and the executor acts on it immediately. Returning
//! `false` from [`CommandHooks::before_command`] aborts the whole marker;
//! returning `false` from [`CommandHooks::before_swap`] skips only the swap
//! sub-step.

use crate::grammar::CommandMarker;
use crate::swap::SwapJob;

pub trait CommandHooks: Send + Sync {
    /// Called before any processing of a marker. `false` aborts the marker.
    fn before_command(&self, _marker: &CommandMarker) -> bool {
        true
    }

    /// Called before invoking the swap engine. `false` cancels the swap but
    /// leaves the rest of the marker's pipeline running.
    fn before_swap(&self, _job: &SwapJob) -> bool {
        true
    }
}

/// Default hooks: everything proceeds.
pub struct NoopHooks;

impl CommandHooks for NoopHooks {}
