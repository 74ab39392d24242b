//! Awaitable handle over one response's command run.

use tokio::task::JoinHandle;

use crate::core::executor::RunSummary;
use crate::error::{ProcessError, ProcessResult};

/// Handle to the background task processing one response's markers.
///
/// The task runs independently of the host's own swap of the remainder;
/// `wait` is only needed when the caller wants the per-marker outcomes.
pub struct CommandRunHandle {
    join: JoinHandle<RunSummary>,
}

impl CommandRunHandle {
    pub(crate) fn new(join: JoinHandle<RunSummary>) -> Self {
        Self { join }
    }

    /// Wait for every marker to finish and return the outcomes.
    pub async fn wait(self) -> ProcessResult<RunSummary> {
        self.join
            .await
            .map_err(|e| ProcessError::TaskFailed(e.to_string()))
    }

    /// Abort the background task. Already-applied side effects stay.
    pub fn abort(&self) {
        self.join.abort();
    }
}
