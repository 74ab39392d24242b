//! Response-level error types.

use thiserror::Error;

/// Failures while parsing a response fragment into a node tree.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Fragment parse error: {0}")]
    Parse(String),
}

/// Top-level errors for one response transformation.
///
/// Marker-level failures never surface here — they are isolated per marker
/// and reported through the event bus. The only response-level failures are
/// extraction failures (raised before any side effect) and faults in the
/// processing task itself.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Fragment extraction failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("Command processing task failed: {0}")]
    TaskFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
