use thiserror::Error;

use crate::grammar::ValidationReport;

/// Errors raised while executing a single command marker.
///
/// Every variant is isolated at the marker boundary: it is reported through
/// the event bus and the executor proceeds with the next marker.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command validation failed: {}", .0.describe())]
    Validation(Box<ValidationReport>),
    #[error("Target selector matched no element: {selector}")]
    TargetResolution { selector: String },
    #[error("Swap error: {0}")]
    Swap(String),
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationReport> for CommandError {
    fn from(report: ValidationReport) -> Self {
        CommandError::Validation(Box::new(report))
    }
}

/// Errors raised by the client-navigation flow (`location`).
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Location value is missing the required 'path' field")]
    MissingPath,
    #[error("Malformed location options: {0}")]
    BadOptions(String),
    #[error("Navigation fetch failed: {0}")]
    Fetch(String),
}
