//! Error types for the command-fragment processor.
//!
//! - [`CommandError`] — Errors raised while executing a single command marker.
//! - [`ProcessError`] — Top-level errors for response transformation and run handling.
//! - [`ExtractError`] — Failures while parsing a response fragment.
//! - [`NavigationError`] — Failures in the client-navigation flow.

pub mod command_error;
pub mod process_error;

pub use command_error::{CommandError, NavigationError};
pub use process_error::{ExtractError, ProcessError};

/// Convenience alias for marker-level results.
pub type CommandResult<T> = Result<T, CommandError>;
/// Convenience alias for response-level results.
pub type ProcessResult<T> = Result<T, ProcessError>;
