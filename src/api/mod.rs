//! Public API layer — stable entry points for external consumers.
//!
//! [`CommandProcessor`] is the response-transform hook a host hypermedia
//! engine installs: hand it raw response text, get back the marker-free
//! remainder for the host's own swap plus a handle to the asynchronously
//! executing commands.

mod handle;
mod processor;

pub use handle::CommandRunHandle;
pub use processor::{CommandProcessor, CommandProcessorBuilder};
