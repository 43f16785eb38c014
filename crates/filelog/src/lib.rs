//! filelog - File-backed session logs
//!
//! Every log writes an event stream and, unless disabled, a raw message
//! stream:
//! - `<dir>/<prefix>.event.current.log`
//! - `<dir>/<prefix>.messages.current.log`
//!
//! [`FileLogFactory`] hands out one shared `GLOBAL` log, reference counted,
//! or a fresh log per session.

mod factory;
mod file_log;
mod handle;
mod paths;
mod prefix;
mod streams;

pub use factory::FileLogFactory;
pub use file_log::{FileLog, FileLogOptions};
pub use handle::{LogHandle, SharedLog};
pub use paths::LogPaths;
pub use prefix::{global_prefix, session_prefix};

pub use filelog_core::{Error, Result};

/// Sink for protocol traffic and session events
pub trait Log: Send {
    /// Truncate every stream
    fn clear(&mut self) -> Result<()>;

    /// Rotate every stream into the backup directory
    fn backup(&mut self) -> Result<()>;

    /// Record a message received from the counterparty
    fn on_incoming(&mut self, message: &str) -> Result<()>;

    /// Record a message sent to the counterparty
    fn on_outgoing(&mut self, message: &str) -> Result<()>;

    /// Record a session event
    fn on_event(&mut self, text: &str) -> Result<()>;
}
