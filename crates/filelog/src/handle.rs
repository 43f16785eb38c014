//! Handles returned by the factory

use parking_lot::{Mutex, MutexGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use crate::file_log::FileLog;
use crate::{Log, Result};

/// A log that may be reached through more than one handle
pub type SharedLog = Arc<Mutex<FileLog>>;

/// Owned access to a log created by [`crate::FileLogFactory`].
///
/// Not `Clone`: every handle stands for one acquisition and goes back to the
/// factory through [`crate::FileLogFactory::destroy`]. A global handle dropped
/// any other way keeps its share of the reference count, so the global log
/// stays open until the factory itself is dropped.
pub struct LogHandle {
    inner: SharedLog,
    global: bool,
    event_path: PathBuf,
    messages_path: Option<PathBuf>,
    released: bool,
}

impl LogHandle {
    fn wrap(inner: SharedLog, global: bool) -> Self {
        let (event_path, messages_path) = {
            let log = inner.lock();
            (
                log.event_path().to_path_buf(),
                log.messages_path().map(|p| p.to_path_buf()),
            )
        };
        Self {
            inner,
            global,
            event_path,
            messages_path,
            released: false,
        }
    }

    pub(crate) fn global(inner: SharedLog) -> Self {
        Self::wrap(inner, true)
    }

    pub(crate) fn session(log: FileLog) -> Self {
        Self::wrap(Arc::new(Mutex::new(log)), false)
    }

    pub(crate) fn shared(&self) -> &SharedLog {
        &self.inner
    }

    /// Called by the factory once the handle has been accounted for
    pub(crate) fn release(mut self) {
        self.released = true;
    }

    /// True for the log shared across sessions
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// True when both handles reach the same log
    pub fn same_instance(&self, other: &LogHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Exclusive access to the underlying log
    pub fn lock(&self) -> MutexGuard<'_, FileLog> {
        self.inner.lock()
    }

    pub fn event_path(&self) -> &Path {
        &self.event_path
    }

    pub fn messages_path(&self) -> Option<&Path> {
        self.messages_path.as_deref()
    }
}

impl Drop for LogHandle {
    fn drop(&mut self) {
        if self.global && !self.released {
            warn!(
                "Global log handle for {} dropped without FileLogFactory::destroy",
                self.event_path.display()
            );
        }
    }
}

impl std::fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogHandle")
            .field("global", &self.global)
            .field("event_path", &self.event_path)
            .finish()
    }
}

impl Log for LogHandle {
    fn clear(&mut self) -> Result<()> {
        self.inner.lock().clear()
    }

    fn backup(&mut self) -> Result<()> {
        self.inner.lock().backup()
    }

    fn on_incoming(&mut self, message: &str) -> Result<()> {
        self.inner.lock().on_incoming(message)
    }

    fn on_outgoing(&mut self, message: &str) -> Result<()> {
        self.inner.lock().on_outgoing(message)
    }

    fn on_event(&mut self, text: &str) -> Result<()> {
        self.inner.lock().on_event(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileLogOptions;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_session_handles_are_distinct() {
        let dir = TempDir::new().unwrap();
        let a = LogHandle::session(
            FileLog::new(dir.path(), dir.path(), "A", FileLogOptions::default()).unwrap(),
        );
        let b = LogHandle::session(
            FileLog::new(dir.path(), dir.path(), "B", FileLogOptions::default()).unwrap(),
        );

        assert!(!a.is_global());
        assert!(!a.same_instance(&b));
        assert!(a.same_instance(&a));
    }

    #[test]
    fn test_global_handles_share_log() {
        let dir = TempDir::new().unwrap();
        let shared: SharedLog = Arc::new(Mutex::new(
            FileLog::global(dir.path(), dir.path(), FileLogOptions::default()).unwrap(),
        ));

        let mut first = LogHandle::global(shared.clone());
        let mut second = LogHandle::global(shared);
        assert!(first.is_global());
        assert!(first.same_instance(&second));

        first.on_event("one").unwrap();
        second.on_event("two").unwrap();

        let content = fs::read_to_string(first.event_path()).unwrap();
        assert_eq!(content.lines().count(), 2);
        first.release();
        second.release();
    }

    #[test]
    fn test_debug_while_locked() {
        let dir = TempDir::new().unwrap();
        let handle = LogHandle::session(
            FileLog::new(dir.path(), dir.path(), "A", FileLogOptions::default()).unwrap(),
        );

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _guard = handle.lock();
            let rendered = format!("{:?}", handle);
            drop(_guard);
            let _ = tx.send(rendered);
        });

        let rendered = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("formatting a locked handle must not block");
        assert!(rendered.contains("A.event.current.log"));
    }

    #[test]
    fn test_paths_available_without_lock() {
        let dir = TempDir::new().unwrap();
        let handle = LogHandle::session(
            FileLog::new(dir.path(), dir.path(), "A", FileLogOptions::default()).unwrap(),
        );

        let _guard = handle.lock();
        assert_eq!(handle.event_path(), dir.path().join("A.event.current.log"));
        assert_eq!(
            handle.messages_path(),
            Some(dir.path().join("A.messages.current.log").as_path())
        );
    }
}
