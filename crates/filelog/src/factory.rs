//! Creation and destruction policy for file logs

use filelog_core::{
    Dictionary, Error, SessionId, SessionSettings, SettingsProvider, FILE_LOG_BACKUP_PATH,
    FILE_LOG_PATH,
};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::file_log::{FileLog, FileLogOptions};
use crate::handle::{LogHandle, SharedLog};
use crate::Result;

/// The shared `GLOBAL` log and the number of handles given out for it
#[derive(Default)]
struct GlobalSlot {
    log: Option<SharedLog>,
    count: usize,
}

/// Hands out the shared global log or a new log per session.
///
/// The factory is owned by the host and passed to whatever needs a log;
/// the global slot is guarded by a mutex so acquisition and release may
/// happen from any thread.
pub struct FileLogFactory {
    settings: Arc<dyn SettingsProvider>,
    path: Option<PathBuf>,
    backup_path: Option<PathBuf>,
    global: Mutex<GlobalSlot>,
}

impl FileLogFactory {
    /// Factory reading paths and flags from `settings`
    pub fn new(settings: Arc<dyn SettingsProvider>) -> Self {
        Self {
            settings,
            path: None,
            backup_path: None,
            global: Mutex::new(GlobalSlot::default()),
        }
    }

    /// Factory writing every log under `path`, with no other settings
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(Arc::new(SessionSettings::default())).with_path(path)
    }

    /// Fixed primary directory, bypassing the `FileLogPath` setting
    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = non_empty(path.into());
        self
    }

    /// Fixed backup directory; only used together with a fixed primary
    pub fn with_backup_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.backup_path = non_empty(path.into());
        self
    }

    /// Number of live handles to the global log
    pub fn global_ref_count(&self) -> usize {
        self.global.lock().count
    }

    /// True while a global log exists
    pub fn has_global(&self) -> bool {
        self.global.lock().log.is_some()
    }

    /// Acquire the global log, constructing it on first use.
    ///
    /// Later calls return the existing log without reading settings again.
    /// If construction fails the count is restored before the error is
    /// returned, so the next call tries again.
    pub fn create_global(&self) -> Result<LogHandle> {
        let mut slot = self.global.lock();
        slot.count += 1;

        if let Some(log) = slot.log.as_ref() {
            debug!("Global log acquired ({} handles)", slot.count);
            return Ok(LogHandle::global(log.clone()));
        }

        match self.build_global() {
            Ok(log) => {
                info!("Global log created at {}", log.event_path().display());
                let shared: SharedLog = Arc::new(Mutex::new(log));
                slot.log = Some(shared.clone());
                Ok(LogHandle::global(shared))
            }
            Err(e) => {
                slot.count -= 1;
                warn!("Global log construction failed: {}", e);
                Err(e)
            }
        }
    }

    /// Construct a new log for `id`. Never shared; each call gives an
    /// independent log.
    pub fn create_session(&self, id: &SessionId) -> Result<LogHandle> {
        id.validate()?;
        let settings = self.session_settings(id)?;
        let options = FileLogOptions::from_settings(&settings)?;
        let (path, backup_path) = self.resolve_paths(&settings)?;

        let log = FileLog::for_session(&path, &backup_path, id, options)?;
        debug!("Session log for {} created at {}", id, log.event_path().display());
        Ok(LogHandle::session(log))
    }

    /// Give a handle back. The global log is closed once its last handle is
    /// returned; a session log is closed immediately.
    pub fn destroy(&self, handle: LogHandle) {
        if !handle.is_global() {
            debug!("Session log {} destroyed", handle.event_path().display());
            handle.release();
            return;
        }

        let mut slot = self.global.lock();
        let current = slot
            .log
            .as_ref()
            .is_some_and(|log| Arc::ptr_eq(log, handle.shared()));
        if !current || slot.count == 0 {
            warn!("Ignoring release of a global log this factory does not hold");
            handle.release();
            return;
        }

        slot.count -= 1;
        if slot.count == 0 {
            slot.log = None;
            info!("Global log released");
        } else {
            debug!("Global log released ({} handles left)", slot.count);
        }
        handle.release();
    }

    /// Per-session settings. With a fixed primary path a session the
    /// provider does not know falls back to the global defaults.
    fn session_settings(&self, id: &SessionId) -> Result<Dictionary> {
        match self.settings.session(id) {
            Err(Error::SessionNotFound(_)) if self.path.is_some() => {
                debug!("No settings for {}, using defaults", id);
                self.settings.global()
            }
            other => other,
        }
    }

    fn build_global(&self) -> Result<FileLog> {
        let settings = self.settings.global()?;
        let options = FileLogOptions::from_settings(&settings)?;
        let (path, backup_path) = self.resolve_paths(&settings)?;
        FileLog::global(&path, &backup_path, options)
    }

    /// Fixed overrides win; otherwise `FileLogPath` is required and
    /// `FileLogBackupPath` falls back to it.
    fn resolve_paths(&self, settings: &Dictionary) -> Result<(PathBuf, PathBuf)> {
        match (&self.path, &self.backup_path) {
            (Some(path), Some(backup_path)) => Ok((path.clone(), backup_path.clone())),
            (Some(path), None) => Ok((path.clone(), path.clone())),
            (None, _) => {
                let path = settings.get_string(FILE_LOG_PATH)?;
                let backup_path = settings
                    .get_optional(FILE_LOG_BACKUP_PATH)
                    .unwrap_or_else(|| path.clone());
                Ok((PathBuf::from(path), PathBuf::from(backup_path)))
            }
        }
    }
}

fn non_empty(path: PathBuf) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}
