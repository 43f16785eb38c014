//! File-backed log with clear and backup rotation

use chrono::Utc;
use filelog_core::{
    Dictionary, Result, SessionId, DEFAULT_LOG_MESSAGES, DEFAULT_MILLISECONDS_IN_TIMESTAMP,
    EVENT_STREAM, FILE_LOG_MESSAGES, MESSAGES_STREAM, MILLISECONDS_IN_TIMESTAMP,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::paths::LogPaths;
use crate::prefix::{global_prefix, session_prefix};
use crate::streams::{LogStreams, OpenMode};
use crate::Log;

/// Behaviour switches read from settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLogOptions {
    /// Keep the raw message stream
    pub log_messages: bool,
    /// Include milliseconds in line timestamps
    pub milliseconds: bool,
}

impl Default for FileLogOptions {
    fn default() -> Self {
        Self {
            log_messages: DEFAULT_LOG_MESSAGES,
            milliseconds: DEFAULT_MILLISECONDS_IN_TIMESTAMP,
        }
    }
}

impl FileLogOptions {
    pub fn from_settings(settings: &Dictionary) -> Result<Self> {
        Ok(Self {
            log_messages: settings.get_bool_or(FILE_LOG_MESSAGES, DEFAULT_LOG_MESSAGES)?,
            milliseconds: settings
                .get_bool_or(MILLISECONDS_IN_TIMESTAMP, DEFAULT_MILLISECONDS_IN_TIMESTAMP)?,
        })
    }
}

/// Log writing an event stream and, optionally, a raw message stream
pub struct FileLog {
    paths: LogPaths,
    event_path: PathBuf,
    messages_path: Option<PathBuf>,
    streams: LogStreams,
    options: FileLogOptions,
}

impl FileLog {
    /// Create the directories and open the current files in append mode
    pub fn new(path: &Path, backup_path: &Path, prefix: &str, options: FileLogOptions) -> Result<Self> {
        let paths = LogPaths::new(path, backup_path, prefix)?;
        paths.ensure_directories()?;

        let event_path = paths.current_file(EVENT_STREAM);
        let messages_path = options
            .log_messages
            .then(|| paths.current_file(MESSAGES_STREAM));

        let streams = LogStreams::open(&event_path, messages_path.as_deref(), OpenMode::Append)?;

        debug!(
            "File log {} ready in {}",
            paths.prefix(),
            paths.directory().display()
        );
        Ok(Self {
            paths,
            event_path,
            messages_path,
            streams,
            options,
        })
    }

    /// Log shared across sessions, named `GLOBAL`
    pub fn global(path: &Path, backup_path: &Path, options: FileLogOptions) -> Result<Self> {
        Self::new(path, backup_path, global_prefix(), options)
    }

    /// Log for one session, named after its identity
    pub fn for_session(
        path: &Path,
        backup_path: &Path,
        id: &SessionId,
        options: FileLogOptions,
    ) -> Result<Self> {
        id.validate()?;
        Self::new(path, backup_path, &session_prefix(id), options)
    }

    pub fn paths(&self) -> &LogPaths {
        &self.paths
    }

    pub fn event_path(&self) -> &Path {
        &self.event_path
    }

    /// `None` when message logging is disabled
    pub fn messages_path(&self) -> Option<&Path> {
        self.messages_path.as_deref()
    }

    pub fn logs_messages(&self) -> bool {
        self.messages_path.is_some()
    }

    pub fn options(&self) -> FileLogOptions {
        self.options
    }

    /// False after a clear or backup that could not reopen the current files
    pub fn is_open(&self) -> bool {
        self.streams.is_open()
    }

    fn reopen(&mut self, mode: OpenMode) -> Result<()> {
        self.streams
            .reopen(&self.event_path, self.messages_path.as_deref(), mode)
    }

    /// First index for which no backup file of any active stream exists.
    /// Probing and renaming are not atomic against other processes sharing
    /// the backup directory.
    fn next_backup_index(&self) -> u32 {
        let mut index = 1;
        loop {
            let event_taken = self.paths.backup_file(EVENT_STREAM, index).exists();
            let messages_taken = self.logs_messages()
                && self.paths.backup_file(MESSAGES_STREAM, index).exists();
            if !event_taken && !messages_taken {
                return index;
            }
            index += 1;
        }
    }

    /// Messages and event files move as a pair so the backup numbers of
    /// both streams stay aligned.
    fn rotate(&self, index: u32) -> Result<()> {
        let mut moves = Vec::with_capacity(2);
        if let Some(messages_path) = &self.messages_path {
            moves.push((
                messages_path.clone(),
                self.paths.backup_file(MESSAGES_STREAM, index),
            ));
        }
        moves.push((
            self.event_path.clone(),
            self.paths.backup_file(EVENT_STREAM, index),
        ));
        rename_together(&moves)
    }

    fn timestamp(&self) -> String {
        let format = if self.options.milliseconds {
            "%Y%m%d-%H:%M:%S%.3f"
        } else {
            "%Y%m%d-%H:%M:%S"
        };
        Utc::now().format(format).to_string()
    }

    fn format_line(&self, text: &str) -> String {
        format!("{} : {}", self.timestamp(), text)
    }
}

/// Rename every `(from, to)` pair. When one rename fails the pairs already
/// moved are put back before the error is returned.
fn rename_together(moves: &[(PathBuf, PathBuf)]) -> Result<()> {
    let mut done: Vec<&(PathBuf, PathBuf)> = Vec::with_capacity(moves.len());

    for pair in moves {
        let (from, to) = pair;
        if !from.exists() {
            warn!("Nothing to back up at {}", from.display());
            continue;
        }
        if let Err(e) = fs::rename(from, to) {
            for (undo_from, undo_to) in done.into_iter().rev() {
                if let Err(undo) = fs::rename(undo_to, undo_from) {
                    warn!(
                        "Could not restore {} from {}: {}",
                        undo_from.display(),
                        undo_to.display(),
                        undo
                    );
                }
            }
            return Err(e.into());
        }
        debug!("Backed up {} to {}", from.display(), to.display());
        done.push(pair);
    }

    Ok(())
}

impl Log for FileLog {
    /// Truncate both current files
    fn clear(&mut self) -> Result<()> {
        self.streams.close();
        self.reopen(OpenMode::Truncate)
    }

    /// Move the current files to the first free backup index and start
    /// empty ones. If the move fails the current files are reopened for
    /// append so nothing is lost, and the error is returned.
    fn backup(&mut self) -> Result<()> {
        self.streams.close();

        let index = self.next_backup_index();
        let rotated = self.rotate(index);
        let mode = if rotated.is_ok() {
            OpenMode::Truncate
        } else {
            OpenMode::Append
        };

        self.reopen(mode)?;
        rotated
    }

    fn on_incoming(&mut self, message: &str) -> Result<()> {
        if !self.logs_messages() {
            return Ok(());
        }
        let line = self.format_line(message);
        self.streams.write_message(&line)
    }

    fn on_outgoing(&mut self, message: &str) -> Result<()> {
        if !self.logs_messages() {
            return Ok(());
        }
        let line = self.format_line(message);
        self.streams.write_message(&line)
    }

    fn on_event(&mut self, text: &str) -> Result<()> {
        let line = self.format_line(text);
        self.streams.write_event(&line)
    }
}

impl Drop for FileLog {
    fn drop(&mut self) {
        self.streams.close();
        debug!("Closed file log {}", self.paths.prefix());
    }
}
