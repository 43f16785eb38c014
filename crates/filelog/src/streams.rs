//! Paired write handles for the event and message streams

use filelog_core::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// How a current file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpenMode {
    /// Keep existing content and write after it
    Append,
    /// Start from an empty file
    Truncate,
}

fn open_file(path: &Path, mode: OpenMode) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        OpenMode::Append => options.append(true),
        OpenMode::Truncate => options.write(true).truncate(true),
    };
    options.open(path)
}

/// Event and message handles, opened and closed together.
///
/// A closed stream swallows writes; the event handle is `None` only after
/// [`LogStreams::close`] or a failed reopen.
pub(crate) struct LogStreams {
    event: Option<BufWriter<File>>,
    messages: Option<BufWriter<File>>,
}

impl LogStreams {
    /// Open the message file (if any) and then the event file. On failure
    /// every handle opened so far is closed again.
    pub fn open(event_path: &Path, messages_path: Option<&Path>, mode: OpenMode) -> Result<Self> {
        let messages = match messages_path {
            Some(path) => Some(BufWriter::new(open_file(path, mode).map_err(|e| {
                Error::config(format!(
                    "Could not open messages file: {} ({})",
                    path.display(),
                    e
                ))
            })?)),
            None => None,
        };

        let event = BufWriter::new(open_file(event_path, mode).map_err(|e| {
            Error::config(format!(
                "Could not open event file: {} ({})",
                event_path.display(),
                e
            ))
        })?);

        debug!("Opened {} ({:?})", event_path.display(), mode);
        Ok(Self {
            event: Some(event),
            messages,
        })
    }

    /// Flush and close both handles. Closing twice is a no-op.
    pub fn close(&mut self) {
        for (name, handle) in [("event", self.event.take()), ("messages", self.messages.take())] {
            if let Some(mut writer) = handle {
                if let Err(e) = writer.flush() {
                    warn!("Failed to flush {} stream on close: {}", name, e);
                }
            }
        }
    }

    /// Close and open again at the same paths
    pub fn reopen(
        &mut self,
        event_path: &Path,
        messages_path: Option<&Path>,
        mode: OpenMode,
    ) -> Result<()> {
        self.close();
        *self = Self::open(event_path, messages_path, mode)?;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.event.is_some()
    }

    pub fn write_event(&mut self, line: &str) -> Result<()> {
        write_line(&mut self.event, "event", line)
    }

    pub fn write_message(&mut self, line: &str) -> Result<()> {
        write_line(&mut self.messages, "messages", line)
    }
}

impl Drop for LogStreams {
    fn drop(&mut self) {
        self.close();
    }
}

fn write_line(handle: &mut Option<BufWriter<File>>, name: &str, line: &str) -> Result<()> {
    match handle {
        Some(writer) => {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            Ok(())
        }
        None => {
            warn!("Dropping write to closed {} stream", name);
            Ok(())
        }
    }
}
