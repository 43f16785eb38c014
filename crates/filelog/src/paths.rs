//! Directory and file-name layout of a log

use filelog_core::{
    backup_file_name, current_file_name, validate_component, Error, Result, CURRENT_DIR,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a log's current and rotated files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    directory: PathBuf,
    backup_directory: PathBuf,
    prefix: String,
}

impl LogPaths {
    /// Resolve paths for `prefix`. An empty `path` means the current
    /// directory, an empty `backup_path` means `path`.
    pub fn new(path: &Path, backup_path: &Path, prefix: &str) -> Result<Self> {
        if prefix.is_empty() {
            return Err(Error::config("Log prefix must not be empty"));
        }
        if !validate_component(prefix) {
            return Err(Error::config(format!(
                "Log prefix '{}' cannot be used in a file name",
                prefix
            )));
        }

        let directory = if path.as_os_str().is_empty() {
            PathBuf::from(CURRENT_DIR)
        } else {
            path.to_path_buf()
        };
        let backup_directory = if backup_path.as_os_str().is_empty() {
            directory.clone()
        } else {
            backup_path.to_path_buf()
        };

        Ok(Self {
            directory,
            backup_directory,
            prefix: prefix.to_string(),
        })
    }

    /// Create both directories. An existing directory is fine; anything
    /// else that stops the directory from existing is a config error.
    pub fn ensure_directories(&self) -> Result<()> {
        ensure_dir(&self.directory)?;
        if self.backup_directory != self.directory {
            ensure_dir(&self.backup_directory)?;
        }
        Ok(())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn backup_directory(&self) -> &Path {
        &self.backup_directory
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<dir>/<prefix>.`
    pub fn full_prefix(&self) -> PathBuf {
        self.directory.join(format!("{}.", self.prefix))
    }

    /// `<backupDir>/<prefix>.`
    pub fn full_backup_prefix(&self) -> PathBuf {
        self.backup_directory.join(format!("{}.", self.prefix))
    }

    /// `<dir>/<prefix>.<stream>.current.log`
    pub fn current_file(&self, stream: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}", self.prefix, current_file_name(stream)))
    }

    /// `<backupDir>/<prefix>.<stream>.backup.<index>.log`
    pub fn backup_file(&self, stream: &str, index: u32) -> PathBuf {
        self.backup_directory
            .join(format!("{}.{}", self.prefix, backup_file_name(stream, index)))
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => {
            debug!("Log directory ready: {}", dir.display());
            Ok(())
        }
        Err(_) if dir.is_dir() => Ok(()),
        Err(e) => Err(Error::config(format!(
            "Could not create log directory {}: {}",
            dir.display(),
            e
        ))),
    }
}
