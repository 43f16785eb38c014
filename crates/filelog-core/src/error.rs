//! Error types for filelog

use std::path::PathBuf;

/// filelog error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for filelog
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    /// True for every error that means "the configuration cannot be used",
    /// including a session that has no settings section.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::ConfigError(_)
                | Error::ConfigNotFound(_)
                | Error::SessionNotFound(_)
                | Error::JsonError(_)
                | Error::TomlError(_)
                | Error::YamlError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("Could not open event file: /tmp/x");
        assert_eq!(err.to_string(), "Config error: Could not open event file: /tmp/x");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
        assert!(!err.is_config());
    }

    #[test]
    fn test_session_not_found_is_config() {
        let err = Error::SessionNotFound("FIX.4.2:A->B".to_string());
        assert!(err.is_config());
    }
}
