//! Setting keys, file-name literals and defaults

/// Directory holding the current log files
pub const FILE_LOG_PATH: &str = "FileLogPath";

/// Directory receiving rotated log files (defaults to `FileLogPath`)
pub const FILE_LOG_BACKUP_PATH: &str = "FileLogBackupPath";

/// Enables the raw message stream
pub const FILE_LOG_MESSAGES: &str = "FileLogMessages";

/// Adds milliseconds to line timestamps
pub const MILLISECONDS_IN_TIMESTAMP: &str = "MillisecondsInTimeStamp";

/// Session identity keys inside a settings file session section
pub const BEGIN_STRING: &str = "BeginString";
pub const SENDER_COMP_ID: &str = "SenderCompID";
pub const TARGET_COMP_ID: &str = "TargetCompID";
pub const SESSION_QUALIFIER: &str = "SessionQualifier";

/// Prefix used by the log shared across sessions
pub const GLOBAL_PREFIX: &str = "GLOBAL";

/// Stream names used in file names
pub const EVENT_STREAM: &str = "event";
pub const MESSAGES_STREAM: &str = "messages";

/// Directory used when a configured path is empty
pub const CURRENT_DIR: &str = ".";

/// Default for `FileLogMessages`
pub const DEFAULT_LOG_MESSAGES: bool = true;

/// Default for `MillisecondsInTimeStamp`
pub const DEFAULT_MILLISECONDS_IN_TIMESTAMP: bool = true;

/// File name of the active log for a stream, e.g. `event.current.log`
pub fn current_file_name(stream: &str) -> String {
    format!("{}.current.log", stream)
}

/// File name of the `index`-th rotated log for a stream
pub fn backup_file_name(stream: &str, index: u32) -> String {
    format!("{}.backup.{}.log", stream, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_file_name() {
        assert_eq!(current_file_name(EVENT_STREAM), "event.current.log");
        assert_eq!(current_file_name(MESSAGES_STREAM), "messages.current.log");
    }

    #[test]
    fn test_backup_file_name() {
        assert_eq!(backup_file_name(EVENT_STREAM, 1), "event.backup.1.log");
        assert_eq!(backup_file_name(MESSAGES_STREAM, 12), "messages.backup.12.log");
    }
}
