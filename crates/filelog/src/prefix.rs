//! File-name prefixes derived from session identity

use filelog_core::{SessionId, GLOBAL_PREFIX};

/// Prefix for a session's log files: `begin-sender-target[-qualifier]`
pub fn session_prefix(id: &SessionId) -> String {
    let mut prefix = format!(
        "{}-{}-{}",
        id.begin_string, id.sender_comp_id, id.target_comp_id
    );
    if id.has_qualifier() {
        prefix.push('-');
        prefix.push_str(&id.qualifier);
    }
    prefix
}

/// Prefix for the log shared across sessions
pub fn global_prefix() -> &'static str {
    GLOBAL_PREFIX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_without_qualifier() {
        let id = SessionId::new("FIX.4.2", "SENDER", "TARGET");
        assert_eq!(session_prefix(&id), "FIX.4.2-SENDER-TARGET");
    }

    #[test]
    fn test_prefix_with_qualifier() {
        let id = SessionId::new("FIX.4.2", "SENDER", "TARGET").with_qualifier("Q1");
        assert_eq!(session_prefix(&id), "FIX.4.2-SENDER-TARGET-Q1");
    }

    #[test]
    fn test_global_prefix() {
        assert_eq!(global_prefix(), "GLOBAL");
    }
}
