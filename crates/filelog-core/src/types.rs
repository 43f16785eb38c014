//! Core types for filelog

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Characters that would let a component escape its log directory
static UNSAFE_COMPONENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/\\\x00]").expect("Invalid component regex"));

/// Validate one identity component before it becomes part of a file name
pub fn validate_component(value: &str) -> bool {
    value != "." && value != ".." && !UNSAFE_COMPONENT_REGEX.is_match(value)
}

/// Identity of a logical communication session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId {
    /// Protocol version tag, e.g. `FIX.4.2`
    pub begin_string: String,
    pub sender_comp_id: String,
    pub target_comp_id: String,
    /// Empty when the session has no qualifier
    #[serde(default)]
    pub qualifier: String,
}

impl SessionId {
    pub fn new<B, S, T>(begin_string: B, sender_comp_id: S, target_comp_id: T) -> Self
    where
        B: Into<String>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            qualifier: String::new(),
        }
    }

    pub fn with_qualifier<Q: Into<String>>(mut self, qualifier: Q) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    pub fn has_qualifier(&self) -> bool {
        !self.qualifier.is_empty()
    }

    /// Reject identities whose components cannot be used in a file name
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("begin string", &self.begin_string),
            ("sender", &self.sender_comp_id),
            ("target", &self.target_comp_id),
        ];
        for (what, value) in required {
            if value.is_empty() {
                return Err(Error::config(format!("Session {} is empty: {}", what, self)));
            }
            if !validate_component(value) {
                return Err(Error::config(format!(
                    "Session {} '{}' cannot be used in a file name",
                    what, value
                )));
            }
        }
        if self.has_qualifier() && !validate_component(&self.qualifier) {
            return Err(Error::config(format!(
                "Session qualifier '{}' cannot be used in a file name",
                self.qualifier
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}->{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id
        )?;
        if self.has_qualifier() {
            write!(f, ":{}", self.qualifier)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new("FIX.4.2", "SENDER", "TARGET");
        assert_eq!(id.to_string(), "FIX.4.2:SENDER->TARGET");

        let id = id.with_qualifier("Q1");
        assert_eq!(id.to_string(), "FIX.4.2:SENDER->TARGET:Q1");
    }

    #[test]
    fn test_validate_component() {
        assert!(validate_component("FIX.4.2"));
        assert!(validate_component("SENDER_1"));
        assert!(!validate_component(".."));
        assert!(!validate_component("."));
        assert!(!validate_component("a/b"));
        assert!(!validate_component("a\\b"));
    }

    #[test]
    fn test_validate_session() {
        assert!(SessionId::new("FIX.4.4", "A", "B").validate().is_ok());
        assert!(SessionId::new("FIX.4.4", "", "B").validate().is_err());
        assert!(SessionId::new("FIX.4.4", "../etc", "B").validate().is_err());
        assert!(SessionId::new("FIX.4.4", "A", "B")
            .with_qualifier("..")
            .validate()
            .is_err());
    }
}
