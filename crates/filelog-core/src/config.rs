//! Settings store for filelog
//!
//! Settings live in a `default` section plus one section per session. A
//! session section inherits every default it does not override. Files may be:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::SessionId;

/// Supported settings file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// A flat, case-insensitive key/value section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    values: BTreeMap<String, String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(key: &str) -> String {
        key.trim().to_uppercase()
    }

    /// Check whether a key is present
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(&Self::normalize(key))
    }

    /// Get a required string value
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(&Self::normalize(key))
            .map(|v| v.trim().to_string())
            .ok_or_else(|| Error::config(format!("{} not defined", key)))
    }

    /// Get a required boolean value
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get_string(key)?;
        parse_bool(&value)
            .ok_or_else(|| Error::config(format!("Illegal value {} for {}", value, key)))
    }

    /// Get a boolean value, falling back to `default` when the key is absent
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool> {
        if self.has(key) {
            self.get_bool(key)
        } else {
            Ok(default)
        }
    }

    /// Get an optional string value
    pub fn get_optional(&self, key: &str) -> Option<String> {
        self.values
            .get(&Self::normalize(key))
            .map(|v| v.trim().to_string())
    }

    pub fn set_string<V: Into<String>>(&mut self, key: &str, value: V) {
        self.values.insert(Self::normalize(key), value.into());
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_string(key, if value { "Y" } else { "N" });
    }

    /// Builder form of [`Dictionary::set_string`]
    pub fn with<V: Into<String>>(mut self, key: &str, value: V) -> Self {
        self.set_string(key, value);
        self
    }

    /// Copy every key of `other` that this section does not define
    pub fn merge(&mut self, other: &Dictionary) {
        for (key, value) in &other.values {
            self.values
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Source of settings consulted when a log is created
pub trait SettingsProvider: Send + Sync {
    /// Settings that apply when no session is bound
    fn global(&self) -> Result<Dictionary>;

    /// Settings for one session, defaults included
    fn session(&self, id: &SessionId) -> Result<Dictionary>;
}

/// Defaults plus per-session sections
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    defaults: Dictionary,
    sessions: BTreeMap<SessionId, Dictionary>,
}

impl SessionSettings {
    pub fn new(defaults: Dictionary) -> Self {
        Self {
            defaults,
            sessions: BTreeMap::new(),
        }
    }

    /// Add or replace a session section; defaults are merged in
    pub fn set(&mut self, id: SessionId, mut section: Dictionary) {
        section.merge(&self.defaults);
        self.sessions.insert(id, section);
    }

    pub fn defaults(&self) -> &Dictionary {
        &self.defaults
    }

    pub fn sessions(&self) -> impl Iterator<Item = &SessionId> {
        self.sessions.keys()
    }

    pub fn has_session(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Load settings from file, detecting the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported settings file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        let settings = Self::parse(&content, format)?;
        debug!(
            "Loaded settings from {:?} ({} sessions)",
            path,
            settings.sessions.len()
        );
        Ok(settings)
    }

    /// Parse settings content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let file: SettingsFile = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        file.into_settings()
    }
}

impl SettingsProvider for SessionSettings {
    fn global(&self) -> Result<Dictionary> {
        Ok(self.defaults.clone())
    }

    fn session(&self, id: &SessionId) -> Result<Dictionary> {
        self.sessions
            .get(id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }
}

/// Scalar value as written in a settings file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl SettingValue {
    fn into_string(self) -> String {
        match self {
            SettingValue::Bool(true) => "Y".to_string(),
            SettingValue::Bool(false) => "N".to_string(),
            SettingValue::Integer(i) => i.to_string(),
            SettingValue::Text(s) => s,
        }
    }
}

/// Settings file structure
#[derive(Debug, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub default: HashMap<String, SettingValue>,
    #[serde(default)]
    pub sessions: Vec<HashMap<String, SettingValue>>,
}

fn to_dictionary(values: HashMap<String, SettingValue>) -> Dictionary {
    let mut dict = Dictionary::new();
    for (key, value) in values {
        dict.set_string(&key, value.into_string());
    }
    dict
}

impl SettingsFile {
    /// Convert to a settings store, resolving each section's session identity
    pub fn into_settings(self) -> Result<SessionSettings> {
        let mut settings = SessionSettings::new(to_dictionary(self.default));

        for (index, values) in self.sessions.into_iter().enumerate() {
            let section = to_dictionary(values);
            let field = |key: &str| {
                section.get_string(key).map_err(|_| {
                    Error::config(format!("Session section {} is missing {}", index + 1, key))
                })
            };

            let mut id = SessionId::new(
                field(BEGIN_STRING)?,
                field(SENDER_COMP_ID)?,
                field(TARGET_COMP_ID)?,
            );
            if let Some(qualifier) = section.get_optional(SESSION_QUALIFIER) {
                id = id.with_qualifier(qualifier);
            }

            if settings.has_session(&id) {
                return Err(Error::config(format!("Duplicate session {}", id)));
            }
            settings.set(id, section);
        }

        Ok(settings)
    }
}
