//! Settings lookup for provider selection and configuration
//!
//! The host application owns settings storage; this crate only reads values
//! through [`SettingsLookup`]. [`MapSettings`] is an in-memory store that can
//! also be loaded from a TOML file:
//!
//! ```toml
//! [pid]
//! protocol = "doi"
//! authority = "10.5072"
//! shoulder = "FK2/"
//! doi_provider = "DataCite"
//! identifier_generation_style = "randomString"
//! datafile_pid_format = "DEPENDENT"
//! site_url = "https://data.example.edu"
//! managed_list = ["doi:10.5073/OLD1"]
//! excluded_list = []
//!
//! [permalink]
//! authority = "PERMA"
//! shoulder = "X1"
//! separator = ""
//! base_url = "https://data.example.edu"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Setting keys consulted by the PID subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingKey {
    /// System-wide default protocol
    Protocol,
    /// Authority for DOI/Handle providers
    Authority,
    /// Shoulder for DOI/Handle providers
    Shoulder,
    /// Which DOI-backed provider serves the `doi` protocol
    DoiProvider,
    IdentifierGenerationStyle,
    DataFilePidFormat,
    /// Public base URL of the installation
    SiteUrl,
    /// Comma-separated canonical PIDs a provider manages outside its shoulder
    ManagedList,
    /// Comma-separated canonical PIDs a provider must not manage
    ExcludedList,
    PermaLinkAuthority,
    PermaLinkShoulder,
    PermaLinkSeparator,
    PermaLinkBaseUrl,
}

impl SettingKey {
    /// Storage name of the key
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Protocol => ":Protocol",
            SettingKey::Authority => ":Authority",
            SettingKey::Shoulder => ":Shoulder",
            SettingKey::DoiProvider => ":DoiProvider",
            SettingKey::IdentifierGenerationStyle => ":IdentifierGenerationStyle",
            SettingKey::DataFilePidFormat => ":DataFilePIDFormat",
            SettingKey::SiteUrl => ":SiteUrl",
            SettingKey::ManagedList => ":PidManagedList",
            SettingKey::ExcludedList => ":PidExcludedList",
            SettingKey::PermaLinkAuthority => ":PermaLinkAuthority",
            SettingKey::PermaLinkShoulder => ":PermaLinkShoulder",
            SettingKey::PermaLinkSeparator => ":PermaLinkSeparator",
            SettingKey::PermaLinkBaseUrl => ":PermaLinkBaseUrl",
        }
    }
}

/// Read-only view of the host's settings
pub trait SettingsLookup: Send + Sync {
    /// Value for `key`, or `default` when unset
    fn value_for_key(&self, key: SettingKey, default: &str) -> String;
}

/// In-memory settings
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<SettingKey, String>,
}

impl MapSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, key: SettingKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: SettingKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn remove(&mut self, key: SettingKey) -> Option<String> {
        self.values.remove(&key)
    }

    /// Load settings from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let toml: TomlSettings =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(toml.into_settings())
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }
}

impl SettingsLookup for MapSettings {
    fn value_for_key(&self, key: SettingKey, default: &str) -> String {
        self.values
            .get(&key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

/// Split a comma-separated list setting, dropping blanks
pub fn split_list_setting(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// TOML `[pid]` table
#[derive(Debug, Deserialize, Default)]
struct TomlPid {
    protocol: Option<String>,
    authority: Option<String>,
    shoulder: Option<String>,
    doi_provider: Option<String>,
    identifier_generation_style: Option<String>,
    datafile_pid_format: Option<String>,
    site_url: Option<String>,
    #[serde(default)]
    managed_list: Vec<String>,
    #[serde(default)]
    excluded_list: Vec<String>,
}

/// TOML `[permalink]` table
#[derive(Debug, Deserialize, Default)]
struct TomlPermaLink {
    authority: Option<String>,
    shoulder: Option<String>,
    separator: Option<String>,
    base_url: Option<String>,
}

/// Full TOML settings document
#[derive(Debug, Deserialize, Default)]
struct TomlSettings {
    #[serde(default)]
    pid: TomlPid,
    #[serde(default)]
    permalink: TomlPermaLink,
}

impl TomlSettings {
    fn into_settings(self) -> MapSettings {
        let mut settings = MapSettings::new();
        let mut put = |key: SettingKey, value: Option<String>| {
            if let Some(value) = value {
                settings.set(key, value);
            }
        };

        put(SettingKey::Protocol, self.pid.protocol);
        put(SettingKey::Authority, self.pid.authority);
        put(SettingKey::Shoulder, self.pid.shoulder);
        put(SettingKey::DoiProvider, self.pid.doi_provider);
        put(
            SettingKey::IdentifierGenerationStyle,
            self.pid.identifier_generation_style,
        );
        put(SettingKey::DataFilePidFormat, self.pid.datafile_pid_format);
        put(SettingKey::SiteUrl, self.pid.site_url);
        if !self.pid.managed_list.is_empty() {
            put(SettingKey::ManagedList, Some(self.pid.managed_list.join(",")));
        }
        if !self.pid.excluded_list.is_empty() {
            put(
                SettingKey::ExcludedList,
                Some(self.pid.excluded_list.join(",")),
            );
        }
        put(SettingKey::PermaLinkAuthority, self.permalink.authority);
        put(SettingKey::PermaLinkShoulder, self.permalink.shoulder);
        put(SettingKey::PermaLinkSeparator, self.permalink.separator);
        put(SettingKey::PermaLinkBaseUrl, self.permalink.base_url);

        settings
    }
}
