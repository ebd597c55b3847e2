//! The parsed persistent identifier value

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::PidError;
use crate::format::is_valid_global_id;

/// DOI protocol scheme
pub const DOI_PROTOCOL: &str = "doi";
/// Handle protocol scheme
pub const HDL_PROTOCOL: &str = "hdl";
/// Local PermaLink protocol scheme
pub const PERMA_PROTOCOL: &str = "perma";

/// Public DOI resolver
pub const DOI_RESOLVER_URL: &str = "https://doi.org/";
/// Public Handle resolver
pub const HDL_RESOLVER_URL: &str = "https://hdl.handle.net/";

/// A validated persistent identifier such as `doi:10.5072/FK2/BYM3IW`.
///
/// Authority and identifier are always in normalized form. Values are never
/// mutated; a different identifier is a different `GlobalId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GlobalIdParts", into = "GlobalIdParts")]
pub struct GlobalId {
    protocol: String,
    authority: String,
    identifier: String,
    separator: String,
    url_prefix: String,
    provider_name: String,
}

/// Unvalidated field set, used for (de)serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalIdParts {
    pub protocol: String,
    pub authority: String,
    pub identifier: String,
    #[serde(default)]
    pub separator: String,
    #[serde(default)]
    pub url_prefix: String,
    #[serde(default)]
    pub provider_name: String,
}

impl GlobalId {
    /// Build a GlobalId, returning `None` if the triple fails validation
    pub fn new(
        protocol: impl Into<String>,
        authority: impl Into<String>,
        identifier: impl Into<String>,
        separator: impl Into<String>,
        url_prefix: impl Into<String>,
        provider_name: impl Into<String>,
    ) -> Option<Self> {
        let protocol = protocol.into();
        let authority = authority.into();
        let identifier = identifier.into();

        if !is_valid_global_id(
            Some(protocol.as_str()),
            Some(authority.as_str()),
            Some(identifier.as_str()),
        ) {
            return None;
        }

        Some(Self {
            protocol,
            authority,
            identifier,
            separator: separator.into(),
            url_prefix: url_prefix.into(),
            provider_name: provider_name.into(),
        })
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Display name of the provider that produced this id
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Canonical form: `protocol:authority<separator>identifier`
    pub fn as_string(&self) -> String {
        self.to_string()
    }

    /// Resolvable URL form: `<urlPrefix>authority<separator>identifier`
    pub fn to_url(&self) -> String {
        format!(
            "{}{}{}{}",
            self.url_prefix, self.authority, self.separator, self.identifier
        )
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}{}{}",
            self.protocol, self.authority, self.separator, self.identifier
        )
    }
}

// Resolver prefix and provider label are presentation data, not identity
impl PartialEq for GlobalId {
    fn eq(&self, other: &Self) -> bool {
        self.protocol == other.protocol
            && self.authority == other.authority
            && self.separator == other.separator
            && self.identifier == other.identifier
    }
}

impl Eq for GlobalId {}

impl Hash for GlobalId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.protocol.hash(state);
        self.authority.hash(state);
        self.separator.hash(state);
        self.identifier.hash(state);
    }
}

impl TryFrom<GlobalIdParts> for GlobalId {
    type Error = PidError;

    fn try_from(parts: GlobalIdParts) -> Result<Self, Self::Error> {
        let rendered = format!(
            "{}:{}{}{}",
            parts.protocol, parts.authority, parts.separator, parts.identifier
        );
        GlobalId::new(
            parts.protocol,
            parts.authority,
            parts.identifier,
            parts.separator,
            parts.url_prefix,
            parts.provider_name,
        )
        .ok_or(PidError::InvalidGlobalId(rendered))
    }
}

impl From<GlobalId> for GlobalIdParts {
    fn from(id: GlobalId) -> Self {
        Self {
            protocol: id.protocol,
            authority: id.authority,
            identifier: id.identifier,
            separator: id.separator,
            url_prefix: id.url_prefix,
            provider_name: id.provider_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GlobalId {
        GlobalId::new("doi", "10.5072", "FK2/BYM3IW", "/", DOI_RESOLVER_URL, "DataCite").unwrap()
    }

    #[test]
    fn test_canonical_and_url_forms() {
        let id = sample();
        assert_eq!(id.as_string(), "doi:10.5072/FK2/BYM3IW");
        assert_eq!(id.to_string(), id.as_string());
        assert_eq!(id.to_url(), "https://doi.org/10.5072/FK2/BYM3IW");
    }

    #[test]
    fn test_new_rejects_unnormalized_parts() {
        assert!(GlobalId::new("hdl", "1902.1", "111 012", "/", "", "").is_none());
        assert!(GlobalId::new("hdl", "1902;1", "111012", "/", "", "").is_none());
        assert!(GlobalId::new("hdl", "1902.1", "11\012", "/", "", "").is_none());
    }

    #[test]
    fn test_equality_ignores_presentation_fields() {
        let a = sample();
        let b = GlobalId::new("doi", "10.5072", "FK2/BYM3IW", "/", "", "FAKE").unwrap();
        assert_eq!(a, b);

        let c = GlobalId::new("doi", "10.5072", "FK2/OTHER", "/", "", "").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_serde_validates_on_deserialize() {
        let json = r#"{"protocol":"perma","authority":"A1","identifier":"Q2","separator":"/"}"#;
        let id: GlobalId = serde_json::from_str(json).unwrap();
        assert_eq!(id.as_string(), "perma:A1/Q2");

        let bad = r#"{"protocol":"perma","authority":"A 1","identifier":"Q2"}"#;
        assert!(serde_json::from_str::<GlobalId>(bad).is_err());
    }
}
