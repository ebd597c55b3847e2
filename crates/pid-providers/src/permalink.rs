//! PermaLink provider
//!
//! PermaLinks are identifiers minted and resolved by the installation
//! itself: `perma:<authority><separator><identifier>`. There is no external
//! registry, so registration state is whatever the local object store says.

use std::sync::Arc;

use pid_core::{
    format_identifier_string, split_protocol, test_for_null_terminator, DvObject, GlobalId,
    PidError, PidProvider, PidUniquenessOracle, ProviderConfig, Result, SettingKey,
    SettingsLookup, PERMA_PROTOCOL,
};

/// Display name recorded on PermaLink ids
pub const PERMA_PROVIDER_NAME: &str = "PERMA";
/// Provider type of the PermaLink backend
pub const PERMA_PROVIDER_TYPE: &str = "perma";
/// Path that resolves a PermaLink on the installation
pub const PERMA_RESOLVER_PATH: &str = "/citation?persistentId=";

/// Installation-local PID provider for the `perma` protocol
pub struct PermaLinkPidProvider {
    config: ProviderConfig,
    separator: String,
    base_url: String,
    url_prefix: String,
    oracle: Arc<dyn PidUniquenessOracle>,
}

impl PermaLinkPidProvider {
    /// Target URLs resolve against `config.site_url`, or `base_url` when
    /// the config carries none.
    pub fn new(
        mut config: ProviderConfig,
        separator: impl Into<String>,
        base_url: impl Into<String>,
        oracle: Arc<dyn PidUniquenessOracle>,
    ) -> Self {
        let base_url = base_url.into();
        if config.site_url.is_empty() {
            config.site_url = base_url.clone();
        }
        let url_prefix = format!("{}{}{}:", base_url, PERMA_RESOLVER_PATH, PERMA_PROTOCOL);
        Self {
            config,
            separator: separator.into(),
            base_url,
            url_prefix,
            oracle,
        }
    }

    /// Build from the `:PermaLink*` settings plus the shared provider settings.
    ///
    /// The base URL falls back to `:SiteUrl` when unset.
    pub fn from_settings(
        settings: &dyn SettingsLookup,
        oracle: Arc<dyn PidUniquenessOracle>,
    ) -> Self {
        let config = ProviderConfig::new(
            settings.value_for_key(SettingKey::PermaLinkAuthority, ""),
            settings.value_for_key(SettingKey::PermaLinkShoulder, ""),
        )
        .with_shared_settings(settings);
        let separator = settings.value_for_key(SettingKey::PermaLinkSeparator, "");
        let base_url = settings.value_for_key(SettingKey::PermaLinkBaseUrl, &config.site_url);
        Self::new(config, separator, base_url, oracle)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl PidProvider for PermaLinkPidProvider {
    fn protocol(&self) -> &str {
        PERMA_PROTOCOL
    }

    fn provider_type(&self) -> &str {
        PERMA_PROVIDER_TYPE
    }

    fn name(&self) -> &str {
        PERMA_PROVIDER_NAME
    }

    fn separator(&self) -> &str {
        &self.separator
    }

    fn url_prefix(&self) -> String {
        self.url_prefix.clone()
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn uniqueness_oracle(&self) -> &dyn PidUniquenessOracle {
        self.oracle.as_ref()
    }

    fn provider_information(&self) -> Vec<String> {
        vec![PERMA_PROVIDER_NAME.to_string(), self.base_url.clone()]
    }

    fn already_registered_id(&self, id: &GlobalId, no_provider_default: bool) -> Result<bool> {
        // A PermaLink is registered once a local object holds it
        Ok(!self.oracle.is_global_id_locally_unique(id) || no_provider_default)
    }

    fn register_when_published(&self) -> bool {
        false
    }

    fn create_identifier(&self, obj: &DvObject) -> Result<String> {
        self.identifier_string(obj).ok_or(PidError::MissingGlobalId)
    }

    fn modify_identifier_target_url(&self, obj: &DvObject) -> Result<String> {
        self.target_url(obj).ok_or(PidError::MissingGlobalId)
    }

    fn delete_identifier(&self, _obj: &DvObject) -> Result<()> {
        Ok(())
    }

    fn publicize_identifier(&self, obj: &mut DvObject) -> bool {
        if obj.lacks_identifier() {
            if let Err(e) = self.generate_identifier(obj) {
                tracing::warn!("Failed to generate PermaLink while publicizing: {}", e);
                return false;
            }
        }
        true
    }

    fn parse_persistent_id(&self, raw: &str) -> Option<GlobalId> {
        let rewritten;
        let raw = match raw.strip_prefix(self.url_prefix.as_str()) {
            Some(rest) => {
                rewritten = format!("{}:{}", PERMA_PROTOCOL, rest);
                rewritten.as_str()
            }
            None => raw,
        };

        let (protocol, rest) = split_protocol(raw)?;
        self.parse_persistent_id_tail(protocol, rest)
    }

    fn parse_persistent_id_tail(&self, protocol: &str, s: &str) -> Option<GlobalId> {
        if protocol != PERMA_PROTOCOL {
            tracing::debug!("Not a PermaLink protocol: {}", protocol);
            return None;
        }

        let authority = self.authority();
        if authority.is_empty() {
            return None;
        }
        let Some(tail) = s
            .strip_prefix(authority)
            .and_then(|rest| rest.strip_prefix(self.separator.as_str()))
        else {
            tracing::debug!(
                "'{}' is not under PermaLink authority {}{}",
                s,
                authority,
                self.separator
            );
            return None;
        };

        let identifier = format_identifier_string(Some(tail))?;
        if identifier.is_empty() || test_for_null_terminator(Some(identifier.as_str())) {
            return None;
        }

        GlobalId::new(
            PERMA_PROTOCOL,
            authority,
            identifier,
            self.separator.as_str(),
            self.url_prefix.as_str(),
            PERMA_PROVIDER_NAME,
        )
    }

    fn parse_persistent_id_parts(
        &self,
        protocol: &str,
        authority: &str,
        identifier: &str,
    ) -> Option<GlobalId> {
        if protocol != PERMA_PROTOCOL {
            return None;
        }
        GlobalId::new(
            protocol,
            authority,
            identifier,
            self.separator.as_str(),
            self.url_prefix.as_str(),
            PERMA_PROVIDER_NAME,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pid_core::{InMemoryPidRegistry, MapSettings};

    fn provider(authority: &str, separator: &str) -> PermaLinkPidProvider {
        PermaLinkPidProvider::new(
            ProviderConfig::new(authority, "").with_site_url("https://data.example.edu"),
            separator,
            "https://data.example.edu",
            Arc::new(InMemoryPidRegistry::new()),
        )
    }

    #[test]
    fn test_url_prefix_and_information() {
        let p = provider("LK", "");
        assert_eq!(
            p.url_prefix(),
            "https://data.example.edu/citation?persistentId=perma:"
        );
        assert_eq!(
            p.provider_information(),
            vec!["PERMA".to_string(), "https://data.example.edu".to_string()]
        );
        assert_eq!(p.provider_type(), "perma");
    }

    #[test]
    fn test_parse_with_empty_separator() {
        let p = provider("LK", "");
        let id = p.parse_persistent_id("perma:LKABC123").unwrap();
        assert_eq!(id.authority(), "LK");
        assert_eq!(id.identifier(), "ABC123");
        assert_eq!(id.separator(), "");
        assert_eq!(id.as_string(), "perma:LKABC123");
        assert_eq!(
            id.to_url(),
            "https://data.example.edu/citation?persistentId=perma:LKABC123"
        );
    }

    #[test]
    fn test_parse_rejections() {
        let p = provider("LK", "/");
        assert!(p.parse_persistent_id("doi:10.5072/FK2").is_none());
        assert!(p.parse_persistent_id("perma:XX/ABC").is_none());
        assert!(p.parse_persistent_id("perma:LK/").is_none());
        assert!(p.parse_persistent_id("perma:LK/ ").is_none());
        assert!(p.parse_persistent_id("perma:LK/A\0B").is_none());
        assert!(p.parse_persistent_id("permaLK/ABC").is_none());
    }

    #[test]
    fn test_parse_normalizes_tail() {
        let p = provider("LK", "/");
        let id = p.parse_persistent_id("perma:LK/A B'C;").unwrap();
        assert_eq!(id.identifier(), "ABC");
    }

    #[test]
    fn test_empty_authority_manages_nothing() {
        let p = provider("", "");
        assert!(!p.can_manage_pid());
        assert!(p.parse_persistent_id("perma:ABC").is_none());
    }

    #[test]
    fn test_parts_reject_other_protocols() {
        let p = provider("LK", "/");
        assert!(p.parse_persistent_id_parts("doi", "LK", "ABC").is_none());
        let id = p.parse_persistent_id_parts("perma", "LK", "ABC").unwrap();
        assert_eq!(id.provider_name(), PERMA_PROVIDER_NAME);
    }

    #[test]
    fn test_lifecycle_without_registry() {
        let p = provider("LK", "/");
        let id = p.global_id_for("ABC").unwrap();
        let ds = DvObject::dataset().with_global_id(&id);

        assert_eq!(p.create_identifier(&ds).unwrap(), "perma:LK/ABC");
        assert_eq!(
            p.modify_identifier_target_url(&ds).unwrap(),
            "https://data.example.edu/dataset.xhtml?persistentId=perma:LK/ABC"
        );
        assert!(p.identifier_metadata(&ds).is_empty());
        assert_eq!(
            p.create_identifier(&DvObject::dataset()),
            Err(PidError::MissingGlobalId)
        );
    }

    #[test]
    fn test_already_registered_uses_local_store() {
        let registry = Arc::new(InMemoryPidRegistry::new());
        let p = PermaLinkPidProvider::new(
            ProviderConfig::new("LK", ""),
            "/",
            "https://data.example.edu",
            registry.clone(),
        );
        let id = p.global_id_for("ABC").unwrap();

        assert!(!p.already_registered_id(&id, false).unwrap());
        assert!(p.already_registered_id(&id, true).unwrap());
        registry.insert(&id);
        assert!(p.already_registered_id(&id, false).unwrap());
    }

    #[test]
    fn test_from_settings() {
        let settings = MapSettings::new()
            .with(SettingKey::PermaLinkAuthority, "LK")
            .with(SettingKey::PermaLinkShoulder, "X1")
            .with(SettingKey::PermaLinkSeparator, "-")
            .with(SettingKey::SiteUrl, "https://site.example.edu");
        let p = PermaLinkPidProvider::from_settings(&settings, Arc::new(InMemoryPidRegistry::new()));

        assert_eq!(p.authority(), "LK");
        assert_eq!(p.shoulder(), "X1");
        assert_eq!(p.separator(), "-");
        assert_eq!(p.base_url(), "https://site.example.edu");
    }
}
