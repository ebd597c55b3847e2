//! Fake DOI provider for development and testing installations
//!
//! Mints and parses DOIs like a real registry-backed provider but never
//! calls out. Registration state comes from the local store only.

use std::sync::Arc;

use pid_core::{
    check_doi_authority, rewrite_resolver_url, split_protocol, DvObject, GlobalId, PidError,
    PidProvider, PidUniquenessOracle, ProviderConfig, Result, DOI_PROTOCOL, DOI_RESOLVER_URL,
};

pub const FAKE_PROVIDER_NAME: &str = "FAKE";
pub const FAKE_PROVIDER_TYPE: &str = "FAKE";

/// DOI provider without a registry
pub struct FakePidProvider {
    config: ProviderConfig,
    oracle: Arc<dyn PidUniquenessOracle>,
}

impl FakePidProvider {
    pub fn new(config: ProviderConfig, oracle: Arc<dyn PidUniquenessOracle>) -> Self {
        Self { config, oracle }
    }
}

impl PidProvider for FakePidProvider {
    fn protocol(&self) -> &str {
        DOI_PROTOCOL
    }

    fn provider_type(&self) -> &str {
        FAKE_PROVIDER_TYPE
    }

    fn name(&self) -> &str {
        FAKE_PROVIDER_NAME
    }

    fn separator(&self) -> &str {
        "/"
    }

    fn url_prefix(&self) -> String {
        DOI_RESOLVER_URL.to_string()
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn uniqueness_oracle(&self) -> &dyn PidUniquenessOracle {
        self.oracle.as_ref()
    }

    /// Local knowledge only; the caller's default is ignored
    fn already_registered_id(&self, id: &GlobalId, _no_provider_default: bool) -> Result<bool> {
        Ok(!self.oracle.is_global_id_locally_unique(id))
    }

    fn register_when_published(&self) -> bool {
        true
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
                tracing::warn!("Fake DOI generation failed: {}", e);
                return false;
            }
        }
        obj.set_identifier_registered(true);
        true
    }

    fn parse_persistent_id(&self, raw: &str) -> Option<GlobalId> {
        let raw = rewrite_resolver_url(raw);
        let (protocol, rest) = split_protocol(&raw)?;
        self.parse_persistent_id_tail(protocol, rest)
    }

    fn parse_persistent_id_parts(
        &self,
        protocol: &str,
        authority: &str,
        identifier: &str,
    ) -> Option<GlobalId> {
        if protocol != DOI_PROTOCOL || !check_doi_authority(Some(authority)) {
            return None;
        }
        GlobalId::new(
            protocol,
            authority,
            identifier,
            "/",
            DOI_RESOLVER_URL,
            FAKE_PROVIDER_NAME,
        )
    }
}
