//! Registry-backed providers (DataCite, EZID, Handle)
//!
//! These providers own identifier generation and parsing for their
//! protocol and hand every lifecycle call to a [`RegistryClient`]. The wire
//! protocol of each registry lives behind that trait; the host supplies the
//! client together with its credentials.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use pid_core::{
    check_doi_authority, rewrite_resolver_url, split_protocol, DvObject, GlobalId, PidError,
    PidProvider, PidUniquenessOracle, ProviderConfig, Result, DOI_PROTOCOL, DOI_RESOLVER_URL,
    HDL_PROTOCOL, HDL_RESOLVER_URL,
};

use crate::error::RegistryClientError;

/// Metadata map exchanged with a registry
pub type RegistryMetadata = BTreeMap<String, String>;

/// Blocking access to an external PID registry
pub trait RegistryClient: Send + Sync {
    /// Whether the registry knows `id`, reserved or public
    fn identifier_exists(&self, id: &GlobalId) -> std::result::Result<bool, RegistryClientError>;

    /// Reserve `id` with draft metadata
    fn reserve(
        &self,
        id: &GlobalId,
        metadata: &RegistryMetadata,
    ) -> std::result::Result<(), RegistryClientError>;

    fn metadata(&self, id: &GlobalId) -> std::result::Result<RegistryMetadata, RegistryClientError>;

    /// Replace the metadata stored for `id`
    fn update_metadata(
        &self,
        id: &GlobalId,
        metadata: &RegistryMetadata,
    ) -> std::result::Result<(), RegistryClientError>;

    /// Make a reserved identifier resolvable
    fn publish(
        &self,
        id: &GlobalId,
        metadata: &RegistryMetadata,
    ) -> std::result::Result<(), RegistryClientError>;

    /// Remove a reserved identifier; published identifiers cannot be deleted
    fn delete(&self, id: &GlobalId) -> std::result::Result<(), RegistryClientError>;
}

/// Which registry a [`RegistryPidProvider`] talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryKind {
    DataCite,
    Ezid,
    Handle,
}

impl RegistryKind {
    pub fn protocol(&self) -> &'static str {
        match self {
            RegistryKind::DataCite | RegistryKind::Ezid => DOI_PROTOCOL,
            RegistryKind::Handle => HDL_PROTOCOL,
        }
    }

    /// Display name, also the `:DoiProvider` setting value for DOI kinds
    pub fn name(&self) -> &'static str {
        match self {
            RegistryKind::DataCite => "DataCite",
            RegistryKind::Ezid => "EZID",
            RegistryKind::Handle => "HANDLE",
        }
    }

    pub fn provider_type(&self) -> &'static str {
        match self {
            RegistryKind::DataCite => "datacite",
            RegistryKind::Ezid => "ezid",
            RegistryKind::Handle => "hdl",
        }
    }

    pub fn url_prefix(&self) -> &'static str {
        match self {
            RegistryKind::DataCite | RegistryKind::Ezid => DOI_RESOLVER_URL,
            RegistryKind::Handle => HDL_RESOLVER_URL,
        }
    }

    pub fn is_doi(&self) -> bool {
        self.protocol() == DOI_PROTOCOL
    }
}

/// Provider whose lifecycle operations go to an external registry
pub struct RegistryPidProvider {
    kind: RegistryKind,
    config: ProviderConfig,
    oracle: Arc<dyn PidUniquenessOracle>,
    client: Arc<dyn RegistryClient>,
}

impl RegistryPidProvider {
    pub fn new(
        kind: RegistryKind,
        config: ProviderConfig,
        oracle: Arc<dyn PidUniquenessOracle>,
        client: Arc<dyn RegistryClient>,
    ) -> Self {
        Self {
            kind,
            config,
            oracle,
            client,
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    fn registry_error(&self, e: RegistryClientError) -> PidError {
        tracing::error!("{} registry call failed: {}", self.kind.name(), e);
        e.into_pid_error(self.kind.name())
    }

    fn require_global_id(&self, obj: &DvObject) -> Result<GlobalId> {
        self.entity_global_id(obj).ok_or(PidError::MissingGlobalId)
    }
}

impl PidProvider for RegistryPidProvider {
    fn protocol(&self) -> &str {
        self.kind.protocol()
    }

    fn provider_type(&self) -> &str {
        self.kind.provider_type()
    }

    fn name(&self) -> &str {
        self.kind.name()
    }

    fn separator(&self) -> &str {
        "/"
    }

    fn url_prefix(&self) -> String {
        self.kind.url_prefix().to_string()
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn uniqueness_oracle(&self) -> &dyn PidUniquenessOracle {
        self.oracle.as_ref()
    }

    /// The registry is authoritative; the caller's default is not used
    fn already_registered_id(&self, id: &GlobalId, _no_provider_default: bool) -> Result<bool> {
        self.client
            .identifier_exists(id)
            .map_err(|e| self.registry_error(e))
    }

    fn register_when_published(&self) -> bool {
        true
    }

    fn create_identifier(&self, obj: &DvObject) -> Result<String> {
        let id = self.require_global_id(obj)?;
        let metadata = self.metadata_for_create_indicator(obj);
        self.client
            .reserve(&id, &metadata)
            .map_err(|e| self.registry_error(e))?;
        tracing::info!("{} reserved {}", self.name(), id);
        Ok(id.as_string())
    }

    fn identifier_metadata(&self, obj: &DvObject) -> BTreeMap<String, String> {
        let Some(id) = self.entity_global_id(obj) else {
            return BTreeMap::new();
        };
        match self.client.metadata(&id) {
            Ok(metadata) => metadata,
            Err(e) if e.is_not_found() => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Could not read {} metadata for {}: {}", self.name(), id, e);
                BTreeMap::new()
            }
        }
    }

    fn modify_identifier_target_url(&self, obj: &DvObject) -> Result<String> {
        let id = self.require_global_id(obj)?;
        let target = self.target_url(obj).ok_or(PidError::MissingGlobalId)?;
        let metadata = self.metadata_for_target_url(obj);
        self.client
            .update_metadata(&id, &metadata)
            .map_err(|e| self.registry_error(e))?;
        Ok(target)
    }

    fn delete_identifier(&self, obj: &DvObject) -> Result<()> {
        let id = self.require_global_id(obj)?;
        if obj.is_identifier_registered() {
            tracing::warn!("{} is public and cannot be deleted from {}", id, self.name());
            return Ok(());
        }
        match self.client.delete(&id) {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} was never reserved at {}", id, self.name());
                Ok(())
            }
            Err(e) => Err(self.registry_error(e)),
        }
    }

    fn publicize_identifier(&self, obj: &mut DvObject) -> bool {
        if obj.lacks_identifier() {
            if let Err(e) = self.generate_identifier(obj) {
                tracing::warn!("Identifier generation failed while publicizing: {}", e);
                return false;
            }
        }
        let Some(id) = self.entity_global_id(obj) else {
            return false;
        };

        let metadata = self.metadata_for_target_url(obj);
        match self.client.publish(&id, &metadata) {
            Ok(()) => {
                obj.set_identifier_registered(true);
                true
            }
            Err(e) => {
                tracing::error!("Failed to publicize {} at {}: {}", id, self.name(), e);
                false
            }
        }
    }

    /// Unique locally and unknown to the registry
    fn is_global_id_unique(&self, id: &GlobalId) -> bool {
        if !self.oracle.is_global_id_locally_unique(id) {
            return false;
        }
        match self.client.identifier_exists(id) {
            Ok(exists) => !exists,
            Err(e) => {
                tracing::warn!("Could not check {} at {}: {}", id, self.name(), e);
                false
            }
        }
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
        if protocol != self.protocol() {
            return None;
        }
        if self.kind.is_doi() && !check_doi_authority(Some(authority)) {
            tracing::debug!("'{}' is not a DOI authority", authority);
            return None;
        }
        GlobalId::new(
            protocol,
            authority,
            identifier,
            "/",
            self.kind.url_prefix(),
            self.kind.name(),
        )
    }
}

/// Stored state of one identifier in [`InMemoryRegistryClient`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub metadata: RegistryMetadata,
    pub published: bool,
}

/// Registry kept in process memory.
///
/// Used by the CLI and tests. [`set_offline`](Self::set_offline) makes every
/// call fail with a transport error.
#[derive(Debug, Default)]
pub struct InMemoryRegistryClient {
    records: Mutex<BTreeMap<String, RegistryRecord>>,
    offline: AtomicBool,
}

impl InMemoryRegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn record(&self, id: &GlobalId) -> Option<RegistryRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id.as_string())
            .cloned()
    }

    fn check_online(&self) -> std::result::Result<(), RegistryClientError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RegistryClientError::Transport(
                "registry unreachable".to_string(),
            ));
        }
        Ok(())
    }

    fn with_record<T>(
        &self,
        id: &GlobalId,
        f: impl FnOnce(&mut RegistryRecord) -> std::result::Result<T, RegistryClientError>,
    ) -> std::result::Result<T, RegistryClientError> {
        self.check_online()?;
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let record = records
            .get_mut(&id.as_string())
            .ok_or_else(|| RegistryClientError::NotFound(id.as_string()))?;
        f(record)
    }
}

impl RegistryClient for InMemoryRegistryClient {
    fn identifier_exists(&self, id: &GlobalId) -> std::result::Result<bool, RegistryClientError> {
        self.check_online()?;
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&id.as_string()))
    }

    fn reserve(
        &self,
        id: &GlobalId,
        metadata: &RegistryMetadata,
    ) -> std::result::Result<(), RegistryClientError> {
        self.check_online()?;
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if records.contains_key(&id.as_string()) {
            return Err(RegistryClientError::Rejected(format!(
                "{} is already reserved",
                id
            )));
        }
        records.insert(
            id.as_string(),
            RegistryRecord {
                metadata: metadata.clone(),
                published: false,
            },
        );
        Ok(())
    }

    fn metadata(&self, id: &GlobalId) -> std::result::Result<RegistryMetadata, RegistryClientError> {
        self.with_record(id, |record| Ok(record.metadata.clone()))
    }

    fn update_metadata(
        &self,
        id: &GlobalId,
        metadata: &RegistryMetadata,
    ) -> std::result::Result<(), RegistryClientError> {
        self.with_record(id, |record| {
            record.metadata.extend(metadata.clone());
            Ok(())
        })
    }

    fn publish(
        &self,
        id: &GlobalId,
        metadata: &RegistryMetadata,
    ) -> std::result::Result<(), RegistryClientError> {
        self.check_online()?;
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let record = records.entry(id.as_string()).or_default();
        record.metadata.extend(metadata.clone());
        record.published = true;
        Ok(())
    }

    fn delete(&self, id: &GlobalId) -> std::result::Result<(), RegistryClientError> {
        self.check_online()?;
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        match records.get(&id.as_string()) {
            None => Err(RegistryClientError::NotFound(id.as_string())),
            Some(record) if record.published => Err(RegistryClientError::Rejected(format!(
                "{} is published",
                id
            ))),
            Some(_) => {
                records.remove(&id.as_string());
                Ok(())
            }
        }
    }
}
