//! The provider capability contract
//!
//! Every backend (PermaLink, DataCite, EZID, Handle, the fake DOI provider)
//! implements [`PidProvider`]. Behaviour shared by all backends, such as
//! identifier generation, the generic parsing grammar and the target-URL
//! metadata, lives in default methods; a provider overrides what differs.
//!
//! Providers are built once from configuration and shared as
//! `Arc<dyn PidProvider>` across concurrent callers. None of them holds
//! per-call state.

use std::collections::BTreeMap;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dv_object::{DvObject, DvObjectKind};
use crate::error::{PidError, Result};
use crate::global_id::GlobalId;
use crate::parse::{split_authority, split_protocol};
use crate::service::PidUniquenessOracle;
use crate::settings::{split_list_setting, SettingKey, SettingsLookup};

/// Candidates tried before dataset identifier generation gives up
pub const MAX_GENERATION_ATTEMPTS: usize = 100;
/// Highest file number probed for a dependent data-file identifier
pub const DEPENDENT_FILE_PROBE_LIMIT: usize = 100_000;
/// Length of the random part of a `randomString` identifier
pub const RANDOM_IDENTIFIER_LENGTH: usize = 6;

/// Metadata key carrying the landing-page URL
pub const TARGET_METADATA_KEY: &str = "_target";
/// Metadata key marking an identifier as reserved but unpublished
pub const RESERVED_YEAR_METADATA_KEY: &str = "datacite.publicationyear";
pub const RESERVED_PUBLICATION_YEAR: &str = "9999";

/// How new identifiers are minted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdentifierGenerationStyle {
    /// Shoulder followed by six random upper-case alphanumerics
    #[default]
    RandomString,
    /// Shoulder followed by the next value of the host's sequence
    StoredProcGenerated,
}

impl IdentifierGenerationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierGenerationStyle::RandomString => "randomString",
            IdentifierGenerationStyle::StoredProcGenerated => "storedProcGenerated",
        }
    }

    /// Parse a setting value; unknown values fall back to `randomString`
    pub fn from_setting(value: &str) -> Self {
        match value {
            "storedProcGenerated" => IdentifierGenerationStyle::StoredProcGenerated,
            "randomString" | "" => IdentifierGenerationStyle::RandomString,
            other => {
                tracing::warn!(
                    "Unknown identifier generation style '{}', using randomString",
                    other
                );
                IdentifierGenerationStyle::RandomString
            }
        }
    }
}

/// How data-file identifiers relate to their dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataFilePidFormat {
    /// `<dataset identifier>/<n>`
    #[default]
    Dependent,
    /// Minted like a dataset identifier
    Independent,
}

impl DataFilePidFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFilePidFormat::Dependent => "DEPENDENT",
            DataFilePidFormat::Independent => "INDEPENDENT",
        }
    }

    /// Parse a setting value; unknown values fall back to `DEPENDENT`
    pub fn from_setting(value: &str) -> Self {
        match value {
            "INDEPENDENT" => DataFilePidFormat::Independent,
            "DEPENDENT" | "" => DataFilePidFormat::Dependent,
            other => {
                tracing::warn!("Unknown data file PID format '{}', using DEPENDENT", other);
                DataFilePidFormat::Dependent
            }
        }
    }
}

/// Immutable configuration of one provider instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub authority: String,
    /// Namespace prefix under the authority reserved for this installation
    pub shoulder: String,
    pub identifier_generation_style: IdentifierGenerationStyle,
    pub datafile_pid_format: DataFilePidFormat,
    /// Canonical PIDs managed even though they fall outside authority/shoulder
    pub managed_list: Vec<String>,
    /// Canonical PIDs never managed even though they match authority/shoulder
    pub excluded_list: Vec<String>,
    /// Base URL that landing-page paths are appended to
    pub site_url: String,
}

impl ProviderConfig {
    pub fn new(authority: impl Into<String>, shoulder: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            shoulder: shoulder.into(),
            ..Default::default()
        }
    }

    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = site_url.into();
        self
    }

    pub fn with_generation_style(mut self, style: IdentifierGenerationStyle) -> Self {
        self.identifier_generation_style = style;
        self
    }

    pub fn with_datafile_pid_format(mut self, format: DataFilePidFormat) -> Self {
        self.datafile_pid_format = format;
        self
    }

    pub fn with_managed_list(mut self, managed: Vec<String>) -> Self {
        self.managed_list = managed;
        self
    }

    pub fn with_excluded_list(mut self, excluded: Vec<String>) -> Self {
        self.excluded_list = excluded;
        self
    }

    /// Configuration for the DOI and Handle providers
    pub fn from_settings(settings: &dyn SettingsLookup) -> Self {
        Self::new(
            settings.value_for_key(SettingKey::Authority, ""),
            settings.value_for_key(SettingKey::Shoulder, ""),
        )
        .with_shared_settings(settings)
    }

    /// Apply the settings every provider shares (style, file format, lists, site URL)
    pub fn with_shared_settings(self, settings: &dyn SettingsLookup) -> Self {
        self.with_generation_style(IdentifierGenerationStyle::from_setting(
            &settings.value_for_key(SettingKey::IdentifierGenerationStyle, ""),
        ))
        .with_datafile_pid_format(DataFilePidFormat::from_setting(
            &settings.value_for_key(SettingKey::DataFilePidFormat, ""),
        ))
        .with_managed_list(split_list_setting(
            &settings.value_for_key(SettingKey::ManagedList, ""),
        ))
        .with_excluded_list(split_list_setting(
            &settings.value_for_key(SettingKey::ExcludedList, ""),
        ))
        .with_site_url(settings.value_for_key(SettingKey::SiteUrl, ""))
    }
}

/// Contract every PID backend satisfies
pub trait PidProvider: Send + Sync {
    /// Protocol scheme served, e.g. `doi`
    fn protocol(&self) -> &str;

    /// Short machine name of the backend type
    fn provider_type(&self) -> &str;

    /// Human-readable provider name, recorded on parsed ids
    fn name(&self) -> &str;

    /// String placed between authority and identifier
    fn separator(&self) -> &str;

    /// Resolver base for resolvable URLs
    fn url_prefix(&self) -> String;

    fn config(&self) -> &ProviderConfig;

    fn uniqueness_oracle(&self) -> &dyn PidUniquenessOracle;

    /// Diagnostic description; the first element is the display name
    fn provider_information(&self) -> Vec<String> {
        vec![self.name().to_string()]
    }

    fn authority(&self) -> &str {
        &self.config().authority
    }

    fn shoulder(&self) -> &str {
        &self.config().shoulder
    }

    fn identifier_generation_style(&self) -> IdentifierGenerationStyle {
        self.config().identifier_generation_style
    }

    /// The object's identifier read through this provider's grammar.
    ///
    /// Only protocol, authority and identifier are taken from the object;
    /// separator, resolver prefix and label are the provider's own.
    fn entity_global_id(&self, obj: &DvObject) -> Option<GlobalId> {
        let identifier = obj.identifier().filter(|s| !s.is_empty())?;
        self.parse_persistent_id_parts(obj.protocol()?, obj.authority()?, identifier)
    }

    /// Whether the object's identifier is registered
    fn already_registered(&self, obj: &DvObject) -> Result<bool> {
        match self.entity_global_id(obj) {
            Some(id) => self.already_registered_id(&id, false),
            None => Ok(false),
        }
    }

    /// Authoritative registration check.
    ///
    /// Registry-backed providers ask the registry. Providers without one
    /// report local existence and fall back to `no_provider_default` when
    /// the id is not known locally.
    fn already_registered_id(&self, id: &GlobalId, no_provider_default: bool) -> Result<bool>;

    /// Whether publishing requires a separate registration call
    fn register_when_published(&self) -> bool;

    /// Whether this instance is authoritative for its authority/shoulder
    fn can_manage_pid(&self) -> bool {
        !self.authority().is_empty()
    }

    /// Whether `id` falls in this provider's managed scope
    fn can_create_pids_like(&self, id: &GlobalId) -> bool {
        let canonical = id.as_string();
        let config = self.config();
        if config.excluded_list.iter().any(|e| *e == canonical) {
            return false;
        }
        if config.managed_list.iter().any(|m| *m == canonical) {
            return true;
        }
        id.protocol() == self.protocol()
            && id.authority() == self.authority()
            && id.identifier().starts_with(self.shoulder())
    }

    /// Register the identifier; the result contains the object's identifier
    fn create_identifier(&self, obj: &DvObject) -> Result<String>;

    /// Metadata stored by the provider for the identifier
    fn identifier_metadata(&self, _obj: &DvObject) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Metadata sent when reserving an identifier
    fn metadata_for_create_indicator(&self, obj: &DvObject) -> BTreeMap<String, String> {
        let mut metadata = self.metadata_for_target_url(obj);
        metadata.insert(
            RESERVED_YEAR_METADATA_KEY.to_string(),
            RESERVED_PUBLICATION_YEAR.to_string(),
        );
        metadata
    }

    /// Metadata sent when updating the landing-page URL
    fn metadata_for_target_url(&self, obj: &DvObject) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        if let Some(url) = self.target_url(obj) {
            metadata.insert(TARGET_METADATA_KEY.to_string(), url);
        }
        metadata
    }

    /// Point the resolver at the object's current landing page; returns the URL set
    fn modify_identifier_target_url(&self, obj: &DvObject) -> Result<String>;

    fn delete_identifier(&self, obj: &DvObject) -> Result<()>;

    /// Publish-time hook; generates an identifier first when the object has none
    fn publicize_identifier(&self, obj: &mut DvObject) -> bool;

    /// Canonical string of the object's identifier
    fn identifier_string(&self, obj: &DvObject) -> Option<String> {
        self.entity_global_id(obj).map(|id| id.as_string())
    }

    /// Landing-page URL: site URL, landing path, canonical PID
    fn target_url(&self, obj: &DvObject) -> Option<String> {
        self.entity_global_id(obj).map(|id| {
            format!(
                "{}{}{}",
                self.config().site_url,
                obj.target_path(),
                id.as_string()
            )
        })
    }

    /// A GlobalId in this provider's namespace for `identifier`
    fn global_id_for(&self, identifier: &str) -> Option<GlobalId> {
        GlobalId::new(
            self.protocol(),
            self.authority(),
            identifier,
            self.separator(),
            self.url_prefix(),
            self.name(),
        )
    }

    /// Assign a new, locally unique identifier to the object
    fn generate_identifier(&self, obj: &mut DvObject) -> Result<()> {
        let identifier = match obj.kind() {
            DvObjectKind::Dataset => self.generate_dataset_identifier(obj)?,
            DvObjectKind::DataFile { .. } => self.generate_data_file_identifier(obj)?,
        };
        let id = self
            .global_id_for(&identifier)
            .ok_or_else(|| PidError::InvalidGlobalId(identifier.clone()))?;

        tracing::info!("{} generated {}", self.name(), id);
        obj.set_global_id(&id);
        Ok(())
    }

    fn generate_dataset_identifier(&self, _obj: &DvObject) -> Result<String> {
        let shoulder = self.shoulder();
        match self.identifier_generation_style() {
            IdentifierGenerationStyle::RandomString => {
                claim_first(self, MAX_GENERATION_ATTEMPTS, |_| {
                    format!("{}{}", shoulder, random_identifier())
                })
            }
            IdentifierGenerationStyle::StoredProcGenerated => {
                let oracle = self.uniqueness_oracle();
                claim_first(self, MAX_GENERATION_ATTEMPTS, |_| {
                    format!("{}{}", shoulder, oracle.next_sequence_value())
                })
            }
        }
    }

    fn generate_data_file_identifier(&self, obj: &DvObject) -> Result<String> {
        let dataset_identifier = match obj.kind() {
            DvObjectKind::DataFile {
                dataset_identifier: Some(ds),
            } if !ds.is_empty() => Some(ds.as_str()),
            _ => None,
        };

        match (self.config().datafile_pid_format, dataset_identifier) {
            (DataFilePidFormat::Dependent, Some(ds)) => {
                claim_first(self, DEPENDENT_FILE_PROBE_LIMIT, |attempt| {
                    format!("{}/{}", ds, attempt + 1)
                })
            }
            _ => self.generate_dataset_identifier(obj),
        }
    }

    /// True when no local object holds `id`
    fn is_global_id_unique(&self, id: &GlobalId) -> bool {
        self.uniqueness_oracle().is_global_id_locally_unique(id)
    }

    /// Parse `protocol:authority<separator>identifier`
    fn parse_persistent_id(&self, raw: &str) -> Option<GlobalId> {
        let Some((protocol, rest)) = split_protocol(raw) else {
            tracing::debug!(
                "Error parsing identifier '{}': '<protocol>:' not found",
                raw
            );
            return None;
        };
        self.parse_persistent_id_tail(protocol, rest)
    }

    /// Parse the part after `protocol:`
    fn parse_persistent_id_tail(&self, protocol: &str, s: &str) -> Option<GlobalId> {
        let (authority, identifier) = split_authority(s, self.separator())?;
        self.parse_persistent_id_parts(protocol, authority, identifier)
    }

    /// Validate a triple; rejects protocols other than this provider's
    fn parse_persistent_id_parts(
        &self,
        protocol: &str,
        authority: &str,
        identifier: &str,
    ) -> Option<GlobalId> {
        if protocol != self.protocol() {
            return None;
        }
        tracing::debug!(
            "Parsing {}:{}{}{} in {}",
            protocol,
            authority,
            self.separator(),
            identifier,
            self.name()
        );
        GlobalId::new(
            protocol,
            authority,
            identifier,
            self.separator(),
            self.url_prefix(),
            self.name(),
        )
    }
}

/// Six random upper-case alphanumerics
pub fn random_identifier() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_IDENTIFIER_LENGTH)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

/// Reserve the first free candidate, trying at most `limit` of them.
///
/// A candidate must be unique for the provider (locally and, for registry
/// providers, remotely) and then be claimed from the local oracle. A
/// candidate lost to a concurrent generator is simply skipped.
fn claim_first<P, F>(provider: &P, limit: usize, mut candidate: F) -> Result<String>
where
    P: PidProvider + ?Sized,
    F: FnMut(usize) -> String,
{
    for attempt in 0..limit {
        let identifier = candidate(attempt);
        let Some(id) = provider.global_id_for(&identifier) else {
            return Err(PidError::InvalidConfig(format!(
                "generated identifier '{}' is not a valid PID part",
                identifier
            )));
        };
        if provider.is_global_id_unique(&id) && provider.uniqueness_oracle().try_reserve(&id) {
            return Ok(identifier);
        }
        tracing::debug!("{} already in use, trying another", id);
    }

    Err(PidError::GenerationExhausted {
        scope: format!(
            "{}:{}{}{}",
            provider.protocol(),
            provider.authority(),
            provider.separator(),
            provider.shoulder()
        ),
        attempts: limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::InMemoryPidRegistry;

    struct TestProvider {
        config: ProviderConfig,
        registry: InMemoryPidRegistry,
    }

    impl TestProvider {
        fn new(config: ProviderConfig) -> Self {
            Self {
                config,
                registry: InMemoryPidRegistry::new(),
            }
        }
    }

    impl PidProvider for TestProvider {
        fn protocol(&self) -> &str {
            "doi"
        }

        fn provider_type(&self) -> &str {
            "test"
        }

        fn name(&self) -> &str {
            "TEST"
        }

        fn separator(&self) -> &str {
            "/"
        }

        fn url_prefix(&self) -> String {
            "https://doi.org/".to_string()
        }

        fn config(&self) -> &ProviderConfig {
            &self.config
        }

        fn uniqueness_oracle(&self) -> &dyn PidUniquenessOracle {
            &self.registry
        }

        fn already_registered_id(&self, id: &GlobalId, _default: bool) -> Result<bool> {
            Ok(!self.is_global_id_unique(id))
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

        fn publicize_identifier(&self, _obj: &mut DvObject) -> bool {
            true
        }
    }

    /// Oracle that refuses every reservation
    struct FullOracle;

    impl PidUniquenessOracle for FullOracle {
        fn is_global_id_locally_unique(&self, _id: &GlobalId) -> bool {
            false
        }

        fn next_sequence_value(&self) -> u64 {
            0
        }
    }

    struct FullProvider(ProviderConfig);

    impl PidProvider for FullProvider {
        fn protocol(&self) -> &str {
            "doi"
        }
        fn provider_type(&self) -> &str {
            "full"
        }
        fn name(&self) -> &str {
            "FULL"
        }
        fn separator(&self) -> &str {
            "/"
        }
        fn url_prefix(&self) -> String {
            String::new()
        }
        fn config(&self) -> &ProviderConfig {
            &self.0
        }
        fn uniqueness_oracle(&self) -> &dyn PidUniquenessOracle {
            &FullOracle
        }
        fn already_registered_id(&self, _id: &GlobalId, default: bool) -> Result<bool> {
            Ok(default)
        }
        fn register_when_published(&self) -> bool {
            false
        }
        fn create_identifier(&self, _obj: &DvObject) -> Result<String> {
            Err(PidError::MissingGlobalId)
        }
        fn modify_identifier_target_url(&self, _obj: &DvObject) -> Result<String> {
            Err(PidError::MissingGlobalId)
        }
        fn delete_identifier(&self, _obj: &DvObject) -> Result<()> {
            Ok(())
        }
        fn publicize_identifier(&self, _obj: &mut DvObject) -> bool {
            false
        }
    }

    fn provider() -> TestProvider {
        TestProvider::new(
            ProviderConfig::new("10.5072", "FK2/").with_site_url("https://data.example.edu"),
        )
    }

    #[test]
    fn test_entity_global_id_uses_provider_grammar() {
        let p = provider();
        let mut ds = DvObject::dataset();
        assert!(p.entity_global_id(&ds).is_none());

        ds.set_protocol("doi");
        ds.set_authority("10.5072");
        ds.set_separator("-");
        ds.set_identifier("FK2/ABC");
        let id = p.entity_global_id(&ds).unwrap();
        assert_eq!(id.as_string(), "doi:10.5072/FK2/ABC");
        assert_eq!(id.to_url(), "https://doi.org/10.5072/FK2/ABC");

        ds.set_identifier("");
        assert!(p.entity_global_id(&ds).is_none());
        ds.set_identifier("FK2/ABC");
        ds.set_protocol("hdl");
        assert!(p.entity_global_id(&ds).is_none());
    }

    #[test]
    fn test_random_string_generation() {
        let p = provider();
        let mut ds = DvObject::dataset();
        p.generate_identifier(&mut ds).unwrap();

        let id = ds.global_id().unwrap();
        assert_eq!(id.protocol(), "doi");
        assert_eq!(id.authority(), "10.5072");
        assert!(id.identifier().starts_with("FK2/"));
        let random = &id.identifier()["FK2/".len()..];
        assert_eq!(random.len(), RANDOM_IDENTIFIER_LENGTH);
        assert!(random
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert!(!p.is_global_id_unique(&id));
    }

    #[test]
    fn test_stored_proc_generation() {
        let p = TestProvider::new(
            ProviderConfig::new("10.5072", "FK2/")
                .with_generation_style(IdentifierGenerationStyle::StoredProcGenerated),
        );
        let mut first = DvObject::dataset();
        let mut second = DvObject::dataset();
        p.generate_identifier(&mut first).unwrap();
        p.generate_identifier(&mut second).unwrap();
        assert_eq!(first.identifier(), Some("FK2/1"));
        assert_eq!(second.identifier(), Some("FK2/2"));
    }

    #[test]
    fn test_stored_proc_skips_taken_values() {
        let p = TestProvider::new(
            ProviderConfig::new("10.5072", "")
                .with_generation_style(IdentifierGenerationStyle::StoredProcGenerated),
        );
        p.registry.insert(&p.global_id_for("1").unwrap());
        let mut ds = DvObject::dataset();
        p.generate_identifier(&mut ds).unwrap();
        assert_eq!(ds.identifier(), Some("2"));
    }

    #[test]
    fn test_dependent_data_file_identifiers() {
        let p = provider();
        let mut f1 = DvObject::data_file(Some("FK2/ABCDEF".to_string()));
        let mut f2 = DvObject::data_file(Some("FK2/ABCDEF".to_string()));
        p.generate_identifier(&mut f1).unwrap();
        p.generate_identifier(&mut f2).unwrap();
        assert_eq!(f1.identifier(), Some("FK2/ABCDEF/1"));
        assert_eq!(f2.identifier(), Some("FK2/ABCDEF/2"));
    }

    #[test]
    fn test_independent_data_file_identifiers() {
        let p = TestProvider::new(
            ProviderConfig::new("10.5072", "FK2/")
                .with_datafile_pid_format(DataFilePidFormat::Independent),
        );
        let mut file = DvObject::data_file(Some("FK2/ABCDEF".to_string()));
        p.generate_identifier(&mut file).unwrap();
        let identifier = file.identifier().unwrap();
        assert!(!identifier.starts_with("FK2/ABCDEF/"));
        assert_eq!(identifier.len(), "FK2/".len() + RANDOM_IDENTIFIER_LENGTH);
    }

    #[test]
    fn test_dependent_file_without_dataset_falls_back() {
        let p = provider();
        let mut file = DvObject::data_file(None);
        p.generate_identifier(&mut file).unwrap();
        assert_eq!(
            file.identifier().unwrap().len(),
            "FK2/".len() + RANDOM_IDENTIFIER_LENGTH
        );
    }

    #[test]
    fn test_generation_exhausted() {
        let p = FullProvider(ProviderConfig::new("10.5072", "FK2/"));
        let mut ds = DvObject::dataset();
        let err = p.generate_identifier(&mut ds).unwrap_err();
        assert_eq!(
            err,
            PidError::GenerationExhausted {
                scope: "doi:10.5072/FK2/".to_string(),
                attempts: MAX_GENERATION_ATTEMPTS,
            }
        );
        assert!(ds.lacks_identifier());
    }

    #[test]
    fn test_invalid_shoulder_is_config_error() {
        let p = TestProvider::new(ProviderConfig::new("10.5072", "FK 2/"));
        let mut ds = DvObject::dataset();
        assert!(matches!(
            p.generate_identifier(&mut ds),
            Err(PidError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_default_parsing() {
        let p = provider();
        let id = p.parse_persistent_id("doi:10.5072/FK2/BYM3IW").unwrap();
        assert_eq!(id.authority(), "10.5072");
        assert_eq!(id.identifier(), "FK2/BYM3IW");
        assert_eq!(id.provider_name(), "TEST");
        assert_eq!(id.url_prefix(), "https://doi.org/");

        assert!(p.parse_persistent_id("hdl:1902.1/111012").is_none());
        assert!(p.parse_persistent_id("10.5072/FK2").is_none());
        assert!(p.parse_persistent_id_parts("doi", "10.5072", "a b").is_none());
    }

    #[test]
    fn test_target_url_and_metadata() {
        let p = provider();
        let id = p.global_id_for("FK2/ABC").unwrap();
        let ds = DvObject::dataset().with_global_id(&id);

        let url = p.target_url(&ds).unwrap();
        assert_eq!(
            url,
            "https://data.example.edu/dataset.xhtml?persistentId=doi:10.5072/FK2/ABC"
        );

        let target = p.metadata_for_target_url(&ds);
        assert_eq!(target.get(TARGET_METADATA_KEY), Some(&url));

        let create = p.metadata_for_create_indicator(&ds);
        assert_eq!(
            create.get(RESERVED_YEAR_METADATA_KEY).map(String::as_str),
            Some(RESERVED_PUBLICATION_YEAR)
        );
        assert_eq!(create.len(), 2);

        assert!(p.metadata_for_target_url(&DvObject::dataset()).is_empty());
    }

    #[test]
    fn test_can_create_pids_like() {
        let p = TestProvider::new(
            ProviderConfig::new("10.5072", "FK2/")
                .with_managed_list(vec!["doi:10.9999/LEGACY".to_string()])
                .with_excluded_list(vec!["doi:10.5072/FK2/SKIP".to_string()]),
        );
        let ours = GlobalId::new("doi", "10.5072", "FK2/ABC", "/", "", "").unwrap();
        let other_shoulder = GlobalId::new("doi", "10.5072", "XY/ABC", "/", "", "").unwrap();
        let managed = GlobalId::new("doi", "10.9999", "LEGACY", "/", "", "").unwrap();
        let excluded = GlobalId::new("doi", "10.5072", "FK2/SKIP", "/", "", "").unwrap();

        assert!(p.can_create_pids_like(&ours));
        assert!(!p.can_create_pids_like(&other_shoulder));
        assert!(p.can_create_pids_like(&managed));
        assert!(!p.can_create_pids_like(&excluded));
    }

    #[test]
    fn test_can_manage_pid_requires_authority() {
        assert!(provider().can_manage_pid());
        assert!(!TestProvider::new(ProviderConfig::default()).can_manage_pid());
    }

    #[test]
    fn test_setting_parsers() {
        assert_eq!(
            IdentifierGenerationStyle::from_setting("storedProcGenerated"),
            IdentifierGenerationStyle::StoredProcGenerated
        );
        assert_eq!(
            IdentifierGenerationStyle::from_setting("bogus"),
            IdentifierGenerationStyle::RandomString
        );
        assert_eq!(
            DataFilePidFormat::from_setting("INDEPENDENT"),
            DataFilePidFormat::Independent
        );
        assert_eq!(DataFilePidFormat::from_setting(""), DataFilePidFormat::Dependent);
    }

    #[test]
    fn test_config_from_settings() {
        use crate::settings::MapSettings;

        let settings = MapSettings::new()
            .with(SettingKey::Authority, "10.5072")
            .with(SettingKey::Shoulder, "FK2/")
            .with(SettingKey::IdentifierGenerationStyle, "storedProcGenerated")
            .with(SettingKey::ExcludedList, "doi:10.5072/FK2/A, doi:10.5072/FK2/B");
        let config = ProviderConfig::from_settings(&settings);

        assert_eq!(config.authority, "10.5072");
        assert_eq!(config.shoulder, "FK2/");
        assert_eq!(
            config.identifier_generation_style,
            IdentifierGenerationStyle::StoredProcGenerated
        );
        assert_eq!(config.datafile_pid_format, DataFilePidFormat::Dependent);
        assert_eq!(config.excluded_list.len(), 2);
    }
}
