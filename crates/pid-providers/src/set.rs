//! Start-up wiring of every provider into a [`Dispatcher`]

use std::collections::BTreeMap;
use std::sync::Arc;

use pid_core::{
    Dispatcher, PidProvider, PidUniquenessOracle, ProviderConfig, SettingKey, SettingsLookup,
    DOI_PROTOCOL, HDL_PROTOCOL, PERMA_PROTOCOL,
};

use crate::fake::{FakePidProvider, FAKE_PROVIDER_NAME};
use crate::permalink::PermaLinkPidProvider;
use crate::registry::{RegistryClient, RegistryKind, RegistryPidProvider};

/// The providers of one installation, built once from settings
#[derive(Clone)]
pub struct ProviderSet {
    pub datacite: Arc<RegistryPidProvider>,
    pub ezid: Arc<RegistryPidProvider>,
    pub handle: Arc<RegistryPidProvider>,
    pub fake: Arc<FakePidProvider>,
    pub permalink: Arc<PermaLinkPidProvider>,
}

impl ProviderSet {
    /// Build every provider, sharing one uniqueness oracle and one registry client
    pub fn from_settings(
        settings: &dyn SettingsLookup,
        oracle: Arc<dyn PidUniquenessOracle>,
        client: Arc<dyn RegistryClient>,
    ) -> Self {
        let config = ProviderConfig::from_settings(settings);
        let registry = |kind| {
            Arc::new(RegistryPidProvider::new(
                kind,
                config.clone(),
                Arc::clone(&oracle),
                Arc::clone(&client),
            ))
        };

        let set = Self {
            datacite: registry(RegistryKind::DataCite),
            ezid: registry(RegistryKind::Ezid),
            handle: registry(RegistryKind::Handle),
            fake: Arc::new(FakePidProvider::new(config.clone(), Arc::clone(&oracle))),
            permalink: Arc::new(PermaLinkPidProvider::from_settings(
                settings,
                Arc::clone(&oracle),
            )),
        };
        tracing::debug!(
            "Built PID providers (authority '{}', PermaLink authority '{}')",
            config.authority,
            set.permalink.authority()
        );
        set
    }

    /// Protocol table: `hdl` and `perma` are fixed, `doi` follows `:DoiProvider`
    pub fn dispatcher(&self) -> Dispatcher {
        let mut doi: BTreeMap<String, Arc<dyn PidProvider>> = BTreeMap::new();
        doi.insert(RegistryKind::Ezid.name().to_string(), self.ezid.clone());
        doi.insert(RegistryKind::DataCite.name().to_string(), self.datacite.clone());
        doi.insert(FAKE_PROVIDER_NAME.to_string(), self.fake.clone());

        Dispatcher::builder()
            .fixed(HDL_PROTOCOL, self.handle.clone())
            .by_setting(DOI_PROTOCOL, SettingKey::DoiProvider, doi)
            .fixed(PERMA_PROTOCOL, self.permalink.clone())
            .build()
    }

    pub fn all(&self) -> Vec<Arc<dyn PidProvider>> {
        vec![
            self.datacite.clone() as Arc<dyn PidProvider>,
            self.ezid.clone(),
            self.handle.clone(),
            self.fake.clone(),
            self.permalink.clone(),
        ]
    }
}
