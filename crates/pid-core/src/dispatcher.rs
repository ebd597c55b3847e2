//! Protocol-based provider selection
//!
//! A [`Dispatcher`] is built once at start-up from an explicit table mapping
//! protocol schemes to resolvers, then threaded through callers. Resolution
//! is a pure lookup plus, for protocols with several backends, one settings
//! read. A missing provider is reported and returned as `None`; it never
//! panics.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::global_id::GlobalId;
use crate::parse;
use crate::provider::PidProvider;
use crate::settings::{SettingKey, SettingsLookup};

/// How a protocol is mapped to a provider
#[derive(Clone)]
pub enum ProviderResolver {
    /// Always the same provider
    Fixed(Arc<dyn PidProvider>),
    /// Chosen by exact match of a setting value, e.g. the DOI provider name
    BySetting {
        key: SettingKey,
        choices: BTreeMap<String, Arc<dyn PidProvider>>,
    },
}

impl ProviderResolver {
    fn resolve(
        &self,
        protocol: &str,
        settings: &dyn SettingsLookup,
    ) -> Option<Arc<dyn PidProvider>> {
        match self {
            ProviderResolver::Fixed(provider) => Some(Arc::clone(provider)),
            ProviderResolver::BySetting { key, choices } => {
                let choice = settings.value_for_key(*key, "");
                match choices.get(&choice) {
                    Some(provider) => Some(Arc::clone(provider)),
                    None => {
                        tracing::error!(
                            "Unknown {} '{}' for protocol {}",
                            key.as_str(),
                            choice,
                            protocol
                        );
                        None
                    }
                }
            }
        }
    }

    fn providers(&self) -> Vec<Arc<dyn PidProvider>> {
        match self {
            ProviderResolver::Fixed(provider) => vec![Arc::clone(provider)],
            ProviderResolver::BySetting { choices, .. } => choices.values().cloned().collect(),
        }
    }
}

impl fmt::Debug for ProviderResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderResolver::Fixed(provider) => {
                f.debug_tuple("Fixed").field(&provider.name()).finish()
            }
            ProviderResolver::BySetting { key, choices } => f
                .debug_struct("BySetting")
                .field("key", key)
                .field("choices", &choices.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Immutable protocol -> resolver table
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    table: BTreeMap<String, ProviderResolver>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Provider for `protocol` under the current settings
    pub fn get_bean(
        &self,
        protocol: &str,
        settings: &dyn SettingsLookup,
    ) -> Option<Arc<dyn PidProvider>> {
        let Some(resolver) = self.table.get(protocol) else {
            tracing::warn!("Unknown protocol: {}", protocol);
            return None;
        };

        let provider = resolver.resolve(protocol, settings)?;
        let info = provider.provider_information();
        let shown = info.first().map(String::as_str).unwrap_or(provider.name());
        tracing::debug!("getBean returns {} for protocol {}", shown, protocol);
        Some(provider)
    }

    /// Provider for the system-wide default protocol setting
    pub fn get_default_bean(&self, settings: &dyn SettingsLookup) -> Option<Arc<dyn PidProvider>> {
        let protocol = settings.value_for_key(SettingKey::Protocol, "");
        self.get_bean(&protocol, settings)
    }

    /// Registered protocol schemes, sorted
    pub fn protocols(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Every provider reachable from the table, in protocol order
    pub fn providers(&self) -> Vec<Arc<dyn PidProvider>> {
        self.table.values().flat_map(|r| r.providers()).collect()
    }

    /// Parse with the first provider grammar that accepts `raw`, falling
    /// back to the generic DOI/Handle grammar
    pub fn parse(&self, raw: &str) -> Option<GlobalId> {
        self.providers()
            .iter()
            .find_map(|provider| provider.parse_persistent_id(raw))
            .or_else(|| parse::parse(raw))
    }
}

/// Collects the table before it is frozen into a [`Dispatcher`]
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    table: BTreeMap<String, ProviderResolver>,
}

impl DispatcherBuilder {
    /// Map `protocol` to a single provider
    pub fn fixed(self, protocol: impl Into<String>, provider: Arc<dyn PidProvider>) -> Self {
        self.resolver(protocol, ProviderResolver::Fixed(provider))
    }

    /// Map `protocol` to the provider named by setting `key`
    pub fn by_setting(
        self,
        protocol: impl Into<String>,
        key: SettingKey,
        choices: BTreeMap<String, Arc<dyn PidProvider>>,
    ) -> Self {
        self.resolver(protocol, ProviderResolver::BySetting { key, choices })
    }

    /// Map `protocol` to `resolver`, replacing any earlier entry
    pub fn resolver(mut self, protocol: impl Into<String>, resolver: ProviderResolver) -> Self {
        let protocol = protocol.into();
        if self.table.contains_key(&protocol) {
            tracing::warn!("Replacing resolver for protocol {}", protocol);
        }
        self.table.insert(protocol, resolver);
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher { table: self.table }
    }
}
