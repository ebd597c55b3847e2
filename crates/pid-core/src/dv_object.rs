//! Identifier-bearing objects (datasets and data files)
//!
//! The host application owns these objects. This crate only reads and writes
//! their identifier fields.

use serde::{Deserialize, Serialize};

use crate::global_id::GlobalId;

/// Landing-page path prefix for datasets
pub const DATASET_TARGET_PATH: &str = "/dataset.xhtml?persistentId=";
/// Landing-page path prefix for data files
pub const DATAFILE_TARGET_PATH: &str = "/file.xhtml?persistentId=";

/// What kind of object carries the identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DvObjectKind {
    Dataset,
    /// A file inside a dataset; dependent file PIDs extend the dataset's identifier
    DataFile { dataset_identifier: Option<String> },
}

/// Identifier fields of a dataset or data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvObject {
    kind: DvObjectKind,
    protocol: Option<String>,
    authority: Option<String>,
    separator: Option<String>,
    identifier: Option<String>,
    url_prefix: Option<String>,
    provider_name: Option<String>,
    identifier_registered: bool,
}

impl DvObject {
    fn with_kind(kind: DvObjectKind) -> Self {
        Self {
            kind,
            protocol: None,
            authority: None,
            separator: None,
            identifier: None,
            url_prefix: None,
            provider_name: None,
            identifier_registered: false,
        }
    }

    /// A dataset without an identifier
    pub fn dataset() -> Self {
        Self::with_kind(DvObjectKind::Dataset)
    }

    /// A data file belonging to a dataset identified by `dataset_identifier`
    pub fn data_file(dataset_identifier: Option<String>) -> Self {
        Self::with_kind(DvObjectKind::DataFile { dataset_identifier })
    }

    /// Builder-style variant of [`DvObject::set_global_id`]
    pub fn with_global_id(mut self, id: &GlobalId) -> Self {
        self.set_global_id(id);
        self
    }

    pub fn kind(&self) -> &DvObjectKind {
        &self.kind
    }

    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// True when no identifier, or an empty one, has been assigned
    pub fn lacks_identifier(&self) -> bool {
        self.identifier.as_deref().map_or(true, str::is_empty)
    }

    pub fn set_protocol(&mut self, protocol: impl Into<String>) {
        self.protocol = Some(protocol.into());
    }

    pub fn set_authority(&mut self, authority: impl Into<String>) {
        self.authority = Some(authority.into());
    }

    pub fn set_separator(&mut self, separator: impl Into<String>) {
        self.separator = Some(separator.into());
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = Some(identifier.into());
    }

    /// Copy every field of `id` onto this object
    pub fn set_global_id(&mut self, id: &GlobalId) {
        self.protocol = Some(id.protocol().to_string());
        self.authority = Some(id.authority().to_string());
        self.separator = Some(id.separator().to_string());
        self.identifier = Some(id.identifier().to_string());
        self.url_prefix = Some(id.url_prefix().to_string());
        self.provider_name = Some(id.provider_name().to_string());
    }

    pub fn is_identifier_registered(&self) -> bool {
        self.identifier_registered
    }

    pub fn set_identifier_registered(&mut self, registered: bool) {
        self.identifier_registered = registered;
    }

    /// The object's identifier as a [`GlobalId`].
    ///
    /// `None` when protocol, authority or identifier is missing, when the
    /// identifier is empty, or when the stored fields fail validation.
    pub fn global_id(&self) -> Option<GlobalId> {
        let identifier = self.identifier.as_deref().filter(|s| !s.is_empty())?;
        GlobalId::new(
            self.protocol.as_deref()?,
            self.authority.as_deref()?,
            identifier,
            self.separator.as_deref().unwrap_or("/"),
            self.url_prefix.as_deref().unwrap_or(""),
            self.provider_name.as_deref().unwrap_or(""),
        )
    }

    /// Landing-page path prefix; the canonical PID is appended to it
    pub fn target_path(&self) -> &'static str {
        match self.kind {
            DvObjectKind::Dataset => DATASET_TARGET_PATH,
            DvObjectKind::DataFile { .. } => DATAFILE_TARGET_PATH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_objects_lack_identifiers() {
        let ds = DvObject::dataset();
        assert!(ds.lacks_identifier());
        assert!(ds.global_id().is_none());
        assert_eq!(ds.target_path(), DATASET_TARGET_PATH);

        let file = DvObject::data_file(Some("FK2/ABCDEF".to_string()));
        assert_eq!(file.target_path(), DATAFILE_TARGET_PATH);
    }

    #[test]
    fn test_empty_identifier_has_no_global_id() {
        let mut ds = DvObject::dataset();
        ds.set_protocol("doi");
        ds.set_authority("10.5072");
        ds.set_identifier("");
        assert!(ds.lacks_identifier());
        assert!(ds.global_id().is_none());
    }

    #[test]
    fn test_global_id_from_fields() {
        let mut ds = DvObject::dataset();
        ds.set_protocol("hdl");
        ds.set_authority("1902.1");
        ds.set_identifier("111012");
        let id = ds.global_id().unwrap();
        assert_eq!(id.as_string(), "hdl:1902.1/111012");
        assert!(!ds.lacks_identifier());
    }

    #[test]
    fn test_set_global_id_round_trips() {
        let id = GlobalId::new("perma", "LK", "ABC123", "", "https://x/", "PERMA").unwrap();
        let ds = DvObject::dataset().with_global_id(&id);
        let back = ds.global_id().unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_url(), "https://x/LKABC123");
        assert_eq!(back.provider_name(), "PERMA");
    }
}
