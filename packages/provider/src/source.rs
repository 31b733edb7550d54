//! The record source: the collaborator that knows about actual records.
//!
//! The provider validates requests up front; the record source answers
//! them. It remains responsible for conditions that depend on the records
//! themselves (unknown identifiers, formats a single record cannot be
//! disseminated in, empty result lists), which it reports by returning
//! `ProviderError::Protocol`.

use crate::config::{DocumentConfig, ProviderIdentity};
use crate::error::Result;
use crate::granularity::Granularity;
use crate::request::NormalizedRequest;

/// A set as listed by `ListSets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaiSet {
    /// Machine-readable set spec, e.g. `subject:physics`.
    pub spec: String,
    pub name: String,
    pub description: Option<String>,
}

impl OaiSet {
    /// Create a set without description.
    #[must_use]
    pub fn new(spec: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Options a record source is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// Granularity to render datestamps in; the provider's own granularity.
    pub granularity: Granularity,
    pub limit: Option<usize>,
    pub timestamp_field: Option<String>,
}

impl SourceOptions {
    pub(crate) fn new(document: &DocumentConfig, granularity: Granularity) -> Self {
        Self {
            granularity,
            limit: document.limit,
            timestamp_field: document.timestamp_field.clone(),
        }
    }
}

/// Trait for record source implementations.
///
/// Called concurrently from any thread serving requests.
pub trait RecordSource: Send + Sync {
    /// Produce the complete response document for a validated request.
    ///
    /// Called for `Identify`, `ListMetadataFormats`, `ListIdentifiers`,
    /// `ListRecords` and `GetRecord`.
    fn respond(&self, identity: &ProviderIdentity, request: &NormalizedRequest) -> Result<String>;

    /// Enumerate the sets of the repository.
    ///
    /// An empty list means the repository has no set hierarchy.
    fn sets(&self, request: &NormalizedRequest) -> Result<Vec<OaiSet>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_builder() {
        let set = OaiSet::new("subject:physics", "Physics").with_description("All of it");
        assert_eq!(set.spec, "subject:physics");
        assert_eq!(set.name, "Physics");
        assert_eq!(set.description.as_deref(), Some("All of it"));
    }

    #[test]
    fn test_source_options_from_document() {
        let document = DocumentConfig {
            supported_formats: vec!["oai_dc".to_string()],
            limit: Some(50),
            timestamp_field: Some("timestamp".to_string()),
        };
        let options = SourceOptions::new(&document, Granularity::Date);
        assert_eq!(options.granularity, Granularity::Date);
        assert_eq!(options.limit, Some(50));
        assert_eq!(options.timestamp_field.as_deref(), Some("timestamp"));
    }
}
