//! The `ListSets` response path.
//!
//! Set listing takes no required arguments, so there is nothing to check
//! beyond what the validator already did. The sets come from the record
//! source; this module only renders them.

use chrono::Utc;

use crate::config::ProviderIdentity;
use crate::error::{ProtocolError, ProviderError, Result};
use crate::request::{NormalizedRequest, OaiRequest};
use crate::source::RecordSource;
use crate::xml::{error_document, list_sets_document};

/// Renders `ListSets` responses from a record source.
pub struct SetListingResponder<'a> {
    identity: &'a ProviderIdentity,
    source: &'a dyn RecordSource,
}

impl<'a> SetListingResponder<'a> {
    pub fn new(identity: &'a ProviderIdentity, source: &'a dyn RecordSource) -> Self {
        Self { identity, source }
    }

    /// Produce the `ListSets` document.
    ///
    /// # Arguments
    /// * `request` - Raw arguments, echoed in the response
    /// * `normalized` - Validated arguments, handed to the record source
    ///
    /// # Returns
    /// The response document. A source without sets yields a
    /// `noSetHierarchy` error document, as does any protocol error the
    /// source reports. Other source failures are returned as `Err`.
    pub fn list_sets(&self, request: &OaiRequest, normalized: &NormalizedRequest) -> Result<String> {
        let now = Utc::now();

        let sets = match self.source.sets(normalized) {
            Ok(sets) => sets,
            Err(ProviderError::Protocol(error)) => {
                return error_document(&self.identity.url, request, &error, &now);
            }
            Err(e) => return Err(e),
        };

        if sets.is_empty() {
            tracing::debug!("Record source has no sets");
            let error =
                ProtocolError::NoSetHierarchy("This repository does not support sets".to_string());
            return error_document(&self.identity.url, request, &error, &now);
        }

        tracing::debug!(count = sets.len(), "Listing sets");
        list_sets_document(&self.identity.url, request, &sets, &now)
    }
}
