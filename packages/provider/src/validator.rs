//! Per-verb validation of request arguments.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. Metadata format: verbs that disseminate records need a supported
//!    `metadataPrefix`. Skipped when a resumption token is present, since
//!    the token encodes state that was validated when it was issued.
//! 2. Granularity: `from` and `until`, when both are given, must be written
//!    at the same granularity. Also skipped when a resumption token is
//!    present.
//! 3. Normalization: `from` and `until` are replaced by the instants they
//!    denote, whenever they are present.

use crate::error::ProtocolError;
use crate::formats::MetadataFormatRegistry;
use crate::granularity::{parse_date, OaiDate};
use crate::request::{NormalizedRequest, OaiRequest, Verb, OAI_ARGUMENTS};

/// Validates requests against the formats a provider supports.
///
/// Stateless apart from the borrowed registry; safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct RequestValidator<'a> {
    formats: &'a MetadataFormatRegistry,
}

impl<'a> RequestValidator<'a> {
    /// Create a validator for the given format registry.
    #[must_use]
    pub fn new(formats: &'a MetadataFormatRegistry) -> Self {
        Self { formats }
    }

    /// Validate a request and normalize its date arguments.
    ///
    /// # Arguments
    /// * `verb` - The raw verb; unknown verbs are not an error here
    /// * `request` - All request arguments
    ///
    /// # Returns
    /// * `Ok(NormalizedRequest)` with `from`/`until` parsed
    /// * `Err(ProtocolError::BadArgument)` for a missing `metadataPrefix`,
    ///   an unparseable date, or mismatched date granularities
    /// * `Err(ProtocolError::BadFormat)` for an unsupported `metadataPrefix`
    ///
    /// # Examples
    /// ```
    /// use oaipmh_provider::formats::MetadataFormatRegistry;
    /// use oaipmh_provider::request::OaiRequest;
    /// use oaipmh_provider::validator::RequestValidator;
    ///
    /// let formats = MetadataFormatRegistry::default();
    /// let validator = RequestValidator::new(&formats);
    ///
    /// let request = OaiRequest::from_pairs([("verb", "ListRecords")]);
    /// let err = validator.validate("ListRecords", &request).unwrap_err();
    /// assert_eq!(err.code(), "badArgument");
    /// ```
    pub fn validate(
        &self,
        verb: &str,
        request: &OaiRequest,
    ) -> Result<NormalizedRequest, ProtocolError> {
        let resuming = request.non_empty("resumptionToken").is_some();

        if !resuming {
            self.validate_metadata_format(verb, request.non_empty("metadataPrefix"))?;
        }

        let from = request.get("from").map(parse_date).transpose()?;
        let until = request.get("until").map(parse_date).transpose()?;

        if !resuming {
            if let (Some(raw_from), Some(raw_until), Some(from), Some(until)) = (
                request.non_empty("from"),
                request.non_empty("until"),
                from,
                until,
            ) {
                validate_granularity(raw_from, &from, raw_until, &until)?;
            }
        }

        Ok(NormalizedRequest {
            verb: request.verb().map(String::from),
            identifier: request.get("identifier").map(String::from),
            metadata_prefix: request.get("metadataPrefix").map(String::from),
            from: from.map(|d| d.timestamp),
            until: until.map(|d| d.timestamp),
            set: request.get("set").map(String::from),
            resumption_token: request.get("resumptionToken").map(String::from),
            extra: request
                .iter()
                .filter(|(name, _)| !OAI_ARGUMENTS.contains(name))
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        })
    }

    /// Check the `metadataPrefix` of a record-disseminating verb.
    ///
    /// Other verbs, including unknown ones, pass without inspection.
    pub fn validate_metadata_format(
        &self,
        verb: &str,
        metadata_prefix: Option<&str>,
    ) -> Result<(), ProtocolError> {
        let needs_prefix = Verb::parse(verb).is_some_and(|v| v.requires_metadata_prefix());
        if !needs_prefix {
            return Ok(());
        }

        let prefix = metadata_prefix
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ProtocolError::BadArgument("metadataPrefix not provided".to_string()))?;

        if self.formats.is_supported(prefix) {
            Ok(())
        } else {
            Err(ProtocolError::BadFormat(
                "metadataPrefix not supported".to_string(),
            ))
        }
    }
}

/// Require `from` and `until` to share a granularity.
fn validate_granularity(
    raw_from: &str,
    from: &OaiDate,
    raw_until: &str,
    until: &OaiDate,
) -> Result<(), ProtocolError> {
    if from.granularity == until.granularity {
        Ok(())
    } else {
        Err(ProtocolError::BadArgument(format!(
            "Date granularities do not match! {raw_from} - {raw_until}"
        )))
    }
}
