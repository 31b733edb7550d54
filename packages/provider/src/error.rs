//! Error types for the provider.
//!
//! Uses the dual-error pattern: `ProtocolError` for conditions that are part
//! of the OAI-PMH protocol and end up as `<error>` elements in a response,
//! and `ProviderError` for everything the caller has to deal with.

use thiserror::Error;

/// An OAI-PMH protocol error.
///
/// These are expected outcomes of a request, not faults. Each variant maps
/// to exactly one error code of the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Illegal, missing or repeated argument, or an illegal argument value.
    #[error("{0}")]
    BadArgument(String),

    /// The requested metadata format is not supported.
    #[error("{0}")]
    BadFormat(String),

    /// Missing or unknown verb.
    #[error("{0}")]
    BadVerb(String),

    /// Invalid or expired resumption token.
    #[error("{0}")]
    BadResumptionToken(String),

    /// Unknown record identifier.
    #[error("{0}")]
    IdDoesNotExist(String),

    /// The combination of arguments results in an empty list.
    #[error("{0}")]
    NoRecordsMatch(String),

    /// No metadata formats are available for the requested item.
    #[error("{0}")]
    NoMetadataFormats(String),

    /// The repository does not support sets.
    #[error("{0}")]
    NoSetHierarchy(String),
}

impl ProtocolError {
    /// Get the OAI-PMH error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadArgument(_) => "badArgument",
            Self::BadFormat(_) => "cannotDisseminateFormat",
            Self::BadVerb(_) => "badVerb",
            Self::BadResumptionToken(_) => "badResumptionToken",
            Self::IdDoesNotExist(_) => "idDoesNotExist",
            Self::NoRecordsMatch(_) => "noRecordsMatch",
            Self::NoMetadataFormats(_) => "noMetadataFormats",
            Self::NoSetHierarchy(_) => "noSetHierarchy",
        }
    }

    /// Get the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::BadArgument(m)
            | Self::BadFormat(m)
            | Self::BadVerb(m)
            | Self::BadResumptionToken(m)
            | Self::IdDoesNotExist(m)
            | Self::NoRecordsMatch(m)
            | Self::NoMetadataFormats(m)
            | Self::NoSetHierarchy(m) => m,
        }
    }

    /// Whether the `request` element of the error response must be left
    /// without attributes.
    ///
    /// OAI-PMH only echoes the request arguments when they were valid, which
    /// rules it out for `badVerb` and `badArgument`.
    #[must_use]
    pub fn suppresses_request_echo(&self) -> bool {
        matches!(self, Self::BadVerb(_) | Self::BadArgument(_))
    }
}

/// Main error type for the provider library.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A protocol condition, usually reported by the record source.
    #[error("OAI-PMH {}: {}", .0.code(), .0.message())]
    Protocol(#[from] ProtocolError),

    /// The record source failed for a reason outside the protocol.
    #[error("Record source failed: {0}")]
    Source(String),

    /// Writing the response document failed.
    #[error("Failed to write XML response: {0}")]
    XmlWrite(String),

    /// Invalid provider configuration.
    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration could not be parsed.
    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_codes() {
        assert_eq!(ProtocolError::BadArgument(String::new()).code(), "badArgument");
        assert_eq!(
            ProtocolError::BadFormat(String::new()).code(),
            "cannotDisseminateFormat"
        );
        assert_eq!(ProtocolError::BadVerb(String::new()).code(), "badVerb");
        assert_eq!(
            ProtocolError::NoSetHierarchy(String::new()).code(),
            "noSetHierarchy"
        );
    }

    #[test]
    fn test_protocol_error_display_is_message() {
        let err = ProtocolError::BadFormat("metadataPrefix not supported".to_string());
        assert_eq!(err.to_string(), "metadataPrefix not supported");
        assert_eq!(err.message(), "metadataPrefix not supported");
    }

    #[test]
    fn test_request_echo_suppression() {
        assert!(ProtocolError::BadArgument(String::new()).suppresses_request_echo());
        assert!(ProtocolError::BadVerb(String::new()).suppresses_request_echo());
        assert!(!ProtocolError::BadFormat(String::new()).suppresses_request_echo());
        assert!(!ProtocolError::IdDoesNotExist(String::new()).suppresses_request_echo());
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::from(ProtocolError::IdDoesNotExist(
            "oai:localhost:42".to_string(),
        ));
        assert_eq!(err.to_string(), "OAI-PMH idDoesNotExist: oai:localhost:42");

        let err = ProviderError::Source("index offline".to_string());
        assert_eq!(err.to_string(), "Record source failed: index offline");
    }
}
