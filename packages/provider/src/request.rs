//! Request types: the raw argument map and its validated form.

use std::collections::BTreeMap;

use crate::granularity::Timestamp;

/// Argument names defined by OAI-PMH, in the order they are echoed.
pub const OAI_ARGUMENTS: [&str; 7] = [
    "verb",
    "identifier",
    "metadataPrefix",
    "from",
    "until",
    "set",
    "resumptionToken",
];

/// The six OAI-PMH verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Identify,
    ListMetadataFormats,
    ListSets,
    ListIdentifiers,
    ListRecords,
    GetRecord,
}

impl Verb {
    /// Get the verb as it appears on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identify => "Identify",
            Self::ListMetadataFormats => "ListMetadataFormats",
            Self::ListSets => "ListSets",
            Self::ListIdentifiers => "ListIdentifiers",
            Self::ListRecords => "ListRecords",
            Self::GetRecord => "GetRecord",
        }
    }

    /// Parse a verb. Matching is case-sensitive, like the protocol.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Identify" => Some(Self::Identify),
            "ListMetadataFormats" => Some(Self::ListMetadataFormats),
            "ListSets" => Some(Self::ListSets),
            "ListIdentifiers" => Some(Self::ListIdentifiers),
            "ListRecords" => Some(Self::ListRecords),
            "GetRecord" => Some(Self::GetRecord),
            _ => None,
        }
    }

    /// Whether the verb disseminates records and therefore needs a
    /// `metadataPrefix`.
    #[must_use]
    pub fn requires_metadata_prefix(&self) -> bool {
        matches!(
            self,
            Self::ListIdentifiers | Self::ListRecords | Self::GetRecord
        )
    }
}

/// An incoming request: argument name to raw string value.
///
/// # Examples
/// ```
/// use oaipmh_provider::request::OaiRequest;
///
/// let request = OaiRequest::from_pairs([("verb", "ListRecords"), ("metadataPrefix", "")]);
/// assert_eq!(request.verb(), Some("ListRecords"));
/// assert_eq!(request.get("metadataPrefix"), Some(""));
/// assert_eq!(request.non_empty("metadataPrefix"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OaiRequest {
    params: BTreeMap<String, String>,
}

impl OaiRequest {
    /// Create an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from name/value pairs. Later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set an argument, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Get an argument as received, including empty values.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Get an argument, treating an empty value as absent.
    #[must_use]
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// The raw `verb` argument.
    #[must_use]
    pub fn verb(&self) -> Option<&str> {
        self.get("verb")
    }

    /// Iterate over all arguments in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The OAI-PMH arguments present in this request, in protocol order.
    pub fn oai_arguments(&self) -> impl Iterator<Item = (&str, &str)> {
        OAI_ARGUMENTS
            .iter()
            .filter_map(|name| self.get(name).map(|value| (*name, value)))
    }
}

/// Request arguments after successful validation.
///
/// `from` and `until` have been replaced by the instants they denote. All
/// other arguments are carried through as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    /// Raw verb. Unknown verbs survive validation and are rejected at dispatch.
    pub verb: Option<String>,
    /// Item identifier, for `GetRecord` and `ListMetadataFormats`.
    pub identifier: Option<String>,
    /// Requested format. Checked against the registry unless a resumption
    /// token is present.
    pub metadata_prefix: Option<String>,
    /// Lower bound of the datestamp range.
    pub from: Option<Timestamp>,
    /// Upper bound of the datestamp range, at midnight for day dates.
    pub until: Option<Timestamp>,
    /// Set spec to restrict the listing to.
    pub set: Option<String>,
    /// Opaque flow-control token issued by the record source.
    pub resumption_token: Option<String>,
    /// Non-OAI arguments, left for the record source to interpret.
    pub extra: BTreeMap<String, String>,
}

impl NormalizedRequest {
    /// The verb, if it is one of the six defined by the protocol.
    #[must_use]
    pub fn parsed_verb(&self) -> Option<Verb> {
        self.verb.as_deref().and_then(Verb::parse)
    }
}
