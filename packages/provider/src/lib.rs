//! OAI-PMH Provider - Request handling core of an OAI-PMH data provider.
//!
//! This crate validates incoming harvesting requests, negotiates metadata
//! formats and datestamp granularity, and produces well-formed OAI-PMH
//! responses, including error responses. Records themselves come from a
//! [`RecordSource`] supplied by the host application.
//!
//! # Example
//!
//! ```
//! use oaipmh_provider::{
//!     granularity, Granularity, MetadataFormatRegistry, OaiRequest, RequestValidator,
//! };
//!
//! assert_eq!(granularity::parse_date("2020-01-01").unwrap().granularity, Granularity::Date);
//!
//! let formats = MetadataFormatRegistry::default();
//! let request = OaiRequest::from_pairs([("verb", "ListRecords"), ("metadataPrefix", "oai_dc")]);
//! assert!(RequestValidator::new(&formats).validate("ListRecords", &request).is_ok());
//! ```
//!
//! # Architecture
//!
//! - [`granularity`]: Datestamp parsing and granularity
//! - [`formats`]: Supported metadata formats
//! - [`request`]: Verbs, raw and validated requests
//! - [`validator`]: Per-verb request validation
//! - [`config`]: Configuration and provider identity
//! - [`source`]: The record source collaborator
//! - [`xml`]: Response document writer
//! - [`sets`]: `ListSets` responses
//! - [`provider`]: The request entry point
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod formats;
pub mod granularity;
pub mod provider;
pub mod request;
pub mod sets;
pub mod source;
pub mod validator;
pub mod xml;

// Re-export commonly used items
pub use config::{
    DeletionSupport, DocumentConfig, HostContext, ProviderConfig, ProviderIdentity, Setting,
};
pub use error::{ProtocolError, ProviderError, Result};
pub use formats::MetadataFormatRegistry;
pub use granularity::{parse_date, Granularity, OaiDate, Timestamp};
pub use provider::Provider;
pub use request::{NormalizedRequest, OaiRequest, Verb};
pub use source::{OaiSet, RecordSource, SourceOptions};
pub use validator::RequestValidator;
