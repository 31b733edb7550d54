//! OAI-PMH response documents.

mod writer;

pub use writer::{
    error_document, list_sets_document, ResponseWriter, DC_NAMESPACE, OAI_DC_NAMESPACE,
    OAI_DC_SCHEMA_LOCATION, OAI_NAMESPACE, OAI_SCHEMA_LOCATION, XSI_NAMESPACE,
};
