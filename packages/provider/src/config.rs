//! Provider configuration and its resolution into a `ProviderIdentity`.
//!
//! Configuration is read once, when a provider is built. Values may be
//! literals (typically from a YAML file) or resolvers that ask the host
//! application, e.g. for its name or its OAI endpoint URL.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ProviderError, Result};
use crate::formats::MetadataFormatRegistry;
use crate::granularity::Granularity;

/// Record identifier prefix used when none is configured.
pub const DEFAULT_RECORD_PREFIX: &str = "oai:localhost";

/// Administrator address used when none is configured.
pub const DEFAULT_ADMIN_EMAIL: &str = "nobody@localhost";

/// The application hosting the provider.
///
/// Supplies defaults for settings the configuration leaves open.
pub trait HostContext {
    /// Human-readable name of the application.
    fn application_name(&self) -> String;

    /// Absolute URL of the OAI-PMH endpoint.
    fn catalog_url(&self) -> String;
}

type Resolver<T> = Arc<dyn Fn(&dyn HostContext) -> T + Send + Sync>;

/// A configuration value: a literal, or a function of the host context
/// evaluated once at construction.
#[derive(Clone)]
pub enum Setting<T> {
    Literal(T),
    Resolve(Resolver<T>),
}

impl<T> Setting<T> {
    /// Wrap a resolver function.
    pub fn resolve_with<F>(f: F) -> Self
    where
        F: Fn(&dyn HostContext) -> T + Send + Sync + 'static,
    {
        Self::Resolve(Arc::new(f))
    }
}

impl<T: Clone> Setting<T> {
    /// Produce the value.
    pub fn value(&self, host: &dyn HostContext) -> T {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Resolve(f) => f(host),
        }
    }
}

impl<T> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for Setting<String> {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl<T: fmt::Debug> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Resolve(_) => f.write_str("Resolve(..)"),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Setting<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Literal)
    }
}

/// How the repository reports deleted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionSupport {
    /// Deletions are not tracked.
    #[default]
    No,

    /// Deletions are tracked, but not guaranteed to persist.
    Transient,

    /// Deletions are tracked indefinitely.
    Persistent,
}

impl DeletionSupport {
    /// Get the value used in `Identify` responses.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Transient => "transient",
            Self::Persistent => "persistent",
        }
    }
}

/// Provider settings as configured.
///
/// Keys use the short instance names; the long repository-level names are
/// accepted as aliases. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Repository name. Falls back to the host application name.
    #[serde(alias = "repository_name")]
    pub name: Option<Setting<String>>,

    /// Base URL of the endpoint. Falls back to the host catalog URL.
    #[serde(alias = "repository_url")]
    pub url: Option<Setting<String>>,

    /// Prefix for record identifiers.
    #[serde(alias = "record_prefix")]
    pub prefix: Option<Setting<String>>,

    /// Administrator e-mail address.
    #[serde(alias = "admin_email")]
    pub email: Option<Setting<String>>,

    #[serde(alias = "deletion_support")]
    pub delete_support: Option<DeletionSupport>,

    /// Datestamp granularity the repository supports.
    #[serde(alias = "update_granularity")]
    pub granularity: Option<Granularity>,

    /// Example identifier for `Identify`.
    #[serde(alias = "sample_id")]
    pub identifier: Option<Setting<String>>,

    /// Free-form repository description.
    #[serde(alias = "extra_description")]
    pub description: Option<Setting<String>>,

    /// Settings handed to the record source.
    pub document: DocumentConfig,
}

/// Settings for the record source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Supported metadata prefixes. Empty means `["oai_dc"]`.
    pub supported_formats: Vec<String>,

    /// Page size for list responses.
    pub limit: Option<usize>,

    /// Index field holding the record datestamp.
    pub timestamp_field: Option<String>,
}

impl ProviderConfig {
    /// Parse configuration from YAML text.
    ///
    /// # Examples
    /// ```
    /// use oaipmh_provider::config::ProviderConfig;
    ///
    /// let config = ProviderConfig::from_yaml_str("repository_name: Test\n").unwrap();
    /// assert!(config.name.is_some());
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml).map_err(|e| match e {
            ProviderError::Yaml(err) => {
                ProviderError::InvalidConfig(format!("{}: {err}", path.display()))
            }
            other => other,
        })
    }

    /// Build the format registry. Never empty.
    #[must_use]
    pub fn format_registry(&self) -> MetadataFormatRegistry {
        MetadataFormatRegistry::new(self.document.supported_formats.iter().cloned())
    }

    /// Resolve every setting against the host, applying defaults.
    pub fn resolve(&self, host: &dyn HostContext) -> Result<ProviderIdentity> {
        let name = match &self.name {
            Some(setting) => setting.value(host),
            None => host.application_name(),
        };
        let url = match &self.url {
            Some(setting) => setting.value(host),
            None => host.catalog_url(),
        };

        if url.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "repository URL is empty".to_string(),
            ));
        }

        let identity = ProviderIdentity {
            name,
            url,
            record_prefix: resolve_or(&self.prefix, host, DEFAULT_RECORD_PREFIX),
            admin_email: resolve_or(&self.email, host, DEFAULT_ADMIN_EMAIL),
            deletion_support: self.delete_support.unwrap_or_default(),
            granularity: self.granularity.unwrap_or_default(),
            sample_identifier: self.identifier.as_ref().map(|s| s.value(host)),
            description: self.description.as_ref().map(|s| s.value(host)),
        };

        tracing::debug!(
            name = %identity.name,
            url = %identity.url,
            granularity = %identity.granularity,
            "Resolved provider identity"
        );

        Ok(identity)
    }
}

fn resolve_or(setting: &Option<Setting<String>>, host: &dyn HostContext, default: &str) -> String {
    setting
        .as_ref()
        .map_or_else(|| default.to_string(), |s| s.value(host))
}

/// Resolved, read-only identity of a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub name: String,
    /// Base URL, echoed in every response.
    pub url: String,
    pub record_prefix: String,
    pub admin_email: String,
    pub deletion_support: DeletionSupport,
    pub granularity: Granularity,
    pub sample_identifier: Option<String>,
    pub description: Option<String>,
}
