//! Registry of metadata formats the provider can disseminate.

/// Metadata prefix every OAI-PMH repository must support.
pub const DEFAULT_METADATA_PREFIX: &str = "oai_dc";

/// Immutable set of supported `metadataPrefix` values.
///
/// Never empty: constructing it from nothing (or only blank entries) yields
/// `{"oai_dc"}`. Membership is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFormatRegistry {
    prefixes: Vec<String>,
}

impl MetadataFormatRegistry {
    /// Build a registry from configured prefixes.
    ///
    /// Blank entries and duplicates are dropped; configuration order is kept.
    ///
    /// # Examples
    /// ```
    /// use oaipmh_provider::formats::MetadataFormatRegistry;
    ///
    /// let registry = MetadataFormatRegistry::new(Vec::<String>::new());
    /// assert!(registry.is_supported("oai_dc"));
    ///
    /// let registry = MetadataFormatRegistry::new(["marc21", "oai_dc"]);
    /// assert!(registry.is_supported("marc21"));
    /// assert!(!registry.is_supported("MARC21"));
    /// ```
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for prefix in prefixes {
            let prefix = prefix.into();
            if prefix.trim().is_empty() || unique.contains(&prefix) {
                continue;
            }
            unique.push(prefix);
        }

        if unique.is_empty() {
            unique.push(DEFAULT_METADATA_PREFIX.to_string());
        }

        Self { prefixes: unique }
    }

    /// Check whether a prefix is supported.
    #[must_use]
    pub fn is_supported(&self, prefix: &str) -> bool {
        self.prefixes.iter().any(|p| p == prefix)
    }

    /// Supported prefixes in configuration order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    /// Number of supported prefixes (at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether no prefix is registered. Never true after construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl Default for MetadataFormatRegistry {
    fn default() -> Self {
        Self::new([DEFAULT_METADATA_PREFIX])
    }
}
