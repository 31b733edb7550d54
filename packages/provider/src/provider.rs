//! The provider: entry point for every OAI-PMH request.

use chrono::Utc;

use crate::config::{HostContext, ProviderConfig, ProviderIdentity};
use crate::error::{ProtocolError, ProviderError, Result};
use crate::formats::MetadataFormatRegistry;
use crate::request::{OaiRequest, Verb};
use crate::sets::SetListingResponder;
use crate::source::{RecordSource, SourceOptions};
use crate::validator::RequestValidator;
use crate::xml::error_document;

/// An OAI-PMH data provider over a record source.
///
/// Identity and supported formats are fixed at construction; requests share
/// no mutable state, so one provider can serve any number of threads.
pub struct Provider<S> {
    identity: ProviderIdentity,
    formats: MetadataFormatRegistry,
    source: S,
}

impl<S: RecordSource> Provider<S> {
    /// Build a provider.
    ///
    /// Resolves the configuration against the host (name and URL default to
    /// the host's), fixes the supported formats (default `oai_dc`), and
    /// creates the record source with the resolved granularity.
    ///
    /// # Arguments
    /// * `config` - Provider configuration
    /// * `host` - The hosting application
    /// * `make_source` - Builds the record source from its options
    pub fn new<F>(config: &ProviderConfig, host: &dyn HostContext, make_source: F) -> Result<Self>
    where
        F: FnOnce(SourceOptions) -> S,
    {
        let identity = config.resolve(host)?;
        let formats = config.format_registry();
        let source = make_source(SourceOptions::new(&config.document, identity.granularity));

        tracing::debug!(
            formats = ?formats.prefixes().collect::<Vec<_>>(),
            "Provider ready"
        );

        Ok(Self {
            identity,
            formats,
            source,
        })
    }

    /// The resolved provider identity.
    pub fn identity(&self) -> &ProviderIdentity {
        &self.identity
    }

    /// The supported metadata formats.
    pub fn formats(&self) -> &MetadataFormatRegistry {
        &self.formats
    }

    /// The record source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Handle one request.
    ///
    /// Protocol errors, whether found by validation or reported by the
    /// record source, become `<error>` documents and are returned as `Ok`.
    /// Only failures outside the protocol are returned as `Err`.
    pub fn process_request(&self, request: &OaiRequest) -> Result<String> {
        let verb = request.verb().unwrap_or_default();

        let normalized = match RequestValidator::new(&self.formats).validate(verb, request) {
            Ok(normalized) => normalized,
            Err(error) => return self.error_response(request, &error),
        };

        match normalized.parsed_verb() {
            Some(Verb::ListSets) => {
                SetListingResponder::new(&self.identity, &self.source).list_sets(request, &normalized)
            }
            Some(verb) => {
                tracing::debug!(verb = verb.as_str(), "Forwarding to record source");
                match self.source.respond(&self.identity, &normalized) {
                    Ok(xml) => Ok(xml),
                    Err(ProviderError::Protocol(error)) => self.error_response(request, &error),
                    Err(e) => {
                        tracing::error!(error = %e, verb = verb.as_str(), "Record source failed");
                        Err(e)
                    }
                }
            }
            None if verb.is_empty() => self.error_response(
                request,
                &ProtocolError::BadVerb("Missing verb argument".to_string()),
            ),
            None => self.error_response(
                request,
                &ProtocolError::BadVerb(format!("Illegal verb: {verb}")),
            ),
        }
    }

    /// Handle a `ListSets` request given only its options.
    ///
    /// The `verb` argument is always set to `ListSets`, replacing any verb
    /// the options carry.
    pub fn list_sets(&self, options: &OaiRequest) -> Result<String> {
        let request = options.clone().with("verb", Verb::ListSets.as_str());

        match RequestValidator::new(&self.formats).validate(Verb::ListSets.as_str(), &request) {
            Ok(normalized) => SetListingResponder::new(&self.identity, &self.source)
                .list_sets(&request, &normalized),
            Err(error) => self.error_response(&request, &error),
        }
    }

    fn error_response(&self, request: &OaiRequest, error: &ProtocolError) -> Result<String> {
        tracing::info!(
            code = error.code(),
            verb = request.verb().unwrap_or_default(),
            message = error.message(),
            "Rejected OAI-PMH request"
        );
        error_document(&self.identity.url, request, error, &Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::NormalizedRequest;
    use crate::source::OaiSet;

    struct Host;

    impl HostContext for Host {
        fn application_name(&self) -> String {
            "Host".to_string()
        }

        fn catalog_url(&self) -> String {
            "http://localhost/catalog/oai".to_string()
        }
    }

    /// Echoes the verb so tests can see what was forwarded.
    struct EchoSource {
        options: SourceOptions,
    }

    impl RecordSource for EchoSource {
        fn respond(&self, _: &ProviderIdentity, request: &NormalizedRequest) -> Result<String> {
            Ok(format!("<forwarded verb=\"{}\"/>", request.verb.as_deref().unwrap_or("")))
        }

        fn sets(&self, _: &NormalizedRequest) -> Result<Vec<OaiSet>> {
            Ok(vec![OaiSet::new("all", "Everything")])
        }
    }

    fn provider(config: &ProviderConfig) -> Provider<EchoSource> {
        Provider::new(config, &Host, |options| EchoSource { options }).unwrap()
    }

    #[test]
    fn test_source_gets_provider_granularity() {
        let config = ProviderConfig::from_yaml_str(
            "granularity: YYYY-MM-DD\ndocument:\n  limit: 10\n",
        )
        .unwrap();
        let provider = provider(&config);
        assert_eq!(
            provider.source().options.granularity,
            crate::granularity::Granularity::Date
        );
        assert_eq!(provider.source().options.limit, Some(10));
    }

    #[test]
    fn test_default_formats() {
        let provider = provider(&ProviderConfig::default());
        assert_eq!(provider.formats().prefixes().collect::<Vec<_>>(), vec!["oai_dc"]);
        assert_eq!(provider.identity().url, "http://localhost/catalog/oai");
    }

    #[test]
    fn test_valid_request_is_forwarded_verbatim() {
        let provider = provider(&ProviderConfig::default());
        let request = OaiRequest::new()
            .with("verb", "ListRecords")
            .with("metadataPrefix", "oai_dc");
        assert_eq!(
            provider.process_request(&request).unwrap(),
            "<forwarded verb=\"ListRecords\"/>"
        );
    }

    #[test]
    fn test_invalid_request_becomes_error_document() {
        let provider = provider(&ProviderConfig::default());
        let request = OaiRequest::new().with("verb", "GetRecord");
        let xml = provider.process_request(&request).unwrap();
        assert!(xml.contains(r#"<error code="badArgument">metadataPrefix not provided</error>"#));
    }

    #[test]
    fn test_list_sets_bypasses_source_respond() {
        let provider = provider(&ProviderConfig::default());
        let xml = provider
            .process_request(&OaiRequest::new().with("verb", "ListSets"))
            .unwrap();
        assert!(xml.contains("<setSpec>all</setSpec>"));
        assert!(!xml.contains("forwarded"));
    }

    #[test]
    fn test_direct_list_sets_sets_verb() {
        let provider = provider(&ProviderConfig::default());
        let xml = provider.list_sets(&OaiRequest::new()).unwrap();
        assert!(xml.contains(r#"<request verb="ListSets">"#));
        assert!(xml.contains("<ListSets>"));

        let xml = provider
            .list_sets(&OaiRequest::new().with("verb", "GetRecord"))
            .unwrap();
        assert!(xml.contains(r#"<request verb="ListSets">"#));
        assert!(!xml.contains("GetRecord"));
        assert!(xml.contains("<setSpec>all</setSpec>"));
    }

    #[test]
    fn test_missing_and_unknown_verb() {
        let provider = provider(&ProviderConfig::default());

        let xml = provider.process_request(&OaiRequest::new()).unwrap();
        assert!(xml.contains(r#"<error code="badVerb">Missing verb argument</error>"#));

        let xml = provider
            .process_request(&OaiRequest::new().with("verb", "Frobnicate"))
            .unwrap();
        assert!(xml.contains(r#"<error code="badVerb">Illegal verb: Frobnicate</error>"#));
    }

    #[test]
    fn test_argument_errors_take_precedence_over_bad_verb() {
        let provider = provider(&ProviderConfig::default());
        let request = OaiRequest::new()
            .with("verb", "Frobnicate")
            .with("from", "2020-01-01")
            .with("until", "2020-01-01T00:00:00Z");
        let xml = provider.process_request(&request).unwrap();
        assert!(xml.contains(r#"<error code="badArgument">"#));
    }
}
