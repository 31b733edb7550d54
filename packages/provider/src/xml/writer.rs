//! Writer for the OAI-PMH response envelope.
//!
//! Every response has the same frame:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <OAI-PMH xmlns=... xsi:schemaLocation=...>
//!   <responseDate>2020-01-01T00:00:00Z</responseDate>
//!   <request verb="..." ...>base url</request>
//!   <!-- verb body, or <error code="...">message</error> -->
//! </OAI-PMH>
//! ```

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{ProtocolError, ProviderError, Result};
use crate::granularity::{Granularity, Timestamp};
use crate::request::OaiRequest;
use crate::source::OaiSet;

/// OAI-PMH 2.0 namespace.
pub const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";

/// XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Schema location of the OAI-PMH envelope.
pub const OAI_SCHEMA_LOCATION: &str =
    "http://www.openarchives.org/OAI/2.0/ http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd";

/// Unqualified Dublin Core container namespace.
pub const OAI_DC_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";

/// Schema location of `oai_dc`.
pub const OAI_DC_SCHEMA_LOCATION: &str =
    "http://www.openarchives.org/OAI/2.0/oai_dc/ http://www.openarchives.org/OAI/2.0/oai_dc.xsd";

/// Dublin Core element namespace.
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

/// Incremental writer for one response document.
pub struct ResponseWriter {
    writer: Writer<Vec<u8>>,
}

impl ResponseWriter {
    /// Start a document: declaration, root element, `responseDate` and
    /// `request`.
    ///
    /// # Arguments
    /// * `base_url` - Provider base URL, the content of `request`
    /// * `echo` - Arguments to echo as attributes of `request`
    /// * `response_date` - Time the response is generated
    pub fn begin<'a, I>(base_url: &str, echo: I, response_date: &Timestamp) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut this = Self {
            writer: Writer::new(Vec::new()),
        };

        this.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        this.emit(Event::Start(BytesStart::new("OAI-PMH").with_attributes([
            ("xmlns", OAI_NAMESPACE),
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:schemaLocation", OAI_SCHEMA_LOCATION),
        ])))?;
        this.text_element("responseDate", &Granularity::DateTime.format(response_date))?;

        this.start_with("request", echo)?;
        this.text(base_url)?;
        this.end("request")?;

        Ok(this)
    }

    /// Open an element without attributes.
    pub fn start(&mut self, name: &str) -> Result<()> {
        self.emit(Event::Start(BytesStart::new(name)))
    }

    /// Open an element with attributes.
    pub fn start_with<'a, I>(&mut self, name: &str, attributes: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let attributes: Vec<(&str, Cow<'_, str>)> = attributes
            .into_iter()
            .map(|(key, value)| (key, xml_safe(value)))
            .collect();
        let element = BytesStart::new(name)
            .with_attributes(attributes.iter().map(|(key, value)| (*key, value.as_ref())));
        self.emit(Event::Start(element))
    }

    /// Close an element.
    pub fn end(&mut self, name: &str) -> Result<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    /// Write `<name>text</name>`, escaping the text.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name)?;
        self.text(text)?;
        self.end(name)
    }

    /// Write escaped character data.
    pub fn text(&mut self, text: &str) -> Result<()> {
        self.emit(Event::Text(BytesText::new(&xml_safe(text))))
    }

    /// Close the root element and return the document.
    pub fn finish(mut self) -> Result<String> {
        self.end("OAI-PMH")?;
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| ProviderError::XmlWrite(e.to_string()))
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| ProviderError::XmlWrite(e.to_string()))
    }
}

/// Replace characters XML 1.0 does not allow with U+FFFD.
///
/// Escaping handles markup characters only; control characters such as
/// U+0000 or U+001B would still make the document malformed.
fn xml_safe(value: &str) -> Cow<'_, str> {
    if value.chars().all(is_xml_char) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(
            value
                .chars()
                .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
                .collect(),
        )
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Render a protocol error as a complete response document.
///
/// The request arguments are echoed unless the error code forbids it.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use oaipmh_provider::error::ProtocolError;
/// use oaipmh_provider::request::OaiRequest;
/// use oaipmh_provider::xml::error_document;
///
/// let request = OaiRequest::from_pairs([("verb", "ListRecords")]);
/// let error = ProtocolError::BadArgument("metadataPrefix not provided".to_string());
/// let xml = error_document("https://example.org/oai", &request, &error, &Utc::now()).unwrap();
/// assert!(xml.contains(r#"<error code="badArgument">metadataPrefix not provided</error>"#));
/// ```
pub fn error_document(
    base_url: &str,
    request: &OaiRequest,
    error: &ProtocolError,
    response_date: &Timestamp,
) -> Result<String> {
    let echo: Vec<(&str, &str)> = if error.suppresses_request_echo() {
        Vec::new()
    } else {
        request.oai_arguments().collect()
    };

    let mut doc = ResponseWriter::begin(base_url, echo, response_date)?;
    doc.start_with("error", [("code", error.code())])?;
    doc.text(error.message())?;
    doc.end("error")?;
    doc.finish()
}

/// Render a `ListSets` response.
pub fn list_sets_document(
    base_url: &str,
    request: &OaiRequest,
    sets: &[OaiSet],
    response_date: &Timestamp,
) -> Result<String> {
    let mut doc = ResponseWriter::begin(base_url, request.oai_arguments(), response_date)?;
    doc.start("ListSets")?;

    for set in sets {
        doc.start("set")?;
        doc.text_element("setSpec", &set.spec)?;
        doc.text_element("setName", &set.name)?;
        if let Some(description) = &set.description {
            doc.start("setDescription")?;
            doc.start_with(
                "oai_dc:dc",
                [
                    ("xmlns:oai_dc", OAI_DC_NAMESPACE),
                    ("xmlns:dc", DC_NAMESPACE),
                    ("xmlns:xsi", XSI_NAMESPACE),
                    ("xsi:schemaLocation", OAI_DC_SCHEMA_LOCATION),
                ],
            )?;
            doc.text_element("dc:description", description)?;
            doc.end("oai_dc:dc")?;
            doc.end("setDescription")?;
        }
        doc.end("set")?;
    }

    doc.end("ListSets")?;
    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    const BASE_URL: &str = "https://example.org/oai";

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_error_document_exact() {
        let request = OaiRequest::from_pairs([("verb", "GetRecord"), ("metadataPrefix", "mods")]);
        let error = ProtocolError::BadFormat("metadataPrefix not supported".to_string());
        let xml = error_document(BASE_URL, &request, &error, &now()).unwrap();

        let expected = concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
            r#"xsi:schemaLocation="http://www.openarchives.org/OAI/2.0/ http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd">"#,
            "<responseDate>2024-03-01T10:30:00Z</responseDate>",
            r#"<request verb="GetRecord" metadataPrefix="mods">https://example.org/oai</request>"#,
            r#"<error code="cannotDisseminateFormat">metadataPrefix not supported</error>"#,
            "</OAI-PMH>",
        );
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_bad_argument_does_not_echo() {
        let request = OaiRequest::from_pairs([("verb", "ListRecords"), ("from", "x")]);
        let error = ProtocolError::BadArgument("bad".to_string());
        let xml = error_document(BASE_URL, &request, &error, &now()).unwrap();
        assert!(xml.contains("<request>https://example.org/oai</request>"));
    }

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let request = OaiRequest::from_pairs([("verb", "GetRecord"), ("identifier", "a\"<b>")]);
        let error = ProtocolError::IdDoesNotExist("unknown <a&b>".to_string());
        let xml = error_document(BASE_URL, &request, &error, &now()).unwrap();
        assert!(xml.contains("unknown &lt;a&amp;b&gt;"));
        assert!(xml.contains(r#"identifier="a&quot;&lt;b&gt;""#));
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_xml_safe_replaces_illegal_characters() {
        assert_eq!(xml_safe("plain"), Cow::Borrowed("plain"));
        assert_eq!(xml_safe("tab\tok\r\n"), "tab\tok\r\n");
        assert_eq!(xml_safe("a\0b\u{1b}c\u{FFFE}"), "a\u{FFFD}b\u{FFFD}c\u{FFFD}");
    }

    #[test]
    fn test_control_characters_keep_document_well_formed() {
        let request = OaiRequest::from_pairs([("verb", "GetRecord"), ("identifier", "a\0b")]);
        let error = ProtocolError::IdDoesNotExist("unknown a\u{1}b".to_string());
        let xml = error_document(BASE_URL, &request, &error, &now()).unwrap();

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let request = doc
            .descendants()
            .find(|n| n.has_tag_name((OAI_NAMESPACE, "request")))
            .unwrap();
        assert_eq!(request.attribute("identifier"), Some("a\u{FFFD}b"));
        let error = doc
            .descendants()
            .find(|n| n.has_tag_name((OAI_NAMESPACE, "error")))
            .unwrap();
        assert_eq!(error.text(), Some("unknown a\u{FFFD}b"));
    }

    #[test]
    fn test_list_sets_document() {
        let request = OaiRequest::from_pairs([("verb", "ListSets")]);
        let sets = vec![
            OaiSet::new("subject:physics", "Physics"),
            OaiSet::new("subject:chemistry", "Chemistry").with_description("Wet lab"),
        ];
        let xml = list_sets_document(BASE_URL, &request, &sets, &now()).unwrap();
        assert!(xml.contains(
            "<set><setSpec>subject:physics</setSpec><setName>Physics</setName></set>"
        ));
        assert!(xml.contains("<dc:description>Wet lab</dc:description>"));

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let set_count = doc
            .descendants()
            .filter(|n| n.has_tag_name((OAI_NAMESPACE, "set")))
            .count();
        assert_eq!(set_count, 2);
    }

    #[test]
    fn test_list_sets_document_without_sets() {
        let request = OaiRequest::from_pairs([("verb", "ListSets")]);
        let xml = list_sets_document(BASE_URL, &request, &[], &now()).unwrap();
        assert!(xml.contains("<ListSets></ListSets>"));
    }
}
