//! Selector-driven event extraction.
//!
//! Each node matching `event_container` is one candidate record. Candidates
//! without a title are dropped. The six schema queries are compiled once per
//! document, before any candidate is visited.

use tracing::debug;
use url::Url;

use vilabot_shared::{EventRecord, ExtractionSchema, SourceDescriptor};

use crate::markup::{HtmlDocument, MarkupDocument, MarkupNode, ParseError};

/// Descriptions longer than this many characters are cut.
pub const DESCRIPTION_MAX_CHARS: usize = 300;

/// An [`ExtractionSchema`] with every selector compiled for one backend.
struct CompiledSchema<Q> {
    event_container: Q,
    title: Q,
    date: Q,
    location: Q,
    description: Q,
    link: Q,
}

impl<Q> CompiledSchema<Q> {
    fn compile<D: MarkupDocument<Query = Q>>(schema: &ExtractionSchema) -> Result<Self, ParseError> {
        Ok(Self {
            event_container: D::compile(&schema.event_container)?,
            title: D::compile(&schema.title)?,
            date: D::compile(&schema.date)?,
            location: D::compile(&schema.location)?,
            description: D::compile(&schema.description)?,
            link: D::compile(&schema.link)?,
        })
    }
}

/// Parse `markup` as HTML and extract the descriptor's events.
pub fn extract_html(
    markup: &str,
    descriptor: &SourceDescriptor,
) -> Result<Vec<EventRecord>, ParseError> {
    let doc = HtmlDocument::parse(markup);
    extract(
        &doc,
        &descriptor.extraction_schema,
        &descriptor.base_url,
        &descriptor.name,
    )
}

/// Extract event records from a parsed document, in document order.
///
/// Fails only when one of the schema's selectors does not compile.
pub fn extract<D: MarkupDocument>(
    doc: &D,
    schema: &ExtractionSchema,
    base_url: &str,
    source_name: &str,
) -> Result<Vec<EventRecord>, ParseError> {
    let compiled = CompiledSchema::<D::Query>::compile::<D>(schema)?;
    let containers = doc.select(&compiled.event_container);
    let mut events = Vec::with_capacity(containers.len());

    for (index, container) in containers.iter().enumerate() {
        match extract_candidate(container, &compiled, base_url, source_name) {
            Some(event) => events.push(event),
            None => debug!(source = source_name, index, "candidate has no title, skipping"),
        }
    }

    debug!(
        source = source_name,
        candidates = containers.len(),
        extracted = events.len(),
        "extraction finished"
    );

    Ok(events)
}

fn extract_candidate<N: MarkupNode>(
    container: &N,
    schema: &CompiledSchema<N::Query>,
    base_url: &str,
    source_name: &str,
) -> Option<EventRecord> {
    let title = field_text(container, &schema.title)?;

    let date = field_text(container, &schema.date);
    let location = field_text(container, &schema.location);
    let description = field_text(container, &schema.description).map(|d| truncate_chars(&d));

    let source_url = container
        .select_first(&schema.link)
        .and_then(|link| link.attribute("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .map(|href| resolve_link(base_url, &href));

    Some(EventRecord {
        title,
        date,
        location,
        description,
        source_url,
        source_name: source_name.to_string(),
    })
}

/// Text of the first match, or `None` when nothing matches or the text is empty.
fn field_text<N: MarkupNode>(container: &N, query: &N::Query) -> Option<String> {
    container
        .select_first(query)
        .map(|node| node.text())
        .filter(|text| !text.is_empty())
}

fn truncate_chars(text: &str) -> String {
    if text.chars().count() > DESCRIPTION_MAX_CHARS {
        text.chars().take(DESCRIPTION_MAX_CHARS).collect()
    } else {
        text.to_string()
    }
}

/// Resolve an `href` found on a page of `base_url`.
///
/// - absolute URLs pass through unchanged
/// - `//host/path` takes the base scheme
/// - `/path` is joined to the base origin
/// - anything else is appended to the base as a path segment
pub fn resolve_link(base_url: &str, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }

    let base = Url::parse(base_url).ok();

    if let Some(rest) = href.strip_prefix("//") {
        let scheme = base.as_ref().map_or("https", |b| b.scheme());
        return format!("{scheme}://{rest}");
    }

    if href.starts_with('/') {
        return match base {
            Some(base) if base.has_host() => {
                format!("{}{href}", base.origin().ascii_serialization())
            }
            _ => format!("{}{href}", base_url.trim_end_matches('/')),
        };
    }

    format!("{}/{href}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ExtractionSchema {
        ExtractionSchema {
            event_container: ".event".into(),
            title: ".title".into(),
            date: ".date".into(),
            location: ".place".into(),
            description: ".summary".into(),
            link: "a".into(),
        }
    }

    fn run(markup: &str) -> Vec<EventRecord> {
        let doc = HtmlDocument::parse(markup);
        extract(&doc, &schema(), "https://agenda.example.cat/ca/agenda", "Agenda").unwrap()
    }

    #[test]
    fn candidate_without_title_is_dropped() {
        let events = run(r#"
            <div class="event"><h2 class="title">Concert de Sant Jordi</h2></div>
            <div class="event"><span class="date">23 d'abril</span></div>
            <div class="event"><h2 class="title">Sardanes a la plaça</h2></div>
        "#);
        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Concert de Sant Jordi", "Sardanes a la plaça"]);
    }

    #[test]
    fn blank_title_counts_as_missing() {
        let events = run(r#"<div class="event"><h2 class="title">   </h2></div>"#);
        assert!(events.is_empty());
    }

    #[test]
    fn missing_optional_fields_are_absent() {
        let events = run(r#"<div class="event"><h2 class="title">Castellers</h2></div>"#);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.date, None);
        assert_eq!(event.location, None);
        assert_eq!(event.description, None);
        assert_eq!(event.source_url, None);
        assert_eq!(event.source_name, "Agenda");
    }

    #[test]
    fn description_is_capped_by_characters() {
        let long = "à".repeat(DESCRIPTION_MAX_CHARS + 50);
        let markup = format!(
            r#"<div class="event"><h2 class="title">Fira</h2><p class="summary">{long}</p></div>"#
        );
        let events = run(&markup);
        let description = events[0].description.as_ref().unwrap();
        assert_eq!(description.chars().count(), DESCRIPTION_MAX_CHARS);
    }

    #[test]
    fn invalid_field_selector_fails_before_any_candidate() {
        let mut broken = schema();
        broken.date = "span[".into();
        let doc = HtmlDocument::parse(
            r#"<div class="event"><h2 class="title">Fira</h2></div>"#,
        );
        let err = extract(&doc, &broken, "https://agenda.example.cat", "Agenda").unwrap_err();
        assert!(matches!(err, ParseError::InvalidSelector { ref selector, .. } if selector == "span["));
    }

    #[test]
    fn selectors_apply_to_every_container() {
        let events = run(r#"
            <div class="event"><h2 class="title">Fira</h2><span class="place">Vic</span><a href="/fira">+</a></div>
            <div class="event"><h2 class="title">Mercat</h2><span class="place">Olot</span><a href="mercat">+</a></div>
        "#);
        let places: Vec<Option<&str>> = events.iter().map(|e| e.location.as_deref()).collect();
        assert_eq!(places, vec![Some("Vic"), Some("Olot")]);
        assert_eq!(events[0].source_url.as_deref(), Some("https://agenda.example.cat/fira"));
        assert_eq!(
            events[1].source_url.as_deref(),
            Some("https://agenda.example.cat/ca/agenda/mercat")
        );
    }

    #[test]
    fn invalid_container_selector_fails() {
        let mut broken = schema();
        broken.event_container = "::".into();
        let doc = HtmlDocument::parse("<div></div>");
        assert!(extract(&doc, &broken, "https://agenda.example.cat", "Agenda").is_err());
    }

    #[test]
    fn resolve_absolute_link_unchanged() {
        assert_eq!(
            resolve_link("https://agenda.example.cat", "https://other.cat/e/1"),
            "https://other.cat/e/1"
        );
    }

    #[test]
    fn resolve_root_relative_link_against_origin() {
        assert_eq!(
            resolve_link("https://www.barcelona.cat/barcelonacultura", "/ca/agenda/123"),
            "https://www.barcelona.cat/ca/agenda/123"
        );
        assert_eq!(
            resolve_link("http://127.0.0.1:8080/base/", "/e/1"),
            "http://127.0.0.1:8080/e/1"
        );
    }

    #[test]
    fn resolve_relative_link_as_segment() {
        assert_eq!(
            resolve_link("https://agenda.example.cat/ca/", "esdeveniment/42"),
            "https://agenda.example.cat/ca/esdeveniment/42"
        );
    }

    #[test]
    fn resolve_protocol_relative_link() {
        assert_eq!(
            resolve_link("http://agenda.example.cat", "//cdn.example.cat/e.html"),
            "http://cdn.example.cat/e.html"
        );
    }
}
