//! Source registry, fetching, extraction, and filtering of event listings.
//!
//! This crate provides:
//! - [`registry`]: validated source descriptors and request URL construction
//! - [`fetcher`]: single-shot HTTP GET with a fixed identity and timeout
//! - [`markup`]: the [`MarkupDocument`] query capability (scraper-backed)
//! - [`extractor`]: selector-driven [`EventRecord`](vilabot_shared::EventRecord) extraction
//! - [`filter`]: keyword and location filters

pub mod extractor;
pub mod fetcher;
pub mod filter;
pub mod markup;
pub mod registry;

pub use extractor::{DESCRIPTION_MAX_CHARS, extract, extract_html, resolve_link};
pub use fetcher::{FetchError, Fetcher};
pub use filter::{apply_intent, filter_by_keywords, filter_by_location};
pub use markup::{HtmlDocument, HtmlNode, MarkupDocument, MarkupNode, ParseError};
pub use registry::{KEYWORDS_PLACEHOLDER, SourceRegistry, request_url, validate_descriptor};

#[cfg(test)]
mod tests {
    use super::*;
    use vilabot_shared::{ExtractionSchema, SourceDescriptor, SourceKind};

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn gencat() -> SourceDescriptor {
        SourceDescriptor {
            name: "Agenda Cultural Gencat".into(),
            base_url: "https://agenda.cultura.gencat.cat/ca".into(),
            kind: SourceKind::Html,
            search_url: None,
            extraction_schema: ExtractionSchema {
                event_container: ".event-item".into(),
                title: ".event-title".into(),
                date: ".event-date".into(),
                location: ".event-location".into(),
                description: ".event-description".into(),
                link: "a".into(),
            },
            enabled: true,
        }
    }

    fn festa() -> SourceDescriptor {
        SourceDescriptor {
            name: "Festa Catalunya".into(),
            base_url: "https://www.festacatalunya.cat".into(),
            kind: SourceKind::Html,
            search_url: None,
            extraction_schema: ExtractionSchema {
                event_container: "article".into(),
                title: ".entry-title".into(),
                date: ".event-date".into(),
                location: ".event-location".into(),
                description: ".entry-summary".into(),
                link: "a".into(),
            },
            enabled: true,
        }
    }

    // -----------------------------------------------------------------------
    // Fixture extraction tests
    // -----------------------------------------------------------------------

    #[test]
    fn agenda_fixture_skips_untitled_container() {
        let events = extract_html(&load_fixture("agenda.html"), &gencat()).unwrap();

        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Festival de Jazz de Girona", "Mercat de Sant Ponç"]
        );
        assert!(events.iter().all(|e| e.source_name == "Agenda Cultural Gencat"));
    }

    #[test]
    fn agenda_fixture_resolves_links() {
        let events = extract_html(&load_fixture("agenda.html"), &gencat()).unwrap();

        assert_eq!(
            events[0].source_url.as_deref(),
            Some("https://agenda.cultura.gencat.cat/ca/esdeveniments/jazz-girona")
        );
        assert_eq!(
            events[1].source_url.as_deref(),
            Some("https://agenda.cultura.gencat.cat/ca/sant-ponc")
        );
    }

    #[test]
    fn agenda_fixture_fields() {
        let events = extract_html(&load_fixture("agenda.html"), &gencat()).unwrap();
        let jazz = &events[0];

        assert_eq!(jazz.date.as_deref(), Some("12 de juliol de 2025"));
        assert_eq!(jazz.location.as_deref(), Some("Plaça de la Independència, Girona"));
        let description = jazz.description.as_deref().unwrap();
        assert_eq!(description.chars().count(), DESCRIPTION_MAX_CHARS);
        assert!(description.starts_with("Tres nits de jazz"));
    }

    #[test]
    fn wordpress_fixture_with_duplicates() {
        let events = extract_html(&load_fixture("festa.html"), &festa()).unwrap();

        assert_eq!(events.len(), 5);
        assert_eq!(
            events[0].source_url.as_deref(),
            Some("https://www.festacatalunya.cat/festa-major-gracia")
        );
        // Absolute links are kept as-is
        assert_eq!(
            events[4].source_url.as_deref(),
            Some("https://www.tarragona.cat/santa-tecla")
        );
    }

    #[test]
    fn fixture_then_filters() {
        let events = extract_html(&load_fixture("festa.html"), &festa()).unwrap();
        let kept = filter_by_location(events, Some("tarragona"));
        let titles: Vec<&str> = kept.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Santa Tecla"]);
    }
}
