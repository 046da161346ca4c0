//! Post-extraction filters.
//!
//! Upstream search pages are imprecise, so extracted records are narrowed
//! again by keyword and location. Matching is case-insensitive substring
//! containment, never tokenized.

use vilabot_shared::{EventRecord, Intent};

/// Keep records where at least one keyword occurs in title, description or location.
/// An empty keyword list keeps everything.
pub fn filter_by_keywords(events: Vec<EventRecord>, keywords: &[String]) -> Vec<EventRecord> {
    if keywords.is_empty() {
        return events;
    }

    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    events
        .into_iter()
        .filter(|event| {
            let haystack = [
                event.title.as_str(),
                event.description.as_deref().unwrap_or(""),
                event.location.as_deref().unwrap_or(""),
            ]
            .join(" ")
            .to_lowercase();
            keywords.iter().any(|k| haystack.contains(k.as_str()))
        })
        .collect()
}

/// Keep records whose title, description or location mentions `location`.
/// `None` or a blank string keeps everything.
pub fn filter_by_location(events: Vec<EventRecord>, location: Option<&str>) -> Vec<EventRecord> {
    let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) else {
        return events;
    };

    let needle = location.to_lowercase();

    events
        .into_iter()
        .filter(|event| {
            [
                event.location.as_deref(),
                Some(event.title.as_str()),
                event.description.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Keyword filter followed by location filter.
pub fn apply_intent(events: Vec<EventRecord>, intent: &Intent) -> Vec<EventRecord> {
    let events = filter_by_keywords(events, &intent.keywords);
    filter_by_location(events, intent.location_constraint())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(title: &str, location: Option<&str>, description: Option<&str>) -> EventRecord {
        EventRecord {
            title: title.into(),
            date: None,
            location: location.map(String::from),
            description: description.map(String::from),
            source_url: None,
            source_name: "Test".into(),
        }
    }

    fn sample() -> Vec<EventRecord> {
        vec![
            event("Nit de JAZZ", Some("Girona"), None),
            event("Fira del llibre", Some("Barcelona"), Some("Llibres i autors")),
            event("Mercat de Nadal", None, Some("Parades a Girona centre")),
        ]
    }

    #[test]
    fn empty_keywords_is_noop() {
        assert_eq!(filter_by_keywords(sample(), &[]), sample());
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        let kept = filter_by_keywords(sample(), &["jazz".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Nit de JAZZ");

        let kept = filter_by_keywords(sample(), &["LLIB".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Fira del llibre");
    }

    #[test]
    fn any_keyword_is_enough() {
        let kept = filter_by_keywords(sample(), &["opera".to_string(), "nadal".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Mercat de Nadal");
    }

    #[test]
    fn keyword_can_match_location_field() {
        let kept = filter_by_keywords(sample(), &["barcelona".to_string()]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn absent_or_empty_location_is_noop() {
        assert_eq!(filter_by_location(sample(), None), sample());
        assert_eq!(filter_by_location(sample(), Some("")), sample());
        assert_eq!(filter_by_location(sample(), Some("   ")), sample());
    }

    #[test]
    fn whitespace_location_in_intent_keeps_everything() {
        let intent = Intent {
            location: Some("  ".into()),
            ..Intent::default()
        };
        assert_eq!(apply_intent(sample(), &intent), sample());
    }

    #[test]
    fn location_matches_any_text_field() {
        let kept = filter_by_location(sample(), Some("GIRONA"));
        let titles: Vec<&str> = kept.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Nit de JAZZ", "Mercat de Nadal"]);
    }

    #[test]
    fn filters_compose_conjunctively() {
        let intent = Intent {
            keywords: vec!["fira".into(), "mercat".into()],
            location: Some("girona".into()),
            ..Intent::default()
        };
        let kept = apply_intent(sample(), &intent);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Mercat de Nadal");
    }
}
