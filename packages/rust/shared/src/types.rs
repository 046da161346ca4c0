//! Core domain types: search intent, source descriptors, and event records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// Inclusive calendar date range requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Structured interpretation of a free-text query.
///
/// Absent optional fields mean "no constraint". `date_range` and `category`
/// are carried through to response synthesis but never applied as filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Search terms. Order is kept for display only.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Free-text location (city, town, district, comarca).
    #[serde(default)]
    pub location: Option<String>,
    /// Requested date window.
    #[serde(default)]
    pub date_range: Option<DateRange>,
    /// Free-text category label (música, teatre, familiar, ...).
    #[serde(default)]
    pub category: Option<String>,
    /// The query this intent was extracted from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_query: Option<String>,
}

impl Intent {
    /// Fallback intent: every whitespace-separated word becomes a keyword.
    pub fn from_query(query: &str) -> Self {
        Self {
            keywords: query.split_whitespace().map(String::from).collect(),
            original_query: Some(query.to_string()),
            ..Self::default()
        }
    }

    /// The trimmed location constraint, treating a blank string as absent.
    pub fn location_constraint(&self) -> Option<&str> {
        self.location.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}

// ---------------------------------------------------------------------------
// SourceDescriptor
// ---------------------------------------------------------------------------

/// How a source is fetched and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Static HTML page queried with CSS selectors.
    #[default]
    Html,
    /// JSON endpoint. Reserved: there is no fetch path for it yet.
    Api,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => f.write_str("html"),
            Self::Api => f.write_str("api"),
        }
    }
}

/// Named selectors used to pull event fields out of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSchema {
    #[serde(default)]
    pub event_container: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
}

impl ExtractionSchema {
    /// `(field name, selector)` pairs in declaration order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("event_container", &self.event_container),
            ("title", &self.title),
            ("date", &self.date),
            ("location", &self.location),
            ("description", &self.description),
            ("link", &self.link),
        ]
    }
}

/// Static description of one external event provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Human-readable provider name, copied onto every record it yields.
    pub name: String,
    /// Root URL, used for relative link resolution and as the fallback request URL.
    #[serde(rename = "url")]
    pub base_url: String,
    /// Fetch/parse strategy.
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
    /// Search URL containing a single `{keywords}` placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
    /// Selector mapping.
    #[serde(rename = "selectors", default)]
    pub extraction_schema: ExtractionSchema,
    /// Disabled descriptors are skipped entirely.
    #[serde(default)]
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

/// One event pulled out of a source (or produced as demo data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Absolute link to the event page.
    pub source_url: Option<String>,
    pub source_name: String,
}

impl EventRecord {
    /// Deduplication key: lowercased, trimmed title.
    pub fn normalized_title(&self) -> String {
        self.title.trim().to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// AggregationResult
// ---------------------------------------------------------------------------

/// Outcome of one aggregate call, handed to response synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Deduplicated, filtered records in source-list order.
    #[serde(rename = "content")]
    pub events: Vec<EventRecord>,
    /// Enabled descriptors considered (0 when demo data was served).
    #[serde(rename = "sources_scraped")]
    pub sources_attempted: usize,
    /// Always `events.len()`.
    pub events_found: usize,
}

impl AggregationResult {
    /// Build a result, deriving `events_found` from the record count.
    pub fn new(events: Vec<EventRecord>, sources_attempted: usize) -> Self {
        let events_found = events.len();
        Self {
            events,
            sources_attempted,
            events_found,
        }
    }
}
