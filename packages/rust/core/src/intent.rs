//! Decoding of the intent-extraction collaborator's JSON reply.
//!
//! Expected shape:
//!
//! ```json
//! {
//!   "keywords": ["jazz"],
//!   "location": "Girona",
//!   "date_range": { "start": "2025-08-16", "end": "2025-08-17" },
//!   "category": "música"
//! }
//! ```
//!
//! Any field may be missing or `null`. A reply that is not JSON at all
//! falls back to [`Intent::from_query`].

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use vilabot_shared::{DateRange, Intent};

#[derive(Debug, Default, Deserialize)]
struct RawIntent {
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    date_range: Option<RawDateRange>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDateRange {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

/// Build an [`Intent`] from the collaborator's reply for `query`.
pub fn parse_intent(raw: &str, query: &str) -> Intent {
    let parsed: RawIntent = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "intent reply is not valid JSON, splitting query into keywords");
            return Intent::from_query(query);
        }
    };

    let keywords = parsed
        .keywords
        .unwrap_or_default()
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    Intent {
        keywords,
        location: non_blank(parsed.location),
        date_range: parsed.date_range.and_then(parse_range),
        category: non_blank(parsed.category),
        original_query: Some(query.to_string()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

fn parse_range(raw: RawDateRange) -> Option<DateRange> {
    let start = parse_date(raw.start.as_deref()?)?;
    let end = parse_date(raw.end.as_deref()?)?;

    if end < start {
        debug!(%start, %end, "date range ends before it starts, ignoring");
        return None;
    }

    Some(DateRange { start, end })
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .inspect_err(|e| debug!(value, error = %e, "unparseable date in intent"))
        .ok()
}
