//! Plain-text rendering of an aggregation for the response-synthesis step.
//!
//! The synthesizer receives the intent summary and the event digest as
//! prompt context; both are Catalan, matching the answers it writes.

use std::fmt::Write;

use vilabot_shared::{EventRecord, Intent};

/// Records beyond this are left out of the digest.
pub const DEFAULT_DIGEST_LIMIT: usize = 20;

/// Digest text when nothing matched.
pub const NO_EVENTS_MESSAGE: &str = "No s'han trobat esdeveniments que coincideixin amb la cerca.";

/// Render up to `limit` events as `Títol/Data/Lloc/Descripció/Font` blocks
/// separated by `---`.
pub fn render_digest(events: &[EventRecord], limit: usize) -> String {
    if events.is_empty() {
        return NO_EVENTS_MESSAGE.to_string();
    }

    let mut out = String::new();
    for event in events.iter().take(limit) {
        let _ = writeln!(out, "Títol: {}", event.title);
        let _ = writeln!(out, "Data: {}", field_or(&event.date, "Data no especificada"));
        let _ = writeln!(out, "Lloc: {}", field_or(&event.location, "Lloc no especificat"));
        let _ = writeln!(
            out,
            "Descripció: {}",
            field_or(&event.description, "Sense descripció")
        );
        let _ = writeln!(out, "Font: {}", field_or(&event.source_url, "No disponible"));
        out.push_str("---\n");
    }
    out
}

/// Summarize the extracted intent, including the fields filtering ignores.
pub fn render_intent(intent: &Intent) -> String {
    let keywords = if intent.keywords.is_empty() {
        "cap".to_string()
    } else {
        intent.keywords.join(", ")
    };
    let dates = intent
        .date_range
        .map(|r| format!("{} – {}", r.start.format("%Y-%m-%d"), r.end.format("%Y-%m-%d")))
        .unwrap_or_else(|| "No especificades".to_string());

    format!(
        "- Paraules clau: {keywords}\n- Ubicació: {}\n- Dates: {dates}\n- Categoria: {}\n",
        field_or(&intent.location, "No especificada"),
        field_or(&intent.category, "No especificada"),
    )
}

fn field_or<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or(placeholder)
}
