//! Fixed demo events, served when no source is enabled.
//!
//! Output depends only on the intent: three baseline events templated with
//! the location, plus a concert and/or a children's event when certain
//! keywords are present.

use vilabot_shared::{EventRecord, Intent};

/// Location used when the intent has none.
pub const DEFAULT_REGION: &str = "Catalunya";

const DEMO_SOURCE: &str = "Demo";

/// Exact keywords (case-sensitive) that add the concert event.
const MUSIC_KEYWORDS: [&str; 3] = ["música", "concert", "jazz"];

/// Exact keywords (case-sensitive) that add the children's event.
const FAMILY_KEYWORDS: [&str; 4] = ["nens", "familiar", "infantil", "família"];

/// Demo dataset for `intent`: `[family?, jazz?, festival, market, tapas route]`.
pub fn demo_events(intent: &Intent) -> Vec<EventRecord> {
    let location = intent.location_constraint().unwrap_or(DEFAULT_REGION);

    let mut events = Vec::with_capacity(5);

    if has_any(&intent.keywords, &FAMILY_KEYWORDS) {
        events.push(demo(
            "Taller de Circ per a Nens",
            "Diumenge 24 d'agost, 11:00h",
            format!("Centre Cívic de {location}"),
            "Activitat gratuïta per a nens de 4 a 12 anys. Aprenen malabars, equilibri i molt més!",
            "https://example.com/circ",
        ));
    }

    if has_any(&intent.keywords, &MUSIC_KEYWORDS) {
        events.push(demo(
            "Festival de Jazz al Carrer",
            "22 d'agost de 2025, 21:00h",
            format!("Parc Central, {location}"),
            "Concert gratuït amb les millors bandes de jazz de Catalunya. Porta la teva manta i gaudeix sota les estrelles.",
            "https://example.com/jazz",
        ));
    }

    events.push(demo(
        &format!("Festa Major de {location}"),
        "15-18 d'agost de 2025",
        location.to_string(),
        "Quatre dies de festa amb concerts, correfocs, gegants i activitats per a tota la família. No et perdis el castell de focs artificials!",
        "https://example.com/festa-major",
    ));
    events.push(demo(
        "Mercat d'Artesania Local",
        "Cada dissabte",
        format!("Plaça Major, {location}"),
        "Descobreix productes artesanals de la zona: ceràmica, teixits, productes d'alimentació i molt més.",
        "https://example.com/mercat",
    ));
    events.push(demo(
        "Ruta de Tapes Gastronòmiques",
        "Del 20 al 27 d'agost",
        format!("Diversos restaurants de {location}"),
        "Gaudeix de les millors tapes dels restaurants locals amb una experiència culinària única.",
        "https://example.com/tapes",
    ));

    events
}

fn has_any(keywords: &[String], triggers: &[&str]) -> bool {
    keywords.iter().any(|k| triggers.contains(&k.as_str()))
}

fn demo(title: &str, date: &str, location: String, description: &str, url: &str) -> EventRecord {
    EventRecord {
        title: title.to_string(),
        date: Some(date.to_string()),
        location: Some(location),
        description: Some(description.to_string()),
        source_url: Some(url.to_string()),
        source_name: DEMO_SOURCE.to_string(),
    }
}
