//! Aggregation pipeline and collaborator contracts for Vilabot.
//!
//! This crate ties the registry, fetcher, extractor and filters together
//! into one concurrent `aggregate` call, and defines the shapes exchanged
//! with the intent-extraction and response-synthesis collaborators.

pub mod aggregator;
pub mod demo;
pub mod digest;
pub mod intent;

pub use aggregator::{Aggregator, SourceError, dedup_by_title, scrape_source};
pub use demo::{DEFAULT_REGION, demo_events};
pub use digest::{DEFAULT_DIGEST_LIMIT, NO_EVENTS_MESSAGE, render_digest, render_intent};
pub use intent::parse_intent;
