//! Shared types, error model, and configuration for Vilabot.
//!
//! This crate is the foundation depended on by all other Vilabot crates.
//! It provides:
//! - [`VilabotError`]: the unified error type
//! - Domain types ([`Intent`], [`SourceDescriptor`], [`EventRecord`], [`AggregationResult`])
//! - Configuration ([`AppConfig`], [`HttpConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_USER_AGENT, HttpConfig, config_dir, config_file_path, default_sources,
    init_config, load_config, load_config_from, render_config,
};
pub use error::{Result, VilabotError};
pub use types::{
    AggregationResult, DateRange, EventRecord, ExtractionSchema, Intent, SourceDescriptor,
    SourceKind,
};
