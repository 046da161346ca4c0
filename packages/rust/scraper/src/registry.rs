//! Validated, read-only collection of source descriptors.
//!
//! Validation happens once at startup: a malformed enabled descriptor is a
//! validation error at startup, never a per-request failure.

use url::Url;
use url::form_urlencoded::byte_serialize;

use vilabot_shared::{AppConfig, Result, SourceDescriptor, SourceKind, VilabotError};

use crate::markup::compile_selector;

/// Placeholder substituted with the keyword string in `search_url`.
pub const KEYWORDS_PLACEHOLDER: &str = "{keywords}";

/// Source descriptors in registry order.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    /// Validate every enabled descriptor and build the registry.
    pub fn new(sources: Vec<SourceDescriptor>) -> Result<Self> {
        for descriptor in sources.iter().filter(|s| s.enabled) {
            validate_descriptor(descriptor)?;
        }
        Ok(Self { sources })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.sources.clone())
    }

    pub fn all(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    /// Enabled descriptors, in registry order.
    pub fn enabled(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.iter().filter(|s| s.enabled)
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled().count()
    }
}

/// Check that an enabled descriptor can actually be fetched and extracted.
pub fn validate_descriptor(descriptor: &SourceDescriptor) -> Result<()> {
    let name = &descriptor.name;

    if descriptor.kind == SourceKind::Api {
        return Err(VilabotError::validation(format!(
            "source '{name}': type \"api\" is reserved and cannot be enabled"
        )));
    }

    let base = Url::parse(&descriptor.base_url).map_err(|e| {
        VilabotError::validation(format!("source '{name}': invalid url '{}': {e}", descriptor.base_url))
    })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(VilabotError::validation(format!(
            "source '{name}': url must be http or https, got '{}'",
            base.scheme()
        )));
    }

    if let Some(search_url) = &descriptor.search_url {
        if !search_url.contains(KEYWORDS_PLACEHOLDER) {
            return Err(VilabotError::validation(format!(
                "source '{name}': search_url has no {KEYWORDS_PLACEHOLDER} placeholder"
            )));
        }
    }

    for (field, selector) in descriptor.extraction_schema.fields() {
        if selector.trim().is_empty() {
            return Err(VilabotError::validation(format!(
                "source '{name}': selector '{field}' is empty"
            )));
        }
        compile_selector(selector)
            .map_err(|e| VilabotError::validation(format!("source '{name}': selector '{field}': {e}")))?;
    }

    Ok(())
}

/// URL to fetch for `descriptor` given the intent's keywords.
///
/// Uses `search_url` when it exists and the joined keywords are non-empty,
/// otherwise the descriptor's base URL verbatim.
pub fn request_url(descriptor: &SourceDescriptor, keywords: &[String]) -> String {
    let joined = keywords.join(" ");
    match &descriptor.search_url {
        Some(template) if !joined.is_empty() => {
            let encoded: String = byte_serialize(joined.as_bytes()).collect();
            template.replacen(KEYWORDS_PLACEHOLDER, &encoded, 1)
        }
        _ => descriptor.base_url.clone(),
    }
}
