//! Application configuration for Vilabot.
//!
//! User config lives at `~/.vilabot/vilabot.toml`.
//! A `--config` flag overrides the location; a missing file means defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VilabotError};
use crate::types::{ExtractionSchema, SourceDescriptor, SourceKind};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "vilabot.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".vilabot";

/// Desktop browser identity. Several agendas reject unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching vilabot.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Source descriptors, in registry order.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceDescriptor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            sources: default_sources(),
        }
    }
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Overall deadline for one aggregate call. Unset means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            aggregate_timeout_secs: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn aggregate_timeout(&self) -> Option<Duration> {
        self.aggregate_timeout_secs.map(Duration::from_secs)
    }
}

fn default_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_max_redirects() -> usize {
    10
}

/// Built-in Catalan agenda descriptors. All ship disabled until their
/// selectors have been checked against the live markup.
pub fn default_sources() -> Vec<SourceDescriptor> {
    vec![
        builtin(
            "Agenda Cultural Gencat",
            "https://agenda.cultura.gencat.cat",
            "https://agenda.cultura.gencat.cat/cerca?text={keywords}",
            [
                ".event-item",
                ".event-title",
                ".event-date",
                ".event-location",
                ".event-description",
                "a",
            ],
        ),
        builtin(
            "Surt de Casa",
            "https://www.surtdecasa.cat",
            "https://www.surtdecasa.cat/cerca?q={keywords}",
            [
                ".activity-card",
                ".activity-title",
                ".activity-date",
                ".activity-location",
                ".activity-excerpt",
                "a",
            ],
        ),
        builtin(
            "Barcelona Cultura",
            "https://www.barcelona.cat/barcelonacultura",
            "https://www.barcelona.cat/barcelonacultura/ca/agenda?text={keywords}",
            [".agenda-item", "h3", ".date", ".location", ".description", "a"],
        ),
        builtin(
            "Festa Catalunya",
            "https://www.festacatalunya.cat",
            "https://www.festacatalunya.cat/?s={keywords}",
            [
                "article",
                ".entry-title",
                ".event-date",
                ".event-location",
                ".entry-summary",
                "a",
            ],
        ),
    ]
}

fn builtin(name: &str, url: &str, search_url: &str, selectors: [&str; 6]) -> SourceDescriptor {
    let [event_container, title, date, location, description, link] = selectors.map(String::from);
    SourceDescriptor {
        name: name.into(),
        base_url: url.into(),
        kind: SourceKind::Html,
        search_url: Some(search_url.into()),
        extraction_schema: ExtractionSchema {
            event_container,
            title,
            date,
            location,
            description,
            link,
        },
        enabled: false,
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.vilabot/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| VilabotError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.vilabot/vilabot.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| VilabotError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| VilabotError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| VilabotError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = render_config(&AppConfig::default())?;

    std::fs::write(&path, content).map_err(|e| VilabotError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Serialize a config back to TOML.
pub fn render_config(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| VilabotError::config(e.to_string()))
}
