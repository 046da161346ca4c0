//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use vilabot_core::{Aggregator, DEFAULT_DIGEST_LIMIT, parse_intent, render_digest, render_intent};
use vilabot_scraper::SourceRegistry;
use vilabot_shared::{
    AppConfig, DateRange, Intent, init_config, load_config, load_config_from, render_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Vilabot: what's on near you, from Catalan agenda sites.
#[derive(Parser)]
#[command(
    name = "vilabot",
    version,
    about = "Search local events across Catalan agenda sites.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.vilabot/vilabot.toml).
    #[arg(long, global = true, env = "VILABOT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Search every enabled source for matching events.
    Search {
        /// Search keywords.
        keywords: Vec<String>,

        /// Town, city or comarca the events must mention.
        #[arg(short, long)]
        location: Option<String>,

        /// First day of the date window (YYYY-MM-DD).
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Last day of the date window (YYYY-MM-DD).
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,

        /// Event category label (música, teatre, familiar, ...).
        #[arg(short, long)]
        category: Option<String>,

        /// Read the intent from an extractor JSON reply (`-` for stdin).
        #[arg(long, conflicts_with_all = ["location", "from", "to", "category"])]
        intent_json: Option<PathBuf>,

        /// Print the aggregation result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List configured sources.
    Sources,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(cli)));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Directive string for `-v` levels when `RUST_LOG` is unset.
fn default_filter(cli: &Cli) -> &'static str {
    match cli.verbose {
        0 => "vilabot=info,vilabot_core=info,vilabot_scraper=warn,vilabot_shared=info",
        1 => "vilabot=debug,vilabot_core=debug,vilabot_scraper=debug,vilabot_shared=debug",
        _ => "vilabot=trace,vilabot_core=trace,vilabot_scraper=trace,vilabot_shared=trace",
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Search {
            keywords,
            location,
            from,
            to,
            category,
            intent_json,
            json,
        } => {
            let intent = match intent_json {
                Some(path) => read_intent(&path, &keywords.join(" "))?,
                None => build_intent(keywords, location, from, to, category)?,
            };
            cmd_search(config_path, &intent, json).await
        }
        Command::Sources => cmd_sources(config_path),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

fn build_intent(
    keywords: Vec<String>,
    location: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    category: Option<String>,
) -> Result<Intent> {
    let date_range = match (from, to) {
        (Some(start), Some(end)) if end < start => {
            return Err(eyre!("--to ({end}) is before --from ({start})"));
        }
        (Some(start), Some(end)) => Some(DateRange { start, end }),
        _ => None,
    };

    let original_query = (!keywords.is_empty()).then(|| keywords.join(" "));

    Ok(Intent {
        keywords,
        location: non_blank(location),
        date_range,
        category: non_blank(category),
        original_query,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_intent(path: &Path, query: &str) -> Result<Intent> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| eyre!("failed to read intent from stdin: {e}"))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| eyre!("failed to read intent file {}: {e}", path.display()))?
    };
    Ok(parse_intent(&raw, query))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_search(config_path: Option<&Path>, intent: &Intent, json: bool) -> Result<()> {
    let config = resolve_config(config_path)?;
    let registry = SourceRegistry::from_config(&config)?;

    info!(
        keywords = ?intent.keywords,
        location = ?intent.location,
        sources = registry.enabled_count(),
        "searching"
    );

    let spinner = spinner(registry.enabled_count());
    let aggregator = Aggregator::new(&registry, config.http.clone());
    let result = aggregator.aggregate(intent).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    if result.sources_attempted == 0 {
        println!("  No sources enabled: showing demo events.");
    } else {
        println!("  Sources scraped: {}", result.sources_attempted);
    }
    println!("  Events found:    {}", result.events_found);
    println!();
    print!("{}", render_intent(intent));
    println!();
    println!("{}", render_digest(&result.events, DEFAULT_DIGEST_LIMIT));

    Ok(())
}

fn spinner(sources: usize) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(match sources {
        0 => "Preparing demo events".to_string(),
        1 => "Fetching 1 source".to_string(),
        n => format!("Fetching {n} sources"),
    });
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

fn cmd_sources(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let registry = SourceRegistry::from_config(&config)?;

    if registry.all().is_empty() {
        println!("No sources configured.");
        return Ok(());
    }

    for source in registry.all() {
        let state = if source.enabled { "enabled " } else { "disabled" };
        println!(
            "  [{state}] {:<28} {:<5} {}",
            source.name, source.kind, source.base_url
        );
    }
    println!();
    println!(
        "  {} of {} sources enabled",
        registry.enabled_count(),
        registry.all().len()
    );

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    println!("{}", render_config(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_flags_build_intent() {
        let cli = Cli::parse_from([
            "vilabot", "search", "castellers", "--location", "Valls", "--from", "2025-10-01",
            "--to", "2025-10-31",
        ]);
        let Command::Search {
            keywords,
            location,
            from,
            to,
            category,
            ..
        } = cli.command
        else {
            panic!("expected search");
        };
        let intent = build_intent(keywords, location, from, to, category).unwrap();
        assert_eq!(intent.keywords, vec!["castellers"]);
        assert_eq!(intent.location.as_deref(), Some("Valls"));
        assert!(intent.date_range.is_some());
    }

    #[test]
    fn blank_location_flag_is_no_constraint() {
        let intent = build_intent(
            vec!["sardanes".into()],
            Some("   ".into()),
            None,
            None,
            Some("  música ".into()),
        )
        .unwrap();
        assert_eq!(intent.location, None);
        assert_eq!(intent.category.as_deref(), Some("música"));
    }

    #[test]
    fn every_crate_is_in_the_default_filter() {
        for verbose in 0..3 {
            let cli = Cli {
                log_format: LogFormat::Text,
                verbose,
                config: None,
                command: Command::Sources,
            };
            let filter = default_filter(&cli);
            for target in ["vilabot=", "vilabot_core=", "vilabot_scraper=", "vilabot_shared="] {
                assert!(filter.contains(target), "{target} missing at -v x{verbose}");
            }
        }
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let start = NaiveDate::from_ymd_opt(2025, 10, 31);
        let end = NaiveDate::from_ymd_opt(2025, 10, 1);
        assert!(build_intent(vec![], None, start, end, None).is_err());
    }

    #[test]
    fn from_without_to_is_a_usage_error() {
        let parsed = Cli::try_parse_from(["vilabot", "search", "--from", "2025-10-01"]);
        assert!(parsed.is_err());
    }
}
