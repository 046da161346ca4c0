//! Concurrent fan-out over enabled sources, fan-in in registry order.
//!
//! One task per enabled source runs fetch → extract → filter. Tasks live in
//! a [`JoinSet`], so dropping an unfinished `aggregate` future aborts them.
//! Outcomes are slotted back into registry order (not completion order); a
//! failed, panicked or timed-out task contributes zero events. With no
//! enabled source the demo dataset is returned instead.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use tokio::task::{Id, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use vilabot_scraper::{
    FetchError, Fetcher, ParseError, SourceRegistry, apply_intent, extract_html, request_url,
};
use vilabot_shared::{AggregationResult, EventRecord, HttpConfig, Intent, SourceDescriptor};

use crate::demo::demo_events;

/// Why one source contributed no events.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction failed: {0}")]
    Parse(#[from] ParseError),

    /// The task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(String),

    #[error("aggregate deadline exceeded")]
    Deadline,
}

impl SourceError {
    /// Whether the source ran out of time, per request or overall.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_timeout(),
            Self::Deadline => true,
            Self::Parse(_) | Self::Task(_) => false,
        }
    }
}

type SourceOutcome = Result<Vec<EventRecord>, SourceError>;

/// Per-source tasks of one aggregate call, joined back in spawn order.
///
/// Dropping this aborts every task that has not finished.
struct SourceTasks {
    set: JoinSet<SourceOutcome>,
    slots: HashMap<Id, usize>,
}

impl SourceTasks {
    fn new() -> Self {
        Self {
            set: JoinSet::new(),
            slots: HashMap::new(),
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = SourceOutcome> + Send + 'static,
    {
        let index = self.slots.len();
        let handle = self.set.spawn(task);
        self.slots.insert(handle.id(), index);
    }

    /// Wait for every task, or until `deadline`. Outcomes come back in spawn
    /// order; tasks still running at the deadline are aborted.
    async fn join_ordered(mut self, deadline: Option<Instant>) -> Vec<SourceOutcome> {
        let mut outcomes: Vec<Option<SourceOutcome>> = (0..self.slots.len()).map(|_| None).collect();

        loop {
            let next = match deadline {
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, self.set.join_next_with_id()).await {
                        Ok(next) => next,
                        Err(_) => {
                            self.set.abort_all();
                            break;
                        }
                    }
                }
                None => self.set.join_next_with_id().await,
            };

            let Some(joined) = next else { break };
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(e) => (e.id(), Err(SourceError::Task(e.to_string()))),
            };
            if let Some(&index) = self.slots.get(&id) {
                outcomes[index] = Some(outcome);
            }
        }

        outcomes
            .into_iter()
            .map(|outcome| outcome.unwrap_or(Err(SourceError::Deadline)))
            .collect()
    }
}

/// Runs one intent against every enabled source of a registry.
pub struct Aggregator<'r> {
    registry: &'r SourceRegistry,
    http: HttpConfig,
}

impl<'r> Aggregator<'r> {
    pub fn new(registry: &'r SourceRegistry, http: HttpConfig) -> Self {
        Self { registry, http }
    }

    /// Gather, filter and deduplicate events for `intent`.
    ///
    /// Never fails: degraded sourcing shows up only in the counters.
    #[instrument(skip_all, fields(keywords = ?intent.keywords, location = ?intent.location))]
    pub async fn aggregate(&self, intent: &Intent) -> AggregationResult {
        let enabled: Vec<&SourceDescriptor> = self.registry.enabled().collect();

        if enabled.is_empty() {
            let events = demo_events(intent);
            info!(events = events.len(), "no sources enabled, serving demo data");
            return AggregationResult::new(events, 0);
        }

        // One client (and connection pool) per aggregate call, dropped on return.
        let fetcher = match Fetcher::new(&self.http) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                warn!(error = %e, "could not build HTTP client, no source fetched");
                return AggregationResult::new(Vec::new(), enabled.len());
            }
        };

        let deadline = self.http.aggregate_timeout().map(|d| Instant::now() + d);
        let intent = Arc::new(intent.clone());

        info!(sources = enabled.len(), "aggregating");

        let mut tasks = SourceTasks::new();
        for descriptor in &enabled {
            let descriptor = (*descriptor).clone();
            let fetcher = fetcher.clone();
            let intent = Arc::clone(&intent);
            tasks.spawn(async move { scrape_source(&fetcher, &descriptor, &intent).await });
        }

        let outcomes = tasks.join_ordered(deadline).await;

        let mut all_events = Vec::new();
        let mut failed = 0usize;

        for (descriptor, outcome) in enabled.iter().zip(outcomes) {
            match outcome {
                Ok(events) => {
                    debug!(source = %descriptor.name, events = events.len(), "source finished");
                    all_events.extend(events);
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        source = %descriptor.name,
                        error = %e,
                        timeout = e.is_timeout(),
                        "source contributed no events"
                    );
                }
            }
        }

        let collected = all_events.len();
        let events = dedup_by_title(all_events);

        info!(
            sources = enabled.len(),
            failed,
            collected,
            events = events.len(),
            "aggregation completed"
        );

        AggregationResult::new(events, enabled.len())
    }
}

/// Fetch, extract and filter one source.
#[instrument(skip_all, fields(source = %descriptor.name))]
pub async fn scrape_source(
    fetcher: &Fetcher,
    descriptor: &SourceDescriptor,
    intent: &Intent,
) -> Result<Vec<EventRecord>, SourceError> {
    let url = request_url(descriptor, &intent.keywords);
    let markup = fetcher.fetch(&url).await?;

    let extracted = extract_html(&markup, descriptor)?;
    let extracted_count = extracted.len();
    let events = apply_intent(extracted, intent);

    debug!(%url, extracted = extracted_count, kept = events.len(), "source scraped");
    Ok(events)
}

/// Drop records whose normalized title was already seen; first occurrence wins.
pub fn dedup_by_title(events: Vec<EventRecord>) -> Vec<EventRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    events
        .into_iter()
        .filter(|event| {
            let key = event.normalized_title();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}
