//! `collect` command: walks the directory and stores every listed attorney.

mod orchestrator;

use std::time::Duration;

use bardir_core::{AppConfig, SearchQuery};
use bardir_scraper::{DetailEnricher, RetryPolicy, SearchSession, Throttle, Transport};
use clap::Args;

pub use orchestrator::{FinalState, Orchestrator, RunOptions, RunSummary};

/// Directory search filters. Unset filters are sent blank.
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    #[arg(long)]
    pub city: Option<String>,

    /// Numeric county code (Dallas = 57, Collin = 43, Denton = 61)
    #[arg(long)]
    pub county: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub zip: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub firm: Option<String>,

    #[arg(long)]
    pub bar_number: Option<String>,

    /// Comma-separated practice-area codes, e.g. "42,25,47"
    #[arg(long)]
    pub practice_area: Option<String>,
}

impl QueryArgs {
    #[must_use]
    pub fn to_query(&self) -> SearchQuery {
        let field = |v: Option<&str>| v.map(str::trim).unwrap_or_default().to_owned();
        SearchQuery {
            city: field(self.city.as_deref()),
            county: field(self.county.as_deref()),
            state: field(self.state.as_deref()),
            zip: field(self.zip.as_deref()),
            name: field(self.name.as_deref()),
            firm: field(self.firm.as_deref()),
            bar_number: field(self.bar_number.as_deref()),
            practice_areas: field(self.practice_area.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct CollectArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Page to start from (0-based). Defaults to the saved resume point.
    #[arg(long)]
    pub start_page: Option<u32>,

    /// Forget saved progress for this search and start from page 0
    #[arg(long, conflicts_with = "start_page")]
    pub restart: bool,

    /// Stop after fetching this many listing pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Fetch and parse listing pages without detail requests or writes
    #[arg(long)]
    pub dry_run: bool,
}

pub(crate) fn build_transport(config: &AppConfig) -> anyhow::Result<Transport> {
    Transport::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        RetryPolicy {
            max_retries: config.scraper_max_retries,
            backoff_base_ms: config.scraper_retry_backoff_base_ms,
        },
    )
    .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))
}

/// Runs one collection pass for the filters in `args`.
///
/// # Errors
///
/// Returns an error if the HTTP clients cannot be built, saved progress
/// cannot be reset, or the run ends in [`FinalState::Failed`]. Records stored
/// before a failure are kept and the next run resumes at the failed page.
pub(crate) async fn run_collect(
    pool: &sqlx::SqlitePool,
    config: &AppConfig,
    args: &CollectArgs,
) -> anyhow::Result<()> {
    let query = args.query.to_query();
    if query.is_empty() {
        tracing::warn!("no search filters set; collecting the whole directory");
    }

    let transport = build_transport(config)?;
    let session = SearchSession::new(transport.clone(), &config.search_url, config.page_size)?;
    let enricher = DetailEnricher::new(transport, &config.base_url)?;
    let throttle = Throttle::new(
        config.throttle_every,
        Duration::from_secs(config.throttle_pause_secs),
    );

    let mut start_page = args.start_page;
    if args.restart {
        if args.dry_run {
            start_page = Some(0);
        } else {
            let removed = bardir_db::reset_progress(pool, &query.progress_key()).await?;
            tracing::info!(pages = removed, "cleared saved progress");
        }
    }

    let options = RunOptions {
        start_page,
        max_pages: args.max_pages,
        dry_run: args.dry_run,
    };
    let summary = Orchestrator::new(pool, &session, &enricher, throttle, &config.jurisdiction)
        .run(&query, options)
        .await;

    print_summary(&summary, args.dry_run);

    match summary.final_state {
        FinalState::Failed(err) => Err(err.into()),
        FinalState::Exhausted | FinalState::PageLimit => Ok(()),
    }
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    let outcome = match &summary.final_state {
        FinalState::Exhausted => "directory exhausted".to_owned(),
        FinalState::PageLimit => "page limit reached".to_owned(),
        FinalState::Failed(err) => format!("failed: {err}"),
    };
    let prefix = if dry_run { "dry-run: " } else { "" };
    println!(
        "{prefix}pages {} from page {}, seen {}, stored {}, duplicates {}, skipped {}, throttle pauses {} ({outcome})",
        summary.pages_completed,
        summary.start_page,
        summary.records_seen,
        summary.records_stored,
        summary.duplicates,
        summary.skipped,
        summary.throttle_pauses,
    );
}
