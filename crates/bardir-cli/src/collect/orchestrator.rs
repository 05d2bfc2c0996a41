//! Page-by-page collection driver.
//!
//! A run walks `Start → FetchPage → ParsePage → EnrichAndStore → NextPage`
//! until a listing page parses to no entries, the page limit is reached, or a
//! non-recoverable error moves it to `Failed`. Every network call and store
//! write is awaited before the next one starts.

use bardir_core::{DirectoryPage, MergedRecord, SearchQuery, SummaryRecord};
use bardir_db::{DbError, UpsertOutcome};
use bardir_scraper::{
    parse_listing, DetailEnricher, DetailExtractor, LabelSiblingExtractor, ScraperError,
    SearchSession, Throttle,
};
use sqlx::SqlitePool;
use thiserror::Error;

/// Per-run options supplied by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// First page to fetch. `None` resumes at the lowest page not yet completed.
    pub start_page: Option<u32>,
    /// Stop after this many pages have been fetched.
    pub max_pages: Option<u32>,
    /// Fetch and parse listing pages only; no detail requests, no writes.
    pub dry_run: bool,
}

/// A non-recoverable failure that ends the run.
///
/// The page named in each variant was not marked complete, so the next run
/// resumes there. Records stored before the failure are kept.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("page {page}: network failure after retries: {source}")]
    Transport {
        page: u32,
        #[source]
        source: ScraperError,
    },
    #[error("page {page}: store failure: {source}")]
    Store {
        page: u32,
        #[source]
        source: DbError,
    },
    #[error("page {page}: unexpected response: {source}")]
    Unexpected {
        page: u32,
        #[source]
        source: ScraperError,
    },
}

impl PipelineError {
    fn from_scraper(page: u32, source: ScraperError) -> Self {
        if source.is_transport() {
            Self::Transport { page, source }
        } else {
            Self::Unexpected { page, source }
        }
    }

    /// Page the run stopped on.
    #[must_use]
    pub fn page(&self) -> u32 {
        match self {
            Self::Transport { page, .. }
            | Self::Store { page, .. }
            | Self::Unexpected { page, .. } => *page,
        }
    }
}

#[derive(Debug)]
enum RunState {
    Start,
    FetchPage(u32),
    ParsePage(DirectoryPage),
    EnrichAndStore {
        page: u32,
        records: Vec<SummaryRecord>,
    },
    NextPage(u32),
    Done(FinalState),
    Failed(PipelineError),
}

/// How a run ended.
#[derive(Debug)]
pub enum FinalState {
    /// A listing page parsed to zero entries.
    Exhausted,
    /// `max_pages` pages were fetched.
    PageLimit,
    Failed(PipelineError),
}

impl FinalState {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Counters and outcome of one run.
#[derive(Debug)]
pub struct RunSummary {
    pub start_page: u32,
    pub pages_completed: u32,
    /// Entries parsed from listing pages, including ones later skipped.
    pub records_seen: usize,
    pub records_stored: usize,
    pub duplicates: usize,
    pub skipped: usize,
    /// Throttle pauses taken during the run.
    pub throttle_pauses: u64,
    pub final_state: FinalState,
}

#[derive(Debug, Default)]
struct RunCounts {
    start_page: u32,
    pages_fetched: u32,
    pages_completed: u32,
    records_seen: usize,
    records_stored: usize,
    duplicates: usize,
    skipped: usize,
}

impl RunCounts {
    fn finish(self, throttle_pauses: u64, final_state: FinalState) -> RunSummary {
        RunSummary {
            start_page: self.start_page,
            pages_completed: self.pages_completed,
            records_seen: self.records_seen,
            records_stored: self.records_stored,
            duplicates: self.duplicates,
            skipped: self.skipped,
            throttle_pauses,
            final_state,
        }
    }
}

/// Drives one collection run from listing pages through to the store.
pub struct Orchestrator<'a, E = LabelSiblingExtractor> {
    pool: &'a SqlitePool,
    session: &'a SearchSession,
    enricher: &'a DetailEnricher<E>,
    throttle: Throttle,
    jurisdiction: String,
}

impl<'a, E: DetailExtractor> Orchestrator<'a, E> {
    #[must_use]
    pub fn new(
        pool: &'a SqlitePool,
        session: &'a SearchSession,
        enricher: &'a DetailEnricher<E>,
        throttle: Throttle,
        jurisdiction: &str,
    ) -> Self {
        Self {
            pool,
            session,
            enricher,
            throttle,
            jurisdiction: jurisdiction.to_owned(),
        }
    }

    /// Collects `query` page by page and reports what happened.
    ///
    /// Never returns early on failure: the returned summary carries the
    /// error in [`FinalState::Failed`] along with the counts reached so far.
    pub async fn run(&mut self, query: &SearchQuery, options: RunOptions) -> RunSummary {
        let progress_key = query.progress_key();
        let mut counts = RunCounts::default();
        let pauses_before = self.throttle.pauses();
        let mut state = RunState::Start;

        let final_state = loop {
            state = match state {
                RunState::Start => match self.start_page(&progress_key, options).await {
                    Ok(page) => {
                        counts.start_page = page;
                        tracing::info!(
                            progress_key = %progress_key,
                            start_page = page,
                            dry_run = options.dry_run,
                            "starting collection run"
                        );
                        RunState::FetchPage(page)
                    }
                    Err(source) => RunState::Failed(PipelineError::Store { page: 0, source }),
                },
                RunState::FetchPage(page) => {
                    if options
                        .max_pages
                        .is_some_and(|max| counts.pages_fetched >= max)
                    {
                        RunState::Done(FinalState::PageLimit)
                    } else {
                        counts.pages_fetched += 1;
                        match self.session.fetch_page(query, page).await {
                            Ok(fetched) => RunState::ParsePage(fetched),
                            Err(e) => RunState::Failed(PipelineError::from_scraper(page, e)),
                        }
                    }
                }
                RunState::ParsePage(fetched) => {
                    let records = parse_listing(&fetched.content);
                    if records.is_empty() {
                        tracing::info!(page = fetched.ordinal, "listing page is empty");
                        RunState::Done(FinalState::Exhausted)
                    } else {
                        counts.records_seen += records.len();
                        RunState::EnrichAndStore {
                            page: fetched.ordinal,
                            records,
                        }
                    }
                }
                RunState::EnrichAndStore { page, records } => {
                    match self
                        .process_page(page, records, &progress_key, options.dry_run, &mut counts)
                        .await
                    {
                        Ok(()) => RunState::NextPage(page),
                        Err(e) => RunState::Failed(e),
                    }
                }
                RunState::NextPage(page) => {
                    counts.pages_completed += 1;
                    RunState::FetchPage(page.saturating_add(1))
                }
                RunState::Done(final_state) => break final_state,
                RunState::Failed(error) => {
                    tracing::error!(page = error.page(), error = %error, "collection run failed");
                    break FinalState::Failed(error);
                }
            };
        };

        let summary = counts.finish(self.throttle.pauses() - pauses_before, final_state);
        tracing::info!(
            pages_completed = summary.pages_completed,
            records_stored = summary.records_stored,
            duplicates = summary.duplicates,
            skipped = summary.skipped,
            throttle_pauses = summary.throttle_pauses,
            failed = summary.final_state.is_failed(),
            "collection run finished"
        );
        summary
    }

    async fn start_page(&self, progress_key: &str, options: RunOptions) -> Result<u32, DbError> {
        match options.start_page {
            Some(page) => Ok(page),
            None => bardir_db::resume_page(self.pool, progress_key).await,
        }
    }

    /// Enriches and stores every record of one listing page, then marks the
    /// page complete.
    async fn process_page(
        &mut self,
        page: u32,
        records: Vec<SummaryRecord>,
        progress_key: &str,
        dry_run: bool,
        counts: &mut RunCounts,
    ) -> Result<(), PipelineError> {
        let total = records.len();
        if dry_run {
            tracing::info!(page, records = total, "dry-run: parsed listing page");
            return Ok(());
        }

        for summary in records {
            self.throttle.record().await;

            let detail = match self.enricher.enrich(&summary.detail_url).await {
                Ok(detail) => detail,
                Err(e) if e.is_record_scoped() => {
                    tracing::warn!(
                        page,
                        last_name = %summary.last_name,
                        detail_url = %summary.detail_url,
                        error = %e,
                        "skipping record"
                    );
                    counts.skipped += 1;
                    continue;
                }
                Err(e) => return Err(PipelineError::from_scraper(page, e)),
            };

            let merged = MergedRecord::new(summary, detail, page);
            let outcome = bardir_db::upsert_attorney(self.pool, &merged, &self.jurisdiction)
                .await
                .map_err(|source| PipelineError::Store { page, source })?;
            match outcome {
                UpsertOutcome::Inserted => counts.records_stored += 1,
                UpsertOutcome::Duplicate => {
                    tracing::debug!(bar_number = merged.bar_number(), "already stored");
                    counts.duplicates += 1;
                }
            }
        }

        bardir_db::mark_page_complete(self.pool, progress_key, page, total)
            .await
            .map_err(|source| PipelineError::Store { page, source })?;
        tracing::info!(page, records = total, "page complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
