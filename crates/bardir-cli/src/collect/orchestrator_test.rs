use std::time::Duration;

use super::*;
use bardir_db::{connect_pool, list_bar_numbers, resume_page, run_migrations, PoolConfig};
use bardir_scraper::{RetryPolicy, Transport};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const SEARCH_PATH: &str = "/AM/Template.cfm";
const PAGE_SIZE: u32 = 2;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Matches form posts whose body does not contain the given text.
struct BodyLacks(&'static str);

impl Match for BodyLacks {
    fn matches(&self, request: &Request) -> bool {
        !String::from_utf8_lossy(&request.body).contains(self.0)
    }
}

fn listing(entries: &[(&str, u32)]) -> String {
    let articles: String = entries
        .iter()
        .map(|(last, id)| {
            format!(
                "<article class=\"lawyer\"><span class=\"given-name\">Pat</span>\
                 <span class=\"family-name\">{last}</span>\
                 <a href=\"/detail?ContactID={id}\">Profile</a></article>"
            )
        })
        .collect();
    format!("<html><body>{articles}</body></html>")
}

fn detail_page(bar_number: &str) -> String {
    format!(
        "<html><body><article class=\"lawyer\">\
         <strong>Bar Card Number:</strong> {bar_number}<br>\
         <strong>TX License Date:</strong> 01/02/2003\
         </article></body></html>"
    )
}

fn bar_for(id: u32) -> String {
    format!("B{id:03}")
}

/// Mounts a listing mock for `page` that answers with `body`.
async fn mount_page(server: &MockServer, page: u32, body: String, expected: Option<u64>) {
    let mock = Mock::given(method("POST")).and(path(SEARCH_PATH));
    let mock = if page == 0 {
        mock.and(BodyLacks("ButtonName"))
    } else {
        mock.and(body_string_contains(format!(
            "&Page={}&",
            page * PAGE_SIZE + 1
        )))
    };
    let mock = mock.respond_with(ResponseTemplate::new(200).set_body_string(body));
    let mock = match expected {
        Some(n) => mock.expect(n),
        None => mock,
    };
    mock.mount(server).await;
}

async fn mount_detail(server: &MockServer, id: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/detail"))
        .and(query_param("ContactID", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts `pages` followed by an empty page, plus a detail page per entry.
/// The page after the empty one must never be requested.
async fn mount_directory(server: &MockServer, pages: &[&[(&str, u32)]]) {
    for (idx, entries) in pages.iter().enumerate() {
        let page = u32::try_from(idx).unwrap();
        mount_page(server, page, listing(entries), None).await;
        for (_, id) in *entries {
            mount_detail(server, *id, detail_page(&bar_for(*id))).await;
        }
    }
    let end = u32::try_from(pages.len()).unwrap();
    mount_page(server, end, listing(&[]), None).await;
    mount_page(server, end + 1, listing(&[("Never", 999)]), Some(0)).await;
}

async fn memory_pool() -> SqlitePool {
    let pool = connect_pool("sqlite::memory:", PoolConfig::default())
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

fn clients(server: &MockServer, max_retries: u32) -> (SearchSession, DetailEnricher) {
    let transport = Transport::new(
        5,
        "bardir-test/0.1",
        RetryPolicy {
            max_retries,
            backoff_base_ms: 0,
        },
    )
    .expect("transport");
    let session = SearchSession::new(
        transport.clone(),
        &format!("{}{SEARCH_PATH}", server.uri()),
        PAGE_SIZE,
    )
    .expect("session");
    let enricher = DetailEnricher::new(transport, &server.uri()).expect("enricher");
    (session, enricher)
}

fn dallas() -> SearchQuery {
    SearchQuery {
        county: "57".to_owned(),
        ..SearchQuery::default()
    }
}

async fn collect(
    pool: &SqlitePool,
    session: &SearchSession,
    enricher: &DetailEnricher,
    options: RunOptions,
) -> RunSummary {
    collect_throttled(pool, session, enricher, Throttle::disabled(), options).await
}

async fn collect_throttled(
    pool: &SqlitePool,
    session: &SearchSession,
    enricher: &DetailEnricher,
    throttle: Throttle,
    options: RunOptions,
) -> RunSummary {
    Orchestrator::new(pool, session, enricher, throttle, "Dallas")
        .run(&dallas(), options)
        .await
}

const PAGES: [&[(&str, u32)]; 3] = [
    &[("Alpha", 1), ("Bravo", 2)],
    &[("Charlie", 3), ("Delta", 4)],
    &[("Echo", 5)],
];

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_stops_at_first_empty_page() {
    let server = MockServer::start().await;
    mount_directory(&server, &PAGES).await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 0);

    let summary = collect(&pool, &session, &enricher, RunOptions::default()).await;

    assert!(matches!(summary.final_state, FinalState::Exhausted), "{summary:?}");
    assert_eq!(summary.start_page, 0);
    assert_eq!(summary.pages_completed, 3);
    assert_eq!(summary.records_seen, 5);
    assert_eq!(summary.records_stored, 5);
    assert_eq!(summary.duplicates, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(
        list_bar_numbers(&pool).await.unwrap(),
        ["B001", "B002", "B003", "B004", "B005"]
    );
    assert_eq!(resume_page(&pool, &dallas().progress_key()).await.unwrap(), 3);
}

#[tokio::test]
async fn records_carry_their_page_and_jurisdiction() {
    let server = MockServer::start().await;
    mount_directory(&server, &PAGES).await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 0);

    collect(&pool, &session, &enricher, RunOptions::default()).await;

    let row = bardir_db::get_attorney(&pool, "B004").await.unwrap().unwrap();
    assert_eq!(row.last_name, "Delta");
    assert_eq!(row.page, 1);
    assert_eq!(row.jurisdiction, "Dallas");
    assert_eq!(row.license_date, "01/02/2003");
}

#[tokio::test]
async fn max_pages_bounds_the_run() {
    let server = MockServer::start().await;
    mount_directory(&server, &PAGES).await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 0);

    let summary = collect(
        &pool,
        &session,
        &enricher,
        RunOptions {
            max_pages: Some(2),
            ..RunOptions::default()
        },
    )
    .await;

    assert!(matches!(summary.final_state, FinalState::PageLimit));
    assert_eq!(summary.pages_completed, 2);
    assert_eq!(summary.records_stored, 4);
}

#[tokio::test]
async fn explicit_start_page_skips_earlier_pages() {
    let server = MockServer::start().await;
    mount_page(&server, 0, listing(&[("Alpha", 1)]), Some(0)).await;
    mount_page(&server, 1, listing(&[("Charlie", 3)]), Some(1)).await;
    mount_page(&server, 2, listing(&[]), Some(1)).await;
    mount_detail(&server, 3, detail_page("B003")).await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 0);

    let summary = collect(
        &pool,
        &session,
        &enricher,
        RunOptions {
            start_page: Some(1),
            ..RunOptions::default()
        },
    )
    .await;

    assert_eq!(summary.start_page, 1);
    assert_eq!(summary.records_stored, 1);
    assert_eq!(list_bar_numbers(&pool).await.unwrap(), ["B003"]);
}

// ---------------------------------------------------------------------------
// Resume
// ---------------------------------------------------------------------------

#[tokio::test]
async fn interrupted_then_resumed_run_matches_uninterrupted_run() {
    let server = MockServer::start().await;
    mount_directory(&server, &PAGES).await;
    let (session, enricher) = clients(&server, 0);

    let interrupted = memory_pool().await;
    let first = collect(
        &interrupted,
        &session,
        &enricher,
        RunOptions {
            max_pages: Some(1),
            ..RunOptions::default()
        },
    )
    .await;
    assert_eq!(first.records_stored, 2);

    let second = collect(&interrupted, &session, &enricher, RunOptions::default()).await;
    assert_eq!(second.start_page, 1);
    assert_eq!(second.records_stored, 3);
    assert!(matches!(second.final_state, FinalState::Exhausted));

    let uninterrupted = memory_pool().await;
    collect(&uninterrupted, &session, &enricher, RunOptions::default()).await;

    assert_eq!(
        list_bar_numbers(&interrupted).await.unwrap(),
        list_bar_numbers(&uninterrupted).await.unwrap()
    );
}

#[tokio::test]
async fn rerunning_a_page_reports_duplicates() {
    let server = MockServer::start().await;
    mount_directory(&server, &PAGES).await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 0);

    collect(&pool, &session, &enricher, RunOptions::default()).await;
    let again = collect(
        &pool,
        &session,
        &enricher,
        RunOptions {
            start_page: Some(0),
            max_pages: Some(1),
            ..RunOptions::default()
        },
    )
    .await;

    assert_eq!(again.records_stored, 0);
    assert_eq!(again.duplicates, 2);
    assert_eq!(bardir_db::count_attorneys(&pool, None).await.unwrap(), 5);
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn record_without_bar_number_is_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, 0, listing(&[("Alpha", 1), ("Bravo", 2)]), None).await;
    mount_page(&server, 1, listing(&[]), None).await;
    mount_detail(&server, 1, detail_page("B001")).await;
    mount_detail(
        &server,
        2,
        "<html><body><article class=\"lawyer\">Profile unavailable</article></body></html>"
            .to_owned(),
    )
    .await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 0);

    let summary = collect(&pool, &session, &enricher, RunOptions::default()).await;

    assert!(matches!(summary.final_state, FinalState::Exhausted));
    assert_eq!(summary.records_seen, 2);
    assert_eq!(summary.records_stored, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(resume_page(&pool, &dallas().progress_key()).await.unwrap(), 1);
}

#[tokio::test]
async fn stale_detail_link_skips_the_record_and_completes_the_page() {
    let server = MockServer::start().await;
    mount_page(&server, 0, listing(&[("Alpha", 1), ("Bravo", 2)]), None).await;
    mount_page(&server, 1, listing(&[]), None).await;
    mount_detail(&server, 1, detail_page("B001")).await;
    Mock::given(method("GET"))
        .and(query_param("ContactID", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 3);

    let summary = collect(&pool, &session, &enricher, RunOptions::default()).await;

    assert!(matches!(summary.final_state, FinalState::Exhausted), "{summary:?}");
    assert_eq!(summary.records_stored, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(list_bar_numbers(&pool).await.unwrap(), ["B001"]);
    assert_eq!(resume_page(&pool, &dallas().progress_key()).await.unwrap(), 1);
}

#[tokio::test]
async fn listing_transport_failure_ends_run_and_keeps_earlier_pages() {
    let server = MockServer::start().await;
    mount_page(&server, 0, listing(&[("Alpha", 1)]), None).await;
    mount_detail(&server, 1, detail_page("B001")).await;
    Mock::given(method("POST"))
        .and(body_string_contains(format!("&Page={}&", PAGE_SIZE + 1)))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 1);

    let summary = collect(&pool, &session, &enricher, RunOptions::default()).await;

    assert!(
        matches!(
            summary.final_state,
            FinalState::Failed(PipelineError::Transport { page: 1, .. })
        ),
        "{summary:?}"
    );
    assert_eq!(summary.pages_completed, 1);
    assert_eq!(list_bar_numbers(&pool).await.unwrap(), ["B001"]);
    assert_eq!(resume_page(&pool, &dallas().progress_key()).await.unwrap(), 1);
}

#[tokio::test]
async fn detail_transport_failure_leaves_page_incomplete() {
    let server = MockServer::start().await;
    mount_page(&server, 0, listing(&[("Alpha", 1), ("Bravo", 2)]), None).await;
    mount_detail(&server, 1, detail_page("B001")).await;
    Mock::given(method("GET"))
        .and(query_param("ContactID", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 1);

    let summary = collect(&pool, &session, &enricher, RunOptions::default()).await;

    assert!(matches!(
        summary.final_state,
        FinalState::Failed(PipelineError::Transport { page: 0, .. })
    ));
    assert_eq!(summary.pages_completed, 0);
    assert_eq!(list_bar_numbers(&pool).await.unwrap(), ["B001"]);
    assert_eq!(resume_page(&pool, &dallas().progress_key()).await.unwrap(), 0);
}

#[tokio::test]
async fn client_error_on_listing_is_not_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 3);

    let summary = collect(&pool, &session, &enricher, RunOptions::default()).await;

    assert!(matches!(
        summary.final_state,
        FinalState::Failed(PipelineError::Unexpected { page: 0, .. })
    ));
}

// ---------------------------------------------------------------------------
// Throttle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn throttle_pauses_are_reported_in_summary() {
    let server = MockServer::start().await;
    mount_directory(&server, &PAGES).await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 0);

    let summary = collect_throttled(
        &pool,
        &session,
        &enricher,
        Throttle::new(2, Duration::ZERO),
        RunOptions::default(),
    )
    .await;

    assert_eq!(summary.records_seen, 5);
    assert_eq!(summary.throttle_pauses, 2);
}

#[tokio::test]
async fn dry_run_never_ticks_the_throttle() {
    let server = MockServer::start().await;
    mount_directory(&server, &PAGES).await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 0);

    let summary = collect_throttled(
        &pool,
        &session,
        &enricher,
        Throttle::new(1, Duration::ZERO),
        RunOptions {
            dry_run: true,
            ..RunOptions::default()
        },
    )
    .await;

    assert_eq!(summary.records_seen, 5);
    assert_eq!(summary.throttle_pauses, 0);
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dry_run_parses_pages_without_detail_requests_or_writes() {
    let server = MockServer::start().await;
    mount_page(&server, 0, listing(&[("Alpha", 1), ("Bravo", 2)]), Some(1)).await;
    mount_page(&server, 1, listing(&[]), Some(1)).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("B001")))
        .expect(0)
        .mount(&server)
        .await;
    let pool = memory_pool().await;
    let (session, enricher) = clients(&server, 0);

    let summary = collect(
        &pool,
        &session,
        &enricher,
        RunOptions {
            dry_run: true,
            ..RunOptions::default()
        },
    )
    .await;

    assert!(matches!(summary.final_state, FinalState::Exhausted));
    assert_eq!(summary.records_seen, 2);
    assert_eq!(summary.records_stored, 0);
    assert!(list_bar_numbers(&pool).await.unwrap().is_empty());
    assert_eq!(resume_page(&pool, &dallas().progress_key()).await.unwrap(), 0);
}
