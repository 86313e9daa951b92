//! Integration tests for the listing run
//!
//! wiremock stands in for the catalog where HTTP framing is all that
//! matters; a scripted TCP server is used where the byte pacing does.

mod support;

use std::collections::HashSet;
use std::sync::Arc;
use support::{http_reply, listing_body, scripted_server, test_config, Pacing};
use unread_scout::output::{MemorySink, Notifier};
use unread_scout::scrape::{Cookie, PaginationPhase, PaginationSummary, Paginator};
use unread_scout::state::NoExclusions;
use unread_scout::{Config, ExcludeSet, ScoutError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page: u32, items: &[(u64, &str)], expected: u64) {
    Mock::given(method("GET"))
        .and(path("/my/unread/"))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_body(items))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

async fn run_listing(
    config: &Config,
    exclude: &dyn ExcludeSet,
) -> (
    Result<PaginationSummary, ScoutError>,
    Vec<(u64, String)>,
    Arc<MemorySink>,
    PaginationPhase,
) {
    let sink = Arc::new(MemorySink::new());
    let notifier = Notifier::new(sink.clone());
    let cookie = Cookie::from_header("Cookie: user_id=42;");

    let mut found = Vec::new();
    let mut paginator = Paginator::new(config, &cookie, exclude, &notifier);
    assert_eq!(paginator.phase(), PaginationPhase::Idle);
    let result = paginator
        .run(|anchor| found.push((anchor.id, anchor.title.clone())))
        .await;
    let phase = paginator.phase();
    (result, found, sink, phase)
}

#[tokio::test]
async fn test_two_page_run_stops_at_quota() {
    let server = MockServer::start().await;
    mount_page(&server, 1, &[(101, "Dune")], 1).await;
    mount_page(&server, 2, &[(102, "Solaris"), (103, "Ubik")], 1).await;
    mount_page(&server, 3, &[(104, "Roadside Picnic")], 0).await;

    let mut config = test_config(server.address());
    config.unread.desired_count = 2;

    let (result, found, sink, phase) = run_listing(&config, &NoExclusions).await;
    let summary = result.expect("listing run succeeds");
    assert_eq!(phase, PaginationPhase::Finished);

    assert_eq!(found, vec![(101, "Dune".to_string()), (102, "Solaris".to_string())]);
    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.pages, 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    let statuses = sink.statuses();
    assert_eq!(statuses.first().map(String::as_str), Some("Unread: Starting"));
    assert!(statuses.contains(&"Unread: Page processing 1".to_string()));
    assert!(statuses.contains(&"Unread: Page processing 2".to_string()));
    assert_eq!(statuses.last().map(String::as_str), Some("Unread: OK, 2 found"));
    assert_eq!(sink.discovered().len(), 2);
}

#[tokio::test]
async fn test_excluded_items_do_not_count() {
    let server = MockServer::start().await;
    mount_page(&server, 1, &[(101, "Dune"), (102, "Solaris"), (103, "Ubik")], 1).await;

    let mut config = test_config(server.address());
    config.unread.desired_count = 2;
    let exclude: HashSet<u64> = [101].into_iter().collect();

    let (result, found, _sink, _) = run_listing(&config, &exclude).await;
    let summary = result.unwrap();

    let ids: Vec<u64> = found.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![102, 103]);
    assert_eq!(summary.excluded, 1);
}

#[tokio::test]
async fn test_max_pages_ends_a_short_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/my/unread/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_body(&[])))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = test_config(server.address());
    config.unread.max_pages = Some(2);

    let (result, found, sink, phase) = run_listing(&config, &NoExclusions).await;
    let summary = result.unwrap();
    assert_eq!(phase, PaginationPhase::Finished);

    assert!(found.is_empty());
    assert_eq!(summary.pages, 2);
    assert!(sink.statuses().contains(&"Unread: OK, 0 found".to_string()));
}

#[tokio::test]
async fn test_markers_split_across_receives() {
    let body = listing_body(&[(7, "Пикник на обочине"), (8, "Solaris"), (9, "Ubik")]);
    let (address, server) = scripted_server(vec![http_reply(&body)], Pacing::default()).await;

    let mut config = test_config(&address);
    config.unread.desired_count = 3;
    // Every receive hands over at most 7 bytes
    config.transport.receive_buffer = 7;

    let (result, found, _sink, _) = run_listing(&config, &NoExclusions).await;
    result.unwrap();

    assert_eq!(
        found,
        vec![
            (7, "Пикник на обочине".to_string()),
            (8, "Solaris".to_string()),
            (9, "Ubik".to_string()),
        ]
    );
    server.abort();
}

#[tokio::test]
async fn test_reconnects_after_server_closes() {
    let replies = vec![
        http_reply(&listing_body(&[(1, "First")])),
        http_reply(&listing_body(&[(2, "Second")])),
    ];
    let pacing = Pacing {
        requests_per_connection: 1,
        ..Pacing::default()
    };
    let (address, server) = scripted_server(replies, pacing).await;

    let mut config = test_config(&address);
    config.unread.desired_count = 2;

    let (result, found, _sink, phase) = run_listing(&config, &NoExclusions).await;
    result.unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(phase, PaginationPhase::Finished);
    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("GET /my/unread/?page=1 "));
    assert!(requests[1].starts_with("GET /my/unread/?page=2 "));
    assert!(requests[1].contains("Cookie: user_id=42;\r\n"));
}

#[tokio::test]
async fn test_lost_connection_fails_the_run() {
    let replies = vec![http_reply(&listing_body(&[(1, "Only")]))];
    let pacing = Pacing {
        requests_per_connection: 1,
        ..Pacing::default()
    };
    let (address, _server) = scripted_server(replies, pacing).await;

    let mut config = test_config(&address);
    config.unread.desired_count = 5;

    let (result, found, _sink, phase) = run_listing(&config, &NoExclusions).await;

    assert_eq!(found.len(), 1);
    assert!(matches!(result, Err(ScoutError::Transport(_))));
    // The reconnect for page 2 failed before anything was sent
    assert_eq!(phase, PaginationPhase::Requesting { page: 2 });
}
