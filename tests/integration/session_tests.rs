//! Integration tests for login, item details and task supervision

mod support;

use std::sync::Arc;
use support::{
    comments_body, description_body, http_reply, listing_body, routed_server, scripted_server,
    test_config, Pacing, Route,
};
use unread_scout::output::{MemorySink, Notifier};
use unread_scout::scrape;
use unread_scout::state::{DetailLookup, NoExclusions};
use unread_scout::transport::TransportError;
use unread_scout::{Cookie, Scout, ScoutError, ScoutEvent};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scout_for(config: unread_scout::Config) -> (Scout, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let scout = Scout::new(config, sink.clone(), Arc::new(NoExclusions));
    (scout, sink)
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .and(body_string_contains("login=reader&password=secret"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "user_id=42; path=/"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_with_single_marker() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let (mut scout, sink) = scout_for(test_config(server.address()));
    let cookie = scout.login("reader", "secret").await.expect("login succeeds");

    assert_eq!(cookie.as_str(), "Cookie: user_id=42;");
    assert_eq!(cookie.attributes(), 1);
    assert_eq!(scout.cookie(), &cookie);
    assert_eq!(
        sink.statuses(),
        vec![
            "Authorize: Starting",
            "Authorize: Connecting",
            "Authorize: Parsing reply",
            "Authorize: OK",
        ]
    );
}

#[tokio::test]
async fn test_login_collects_markers_in_order() {
    let reply = concat!(
        "HTTP/1.1 302 Found\r\n",
        "Set-Cookie: PHPSESSID=abc; path=/\r\n",
        "Set-Cookie: user_id=42; expires=Fri, 01-Jan-2038 00:00:00 GMT\r\n",
        "Set-Cookie: user_hash=ff00; path=/\r\n",
        "Content-Length: 0\r\n\r\n"
    );
    let pacing = Pacing {
        requests_per_connection: 1,
        ..Pacing::default()
    };
    let (address, server) = scripted_server(vec![reply.as_bytes().to_vec()], pacing).await;

    let (mut scout, _sink) = scout_for(test_config(&address));
    let cookie = scout.login("reader", "secret").await.unwrap();

    assert_eq!(cookie.as_str(), "Cookie: user_id=42; user_hash=ff00; PHPSESSID=abc;");

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /auth/login/ HTTP/1.1\r\n"));
    assert!(requests[0].contains("Content-Length: 39\r\n"));
    assert!(requests[0].ends_with("login=reader&password=secret&remember=1"));
}

#[tokio::test]
async fn test_background_login_announces_cookie() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let (mut scout, sink) = scout_for(test_config(server.address()));
    scout.authenticate("reader", "secret");
    assert_eq!(scout.drain().await.failed, 0);

    let cookie = sink
        .events()
        .into_iter()
        .find_map(|event| match event {
            ScoutEvent::CookieReady(cookie) => Some(cookie),
            _ => None,
        })
        .expect("cookie announced");
    assert!(scout.cookie().is_empty());

    scout.update_cookie(cookie.clone()).await;
    assert_eq!(scout.cookie(), &cookie);
}

#[tokio::test]
async fn test_empty_detail_is_fetched_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/my/unread/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_body(&[(7, "Solaris")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/element/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(description_body(false)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/element/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(description_body(true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/element/7/opinions/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(comments_body()))
        .mount(&server)
        .await;

    let mut config = test_config(server.address());
    config.unread.desired_count = 1;
    let (scout, sink) = scout_for(config);
    let mut scout = scout.with_cookie(Cookie::from_header("Cookie: user_id=42;"));

    scout.start_pagination();
    scout.drain().await;
    assert_eq!(scout.items().len(), 1);

    assert_eq!(scout.fetch_detail(7), DetailLookup::Fetch);
    assert_eq!(scout.drain().await.failed, 0);
    assert_eq!(scout.item(7).unwrap().detail.as_deref(), Some(""));
    assert!(sink
        .events()
        .contains(&ScoutEvent::DetailReady { id: 7, text: String::new() }));

    assert_eq!(scout.fetch_detail(7), DetailLookup::Fetch);
    scout.drain().await;
    let detail = scout.item(7).unwrap().detail.unwrap();
    assert!(detail.starts_with("<center><h1>Solaris</h1></center>"));
    assert!(detail.contains("<a href=\"http://books.imhonet.ru/element/7/\">"));
    assert!(detail.ends_with("<blockquote>Brilliant.</blockquote>"));
    assert!(sink.statuses().contains(&"Detail: OK".to_string()));

    assert_eq!(scout.fetch_detail(7), DetailLookup::Cached(detail));
}

#[tokio::test]
async fn test_unreachable_catalog_becomes_fail_status() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let (mut scout, sink) = scout_for(test_config(&address));
    scout.start_pagination();
    let report = scout.drain().await;

    assert_eq!(report.failed, 1);
    assert!(scout.items().is_empty());
    assert!(sink
        .statuses()
        .iter()
        .any(|status| status.starts_with("Fail: Transport error: Failed to connect to")));
}

/// Listing with item 7, a full description page, and a comments request
/// whose connection is reset
async fn comments_reset_server() -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    routed_server(vec![
        ("GET /my/unread/", Route::Reply(http_reply(&listing_body(&[(7, "Solaris")])))),
        ("GET /element/7/opinions/", Route::Reset),
        ("GET /element/7/ ", Route::Reply(http_reply(&description_body(true)))),
    ])
    .await
}

#[tokio::test]
async fn test_comments_failure_is_not_masked_by_description() {
    let (address, server) = comments_reset_server().await;
    let config = Arc::new(test_config(&address));
    let sink = Arc::new(MemorySink::new());
    let notifier = Notifier::new(sink.clone());

    let result = scrape::fetch_detail(config, Cookie::from_header("Cookie: user_id=42;"), 7, notifier).await;

    assert!(matches!(
        result,
        Err(ScoutError::Transport(TransportError::Receive { .. }))
    ));
    let text = sink
        .events()
        .into_iter()
        .find_map(|event| match event {
            ScoutEvent::DetailReady { id: 7, text } => Some(text),
            _ => None,
        })
        .expect("detail announced before the failure");
    assert!(text.starts_with("<center><h1>Solaris</h1></center>"));
    assert!(text.ends_with("<a href=\"http://books.imhonet.ru/element/7/\">Посмотреть книгу на сайте</a>"));
    server.abort();
}

#[tokio::test]
async fn test_partially_failed_detail_stays_retryable() {
    let (address, server) = comments_reset_server().await;
    let mut config = test_config(&address);
    config.unread.desired_count = 1;
    let (scout, sink) = scout_for(config);
    let mut scout = scout.with_cookie(Cookie::from_header("Cookie: user_id=42;"));

    scout.start_pagination();
    scout.drain().await;
    assert_eq!(scout.items().len(), 1);

    assert_eq!(scout.fetch_detail(7), DetailLookup::Fetch);
    let report = scout.drain().await;

    assert_eq!(report.failed, 1);
    assert!(sink
        .statuses()
        .iter()
        .any(|status| status.starts_with("Fail: Transport error: Failed to receive from")));
    assert_eq!(scout.item(7).unwrap().detail, None);
    assert_eq!(scout.fetch_detail(7), DetailLookup::Fetch);

    scout.drain().await;
    server.abort();
}
