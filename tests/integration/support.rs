//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use unread_scout::config::{parse_config, Config, TransportConfig, DEFAULT_CONFIG};

/// The bundled configuration pointed at a local server, with fast pacing
pub fn test_config(address: &SocketAddr) -> Config {
    let mut config = parse_config(DEFAULT_CONFIG).expect("bundled config parses");
    config.site.address = address.ip().to_string();
    config.site.port = address.port();
    config.transport = fast_transport();
    config
}

/// 20 ms polls, ten of them: a receive gives up after 200 ms of silence
pub fn fast_transport() -> TransportConfig {
    TransportConfig {
        poll_interval_ms: 20,
        idle_polls: 10,
        receive_buffer: 64 * 1024,
        connect_timeout_ms: 2_000,
    }
}

pub fn listing_entry(id: u64, title: &str) -> String {
    format!(
        "<li class=\"item\"><a href=\"/element/{}/\"> {} </a><span class=\"rate\" data-rate=\"\"></span></li>\n",
        id, title
    )
}

/// Body of one unread listing page
pub fn listing_body(items: &[(u64, &str)]) -> String {
    let mut body = String::from("<html><body><ul class=\"unread\">\n");
    for (id, title) in items {
        body.push_str(&listing_entry(*id, title));
    }
    body.push_str("</ul></body></html>");
    body
}

/// A keep-alive HTTP reply carrying `body`
pub fn http_reply(body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
    .into_bytes()
}

pub fn description_body(with_related: bool) -> String {
    let mut body = String::from(concat!(
        "<html><body><div class=\"item\">",
        "<h1><span class=\"fn\">Solaris</span></h1>",
        "<div class=\"rating\"><span class=\"average\">8.4</span>",
        " from <span class=\"votes\">1532</span> readers</div>",
        "<p class=\"summary\">A planet that thinks.</p></div>",
    ));
    if with_related {
        body.push_str("<div class=\"tabs\" data-content=\"Похожие книги\">similar</div>");
    }
    body.push_str("</body></html>");
    body
}

pub fn comments_body() -> String {
    concat!(
        "<html><body>",
        "<div class=\"m-comments-item-body\">",
        "<span class=\"m-comments-rating\">10</span>",
        "<div class=\"m-comments-content\">Brilliant.</div></div>",
        "</body></html>"
    )
    .to_string()
}

/// How a scripted server writes its replies
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    /// Bytes per write
    pub chunk: usize,

    /// Pause between writes
    pub gap: Duration,

    /// Requests answered before the server closes a connection
    pub requests_per_connection: usize,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            chunk: usize::MAX,
            gap: Duration::ZERO,
            requests_per_connection: usize::MAX,
        }
    }
}

/// Raw TCP server answering each request with the next scripted reply
///
/// Stops accepting once every reply was sent. The handle yields the
/// requests in arrival order.
pub async fn scripted_server(
    replies: Vec<Vec<u8>>,
    pacing: Pacing,
) -> (SocketAddr, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut replies = replies.into_iter().peekable();
        let mut requests = Vec::new();

        while replies.peek().is_some() {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut served = 0;
            while served < pacing.requests_per_connection {
                let Some(request) = read_request(&mut stream).await else {
                    break;
                };
                let Some(reply) = replies.next() else {
                    break;
                };
                requests.push(request);
                write_paced(&mut stream, &reply, pacing).await;
                served += 1;
            }
        }
        requests
    });

    (address, handle)
}

/// Reads one request, including the body its Content-Length announces
async fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut received = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        if let Some(end) = received.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&received[..end + 4]).into_owned();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("Content-Length: "))
                .and_then(|len| len.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if received.len() >= end + 4 + body_len {
                return Some(String::from_utf8_lossy(&received).into_owned());
            }
        }

        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        received.extend_from_slice(&chunk[..n]);
    }
}

async fn write_paced(stream: &mut TcpStream, reply: &[u8], pacing: Pacing) {
    for piece in reply.chunks(pacing.chunk.max(1)) {
        stream.write_all(piece).await.unwrap();
        stream.flush().await.unwrap();
        if !pacing.gap.is_zero() {
            tokio::time::sleep(pacing.gap).await;
        }
    }
}

/// What a routed server does with a matching request
#[derive(Debug, Clone)]
pub enum Route {
    /// Writes the reply, then closes the connection
    Reply(Vec<u8>),

    /// Resets the connection without replying
    Reset,
}

/// Raw TCP server serving one request per connection, picked by request line
///
/// A request is answered by the first route whose prefix it starts with;
/// unmatched requests are closed without a reply. Runs until aborted.
pub async fn routed_server(routes: Vec<(&'static str, Route)>) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let routes = std::sync::Arc::new(routes);

    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut stream).await else {
                    return;
                };
                let route = routes
                    .iter()
                    .find(|(prefix, _)| request.starts_with(prefix))
                    .map(|(_, route)| route.clone());
                match route {
                    Some(Route::Reply(reply)) => {
                        write_paced(&mut stream, &reply, Pacing::default()).await;
                    }
                    Some(Route::Reset) => {
                        #[allow(deprecated)]
                        let _ = stream.set_linger(Some(Duration::ZERO));
                    }
                    None => {}
                }
            });
        }
    });

    (address, handle)
}
