//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alist_proxy::config::ProxyConfig;
use alist_proxy::http::HttpServer;
use alist_proxy::lifecycle::Shutdown;
use alist_proxy::signing::Signer;
use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

pub const TOKEN: &str = "alist-test-token";

/// One call the stub link API received.
#[derive(Debug, Clone)]
pub struct LinkCall {
    pub path: String,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
}

pub type LinkCalls = Arc<Mutex<Vec<LinkCall>>>;

type LinkFn = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// Bind an ephemeral port without serving yet.
pub async fn reserve() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Serve `router` on an already bound listener.
pub fn serve_on(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
}

/// Serve `router` on a fresh port.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let (listener, addr) = reserve().await;
    serve_on(listener, router);
    addr
}

/// Stub of the `/api/fs/link` endpoint. `links` maps a path to the JSON
/// envelope to answer with.
pub fn link_api<F>(links: F) -> (Router, LinkCalls)
where
    F: Fn(&str) -> Value + Send + Sync + 'static,
{
    let calls: LinkCalls = Arc::default();
    let links: LinkFn = Arc::new(links);

    let router = Router::new()
        .route(
            "/api/fs/link",
            post(
                |State((links, calls)): State<(LinkFn, LinkCalls)>,
                 headers: HeaderMap,
                 Json(body): Json<Value>| async move {
                    let path = body["path"].as_str().unwrap_or_default().to_string();
                    let header = |name: &str| {
                        headers
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string)
                    };
                    calls.lock().unwrap().push(LinkCall {
                        path: path.clone(),
                        authorization: header("authorization"),
                        user_agent: header("user-agent"),
                        content_type: header("content-type"),
                    });
                    Json(links(&path))
                },
            ),
        )
        .with_state((links, calls.clone()));

    (router, calls)
}

/// Success envelope for `url` with extra request headers.
pub fn link_ok(url: &str, header: Value) -> Value {
    serde_json::json!({
        "code": 200,
        "message": "success",
        "data": { "url": url, "header": header }
    })
}

/// Start the proxy against `upstream`.
pub async fn start_proxy(upstream: SocketAddr, user_agent: Option<&str>) -> (SocketAddr, Shutdown) {
    let config = ProxyConfig {
        address: format!("http://{upstream}"),
        token: TOKEN.to_string(),
        user_agent: user_agent.map(str::to_string),
        ..ProxyConfig::default()
    };

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let (listener, addr) = reserve().await;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Non-expiring signature for `path` under the test token.
pub fn sign(path: &str) -> String {
    Signer::new(TOKEN.as_bytes()).sign(path, 0)
}

/// Client that neither uses system proxies nor follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Collects formatted log output emitted on the current thread.
///
/// `#[tokio::test]` runs the proxy's tasks on the test thread, so a scoped
/// subscriber sees every access line.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// Install a capturing subscriber until the guard is dropped.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let buf = capture.0.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || CaptureWriter(buf.clone()))
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        (capture, tracing::subscriber::set_default(subscriber))
    }

    /// Lines written on the `access` target.
    pub fn access_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .filter(|line| line.contains("access:"))
            .map(str::to_string)
            .collect()
    }

    /// Wait briefly for an access line containing `needle`.
    pub async fn wait_for_access(&self, needle: &str) -> Option<String> {
        for _ in 0..100 {
            if let Some(line) = self.access_lines().into_iter().find(|l| l.contains(needle)) {
                return Some(line);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        None
    }
}
