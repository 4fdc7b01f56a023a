// src/server/dev_server.rs

//! Development server with live reload.
//!
//! Provides a small HTTP server that:
//! - serves the output tree from `serve_root`
//! - redirects `/` to the configured start page
//! - injects a reload script into every HTML response
//! - streams `reload` Server-Sent Events after each finished build

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::map_response;
use axum::response::sse::{Event, KeepAlive};
use axum::response::{IntoResponse, Redirect, Response, Sse};
use axum::routing::get;
use axum::Router;
use regex::Regex;
use tokio::net::TcpListener;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::server::notifier::{ReloadNotifier, ServerNotification};

/// Path of the SSE endpoint the injected script subscribes to.
pub const RELOAD_ENDPOINT: &str = "/__sitepipe/reload";

/// Largest HTML body we buffer for script injection.
const MAX_INJECT_BYTES: usize = 16 * 1024 * 1024;

const RELOAD_SCRIPT: &str = r#"<script>
(function () {
  var source = new EventSource('/__sitepipe/reload');
  source.addEventListener('reload', function () { window.location.reload(); });
  source.addEventListener('close', function () { source.close(); });
  window.addEventListener('beforeunload', function () { source.close(); });
})();
</script>
"#;

static BODY_CLOSE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)</body\s*>").ok());

#[derive(Clone)]
struct DevServerState {
    notifier: ReloadNotifier,
    start_url: String,
}

/// Development server for viewing build output with live reload.
#[derive(Debug, Clone)]
pub struct DevServer {
    notifier: ReloadNotifier,
    port: u16,
    serve_root: PathBuf,
    start_path: String,
}

impl DevServer {
    pub fn new(cfg: &ServerConfig, notifier: ReloadNotifier) -> Self {
        Self {
            notifier,
            port: cfg.port,
            serve_root: cfg.serve_root.clone(),
            start_path: cfg.start_path.clone(),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.port))
    }

    /// URL `/` redirects to.
    pub fn start_url(&self) -> String {
        format!("/{}", self.start_path.trim_start_matches('/'))
    }

    pub fn router(&self) -> Router {
        let state = DevServerState {
            notifier: self.notifier.clone(),
            start_url: self.start_url(),
        };

        Router::new()
            .route(RELOAD_ENDPOINT, get(sse_handler))
            .route("/", get(redirect_to_start))
            .fallback_service(ServeDir::new(&self.serve_root))
            .layer(map_response(inject_into_html))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind the listening socket. Failure here is a startup error.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.addr();
        TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding dev server to http://{addr}"))
    }

    /// Serve until `shutdown_signal` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let app = self.router();
        let local = listener.local_addr()?;

        info!("dev server listening on http://{}", local);
        println!("Serving {} at http://{}{}", self.serve_root.display(), local, self.start_url());

        let notifier = self.notifier.clone();
        let wrapped_shutdown = async move {
            shutdown_signal.await;
            notifier.shutdown();
            // Give SSE streams time to deliver the close event.
            tokio::time::sleep(Duration::from_millis(100)).await;
        };

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(wrapped_shutdown)
            .await?;

        info!("dev server shut down");
        Ok(())
    }
}

async fn redirect_to_start(State(state): State<DevServerState>) -> Redirect {
    Redirect::temporary(&state.start_url)
}

async fn sse_handler(
    State(state): State<DevServerState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.notifier.subscribe());

    let mut saw_shutdown = false;
    let stream = stream.filter_map(move |result| match result {
        Ok(ServerNotification::Reload { class }) => {
            Some(Ok(Event::default().event("reload").data(class.name())))
        }
        Ok(ServerNotification::Shutdown) => {
            if saw_shutdown {
                None
            } else {
                saw_shutdown = true;
                Some(Ok(Event::default().event("close").data("shutdown")))
            }
        }
        // Lagged behind; reload anyway.
        Err(_) => Some(Ok(Event::default().event("reload").data("lagged"))),
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn inject_into_html(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"));
    if !is_html || response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_INJECT_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "could not buffer HTML response for reload injection");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject_reload_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

/// Insert the reload script before the last `</body>`, or append it when the
/// document has no body close tag.
pub fn inject_reload_script(html: &str) -> String {
    let at = BODY_CLOSE
        .as_ref()
        .and_then(|re| re.find_iter(html).last())
        .map(|m| m.start());

    match at {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + RELOAD_SCRIPT.len());
            out.push_str(&html[..idx]);
            out.push_str(RELOAD_SCRIPT);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{RELOAD_SCRIPT}"),
    }
}
