use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{ws::WebSocketUpgrade, FromRequestParts, Request, State},
    handler::HandlerWithoutStateExt,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::connection;
use crate::service::{self, HubHandle, TimerService};
use crate::util::{init_log, lan_address};

#[derive(Clone)]
struct AppState {
    hub: HubHandle,
    public_dir: Arc<PathBuf>,
    heartbeat: Duration,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    init_log();

    let config = Config::from_env().context("reading configuration")?;
    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;

    info!(
        port = config.port,
        public_dir = %config.public_dir.display(),
        "server is running"
    );
    info!("Connect a browser to http://{}:{}", lan_address(), config.port);

    axum::serve(listener, app(&config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("server stopped");
    Ok(())
}

/// Builds the router and spawns the hub it talks to.
///
/// Must be called from within a Tokio runtime. The hub stops once the router
/// and every connection task are gone.
pub fn app(config: &Config) -> Router {
    let (hub, rx) = service::channel();
    tokio::spawn(service::run(TimerService::new(), rx));

    let state = AppState {
        hub,
        public_dir: Arc::new(config.public_dir.clone()),
        heartbeat: config.heartbeat_interval,
    };

    Router::new()
        .fallback(web_request)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Upgrades WebSocket handshakes on any path, serves everything else from
/// the asset directory.
async fn web_request(State(state): State<AppState>, request: Request) -> Response {
    let (mut parts, body) = request.into_parts();

    if is_websocket_upgrade(&parts.headers) {
        return match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
            Ok(ws) => {
                let AppState { hub, heartbeat, .. } = state;
                ws.on_upgrade(move |socket| connection::serve(socket, hub, heartbeat))
            }
            Err(rejection) => rejection.into_response(),
        };
    }

    let assets =
        ServeDir::new(state.public_dir.as_path()).not_found_service(not_found.into_service());
    match assets.oneshot(Request::from_parts(parts, body)).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404: File not found")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
