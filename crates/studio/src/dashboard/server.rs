//! axum web server for the stats dashboard.
//!
//! `GET /stats` returns the current metrics snapshot as JSON. `GET /ws`
//! upgrades to a WebSocket that pushes the snapshot every 200 ms and every
//! change batch or rejection as it happens.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;

use super::{BatchView, DashboardState};
use crate::dashboard::metrics::MetricsSnapshot;
use crate::event_bus::StudioEvent;

pub fn router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/stats", get(stats))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

/// Start the dashboard web server. Runs until the process exits.
pub async fn start(state: Arc<DashboardState>, port: u16) {
    let addr = format!("127.0.0.1:{}", port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Dashboard failed to bind to {}: {}", addr, e);
            return;
        }
    };
    tracing::info!("Dashboard listening on http://{}/stats", addr);

    if let Err(e) = axum::serve(listener, router(state)).await {
        tracing::error!("Dashboard server error: {}", e);
    }
}

async fn stats(State(state): State<Arc<DashboardState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Upgrade an HTTP request to a WebSocket connection.
async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<DashboardState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Push metrics and studio events to a connected browser.
async fn handle_socket(mut socket: WebSocket, state: Arc<DashboardState>) {
    let mut events = state.subscribe();
    let mut ticker = tokio::time::interval(Duration::from_millis(200));

    loop {
        tokio::select! {
            // Push metrics every 200 ms.
            _ = ticker.tick() => {
                let msg = serde_json::json!({
                    "type": "metrics",
                    "data": state.metrics.snapshot(),
                });
                if send_json(&mut socket, &msg).await.is_err() {
                    break;
                }
            }

            // Forward every change batch and rejection.
            event = events.recv() => {
                let msg = match event {
                    Ok(StudioEvent::Changes(batch)) => serde_json::json!({
                        "type": "changes",
                        "data": BatchView::from(&batch),
                    }),
                    Ok(StudioEvent::Rejected(notice)) => serde_json::json!({
                        "type": "rejected",
                        "data": {
                            "cell": [notice.cell.x, notice.cell.level, notice.cell.z],
                            "reason": notice.reason,
                            "visible_ms": notice.visible_for.as_millis() as u64,
                        },
                    }),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Dashboard client lagged, skipped {} events", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if send_json(&mut socket, &msg).await.is_err() {
                    break;
                }
            }

            // Drain any incoming messages (ping/pong, close).
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {} // ignore pings, text, etc.
                }
            }
        }
    }
}

async fn send_json(socket: &mut WebSocket, value: &serde_json::Value) -> Result<(), ()> {
    let text = value.to_string();
    socket.send(Message::Text(text.into())).await.map_err(|_| ())
}
