//! Per-socket task
//!
//! Each upgraded WebSocket gets one task that shuttles frames between the
//! socket and the hub and keeps the connection honest with a ping heartbeat.
//! The task never looks at the timer, it only reports [`Input`]s.

use std::fmt;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::Receiver;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::model::{
    client::{ClientConnection, ClientId, Frame},
    input::Input,
};
use crate::service::HubHandle;

/// Heartbeat periods below this are raised to it.
pub const MIN_HEARTBEAT: Duration = Duration::from_millis(50);

/// Missed heartbeat periods before a silent peer is dropped.
const STALE_AFTER_PERIODS: u32 = 2;

enum Closed {
    ByPeer,
    Stale,
    HubGone,
    Transport(axum::Error),
}

impl fmt::Display for Closed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Closed::ByPeer => write!(f, "closed by peer"),
            Closed::Stale => write!(f, "no traffic within heartbeat window"),
            Closed::HubGone => write!(f, "hub has shut down"),
            Closed::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

/// Runs one client connection until it closes, then deregisters it.
pub async fn serve(socket: WebSocket, hub: HubHandle, heartbeat: Duration) {
    let (conn, outbound) = ClientConnection::channel(ClientId::next());
    let id = conn.id;

    if hub.send(Input::Connected(conn)).is_err() {
        warn!(client = %id, "hub has shut down, dropping connection");
        return;
    }

    let reason = pump(socket, id, &hub, outbound, heartbeat.max(MIN_HEARTBEAT)).await;
    match &reason {
        Closed::Transport(_) => warn!(client = %id, %reason, "connection failed"),
        _ => debug!(client = %id, %reason, "connection ended"),
    }

    // Dropping `outbound` above already marked the handle closed, so the
    // hub skips it even before this arrives.
    let _ = hub.send(Input::Disconnected(id));
}

async fn pump(
    socket: WebSocket,
    id: ClientId,
    hub: &HubHandle,
    mut outbound: Receiver<Frame>,
    heartbeat: Duration,
) -> Closed {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let mut ticker = time::interval_at(Instant::now() + heartbeat, heartbeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            frame = ws_receiver.next() => {
                last_seen = Instant::now();
                let text = match frame {
                    None => return Closed::ByPeer,
                    Some(Err(e)) => return Closed::Transport(e),
                    Some(Ok(Message::Close(_))) => return Closed::ByPeer,
                    // Pings are answered by the socket itself.
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                    Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => text,
                        Err(_) => {
                            warn!(client = %id, len = bytes.len(), "discarding non UTF-8 binary frame");
                            continue;
                        }
                    },
                };

                if hub.send(Input::Message(id, text)).is_err() {
                    return Closed::HubGone;
                }
            }

            Some(frame) = outbound.recv() => {
                if let Err(e) = ws_sender.send(Message::Text(frame)).await {
                    return Closed::Transport(e);
                }
            }

            _ = ticker.tick() => {
                if last_seen.elapsed() >= heartbeat * STALE_AFTER_PERIODS {
                    let _ = ws_sender.send(Message::Close(None)).await;
                    return Closed::Stale;
                }
                if let Err(e) = ws_sender.send(Message::Ping(Bytes::new())).await {
                    return Closed::Transport(e);
                }
            }
        }
    }
}
