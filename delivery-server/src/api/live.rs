//! Live order events over WebSocket
//!
//! GET /api/orders/live[?orderId=<id>]
//!
//! Server → client frames:
//! - `{"type":"ready","sequence":n}` once, after subscribing
//! - every [`OrderEvent`], optionally only those of `orderId`
//! - `{"type":"resync","missed":n}` when this client fell behind; it must
//!   refetch and continue from the `ready` that follows
//!
//! Nothing is replayed: a client fetches the orders it cares about after
//! `ready` and applies events with a higher `sequence` only.

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use shared::order::{LiveControl, OrderEvent};
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::core::ServerState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveQuery {
    /// Only forward events for this order
    pub order_id: Option<i64>,
}

pub async fn handle_live_ws(
    State(state): State<ServerState>,
    Query(query): Query<LiveQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| live_session(socket, state, query.order_id))
}

async fn live_session(socket: WebSocket, state: ServerState, order_id: Option<i64>) {
    let (mut sink, mut stream) = socket.split();
    let shutdown = state.bus.shutdown_token();

    let (sequence, mut rx) = state.bus.subscribe_from();
    tracing::info!(?order_id, sequence, "Live subscriber connected");

    if send_message(&mut sink, &LiveControl::Ready { sequence }).await.is_err() {
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = sink
                    .send(Message::Close(Some(CloseFrame {
                        code: close_code::AWAY,
                        reason: "server shutting down".into(),
                    })))
                    .await;
                break;
            }

            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        if passes_filter(order_id, &event)
                            && send_message(&mut sink, &event).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(?order_id, missed, "Live subscriber lagged, requesting resync");
                        let (sequence, fresh) = state.bus.subscribe_from();
                        rx = fresh;
                        if send_message(&mut sink, &LiveControl::Resync { missed }).await.is_err()
                            || send_message(&mut sink, &LiveControl::Ready { sequence }).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    // Clients only listen; text, pings and pongs are ignored
                    _ => {}
                }
            }
        }
    }

    tracing::info!(?order_id, "Live subscriber disconnected");
}

fn passes_filter(order_id: Option<i64>, event: &OrderEvent) -> bool {
    order_id.is_none_or(|id| id == event.order_id())
}

async fn send_message<T: Serialize>(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: &T,
) -> Result<(), ()> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize live frame");
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
