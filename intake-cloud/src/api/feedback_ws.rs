//! Feedback change feed over WebSocket
//!
//! GET /api/feedback/ws?token=<JWT>
//! Auth: JWT in the query string (browser WebSockets cannot set headers),
//! evaluator role required.
//!
//! Protocol (server → client, JSON text frames of `FeedMessage`):
//! - `snapshot` with every feedback row, sent on connect, after a lag and
//!   after the upstream listener reconnects
//! - `change` with one INSERT / UPDATE / DELETE event

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::feed::FeedMessage;
use shared::models::Role;
use tokio::time::Duration;
use uuid::Uuid;

use crate::auth::authorize;
use crate::error::ServiceError;
use crate::live::{FeedEvent, FeedbackSubscription};
use crate::review;
use crate::state::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

pub async fn handle_feedback_ws(
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ServiceError> {
    let session = authorize(&state, Some(&query.token), Role::Evaluator).await?;
    Ok(ws.on_upgrade(move |socket| feedback_ws_session(socket, state, session.user_id)))
}

/// Subscribe first, then load: a change landing between the two shows up
/// both in the snapshot and as an event, never in neither.
async fn resync(state: &AppState) -> Option<(FeedbackSubscription, FeedMessage)> {
    let subscription = review::subscribe_feedback(state);
    match review::load_feedback(state).await {
        Ok(feedback) => Some((subscription, FeedMessage::Snapshot { feedback })),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load feedback snapshot");
            None
        }
    }
}

async fn feedback_ws_session(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut sink, mut stream) = socket.split();
    tracing::info!(user_id = %user_id, "Feedback WS connected");

    let Some((mut subscription, snapshot)) = resync(&state).await else {
        return;
    };
    if send_message(&mut sink, &snapshot).await.is_err() {
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = subscription.next() => {
                match event {
                    Some(FeedEvent::Change(change)) => {
                        if send_message(&mut sink, &FeedMessage::Change { change }).await.is_err() {
                            break;
                        }
                    }
                    Some(stale @ (FeedEvent::Lagged(_) | FeedEvent::Resync)) => {
                        tracing::warn!(user_id = %user_id, event = ?stale, "Feedback view stale, resending snapshot");
                        let Some((fresh, snapshot)) = resync(&state).await else {
                            break;
                        };
                        subscription.unsubscribe();
                        subscription = fresh;
                        if send_message(&mut sink, &snapshot).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    subscription.unsubscribe();
    tracing::info!(user_id = %user_id, "Feedback WS disconnected");
}

async fn send_message<S>(sink: &mut S, msg: &FeedMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
