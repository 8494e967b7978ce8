//! Bridges PostgreSQL `NOTIFY feedback_changes` into the [`FeedbackHub`]
//!
//! The trigger only sends `{op, id}`; inserted and updated rows are read
//! back by id before they are published.

use serde::Deserialize;
use shared::feed::FeedbackChange;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::time::Duration;
use uuid::Uuid;

use super::FeedbackHub;
use crate::db::feedback;
use crate::error::BoxError;

pub const CHANNEL: &str = "feedback_changes";

const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum Op {
    Insert,
    Update,
    Delete,
}

/// Payload built by the `notify_feedback_change()` trigger
#[derive(Debug, PartialEq, Eq, Deserialize)]
struct NotifyPayload {
    op: Op,
    id: Uuid,
}

fn parse_payload(raw: &str) -> Result<NotifyPayload, BoxError> {
    Ok(serde_json::from_str(raw)?)
}

/// Turn a notification into a change; `None` when the row is already gone
async fn resolve(pool: &PgPool, payload: NotifyPayload) -> Result<Option<FeedbackChange>, sqlx::Error> {
    let NotifyPayload { op, id } = payload;
    if op == Op::Delete {
        return Ok(Some(FeedbackChange::Delete { id }));
    }
    let Some(record) = feedback::find_by_id(pool, id).await? else {
        return Ok(None);
    };
    Ok(Some(match op {
        Op::Insert => FeedbackChange::Insert { record },
        _ => FeedbackChange::Update { record },
    }))
}

async fn forward(pool: &PgPool, hub: &FeedbackHub, raw: &str) {
    let payload = match parse_payload(raw) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring feedback notification");
            return;
        }
    };
    let id = payload.id;
    match resolve(pool, payload).await {
        Ok(Some(change)) => {
            tracing::debug!(id = %change.id(), "Feedback change");
            hub.publish(change);
        }
        Ok(None) => tracing::debug!(id = %id, "Feedback row gone before it was read"),
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Failed to read changed feedback row");
            hub.request_resync();
        }
    }
}

/// Start listening and forward every change to the hub.
///
/// When the connection drops, notifications sent meanwhile are lost, so
/// subscribers are asked to resync once the listener is back.
pub async fn spawn(pool: &PgPool, hub: FeedbackHub) -> Result<(), BoxError> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(CHANNEL).await?;
    tracing::info!(channel = CHANNEL, "Feedback change feed listening");

    let pool = pool.clone();
    tokio::spawn(async move {
        loop {
            match listener.try_recv().await {
                Ok(Some(notification)) => forward(&pool, &hub, notification.payload()).await,
                // Connection lost; the next try_recv reconnects
                Ok(None) => {
                    tracing::warn!("Feedback listener connection lost, reconnecting");
                    hub.request_resync();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Feedback listener error");
                    tokio::time::sleep(RETRY_DELAY).await;
                    hub.request_resync();
                }
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trigger_payloads() {
        let insert = r#"{"op":"INSERT","id":"00000000-0000-0000-0000-000000000001"}"#;
        assert_eq!(
            parse_payload(insert).unwrap(),
            NotifyPayload {
                op: Op::Insert,
                id: Uuid::from_u128(1)
            }
        );

        let delete = r#"{"op":"DELETE","id":"00000000-0000-0000-0000-000000000002"}"#;
        assert_eq!(parse_payload(delete).unwrap().op, Op::Delete);
        assert_eq!(
            parse_payload(r#"{"op":"UPDATE","id":"00000000-0000-0000-0000-000000000002"}"#)
                .unwrap()
                .op,
            Op::Update
        );
    }

    #[test]
    fn rejects_unknown_ops() {
        assert!(parse_payload(r#"{"op":"TRUNCATE","id":"00000000-0000-0000-0000-000000000001"}"#).is_err());
        assert!(parse_payload("not json").is_err());
    }

    #[test]
    fn migration_notifies_ids_only() {
        let sql = include_str!("../../migrations/0002_notify_ids_only.sql");
        assert!(!sql.contains("row_to_json"));
        assert!(sql.contains("json_build_object('op', TG_OP, 'id', NEW.id)"));
    }
}
