mod common;

use std::net::SocketAddr;

use common::{TestApp, spawn_app};
use futures::StreamExt;
use http::StatusCode;
use serde_json::json;
use shared::feed::{FeedMessage, FeedbackChange};
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serve the router on an ephemeral port
async fn serve(app: &TestApp) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    addr
}

async fn connect(addr: SocketAddr, token: &str) -> Result<WsStream, tungstenite::Error> {
    let url = format!("ws://{addr}/api/feedback/ws?token={token}");
    connect_async(url.as_str()).await.map(|(ws, _)| ws)
}

async fn next_message(ws: &mut WsStream) -> FeedMessage {
    loop {
        let frame = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("feed message in time")
            .expect("stream open")
            .expect("valid frame");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

fn rejected_status(err: tungstenite::Error) -> StatusCode {
    match err {
        tungstenite::Error::Http(response) => response.status(),
        other => panic!("expected an HTTP rejection, got {other}"),
    }
}

#[tokio::test]
async fn snapshot_first_then_live_changes() {
    let app = spawn_app();
    let (dev, _) = app.account("ada@example.com", "developer").await;
    let (evaluator, _) = app.account("grace@example.com", "evaluator").await;
    let submission = app.submit(&dev, "ada@example.com").await;
    let id = submission["id"].as_str().unwrap();

    let addr = serve(&app).await;
    let mut ws = connect(addr, &evaluator).await.unwrap();

    match next_message(&mut ws).await {
        FeedMessage::Snapshot { feedback } => assert!(feedback.is_empty()),
        other => panic!("expected snapshot, got {other:?}"),
    }

    let (status, _) = app
        .post_json(
            &format!("/api/submissions/{id}/feedback"),
            Some(&evaluator),
            json!({ "decision": "accepted", "comments": "Great work" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    match next_message(&mut ws).await {
        FeedMessage::Change {
            change: FeedbackChange::Insert { record },
        } => {
            assert_eq!(record.submission_id.to_string(), id);
            assert_eq!(record.comments, "Great work");
        }
        other => panic!("expected insert, got {other:?}"),
    }
}

#[tokio::test]
async fn snapshot_carries_existing_rows_and_is_resent_on_resync() {
    let app = spawn_app();
    let (dev, _) = app.account("ada@example.com", "developer").await;
    let (evaluator, _) = app.account("grace@example.com", "evaluator").await;
    let submission = app.submit(&dev, "ada@example.com").await;
    let id = submission["id"].as_str().unwrap();
    app.post_json(
        &format!("/api/submissions/{id}/feedback"),
        Some(&evaluator),
        json!({ "decision": "rejected", "comments": "" }),
    )
    .await;

    let addr = serve(&app).await;
    let mut ws = connect(addr, &evaluator).await.unwrap();
    match next_message(&mut ws).await {
        FeedMessage::Snapshot { feedback } => assert_eq!(feedback.len(), 1),
        other => panic!("expected snapshot, got {other:?}"),
    }

    app.state.hub.request_resync();
    match next_message(&mut ws).await {
        FeedMessage::Snapshot { feedback } => assert_eq!(feedback.len(), 1),
        other => panic!("expected a fresh snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn closing_the_socket_unsubscribes() {
    let app = spawn_app();
    let (evaluator, _) = app.account("grace@example.com", "evaluator").await;
    let addr = serve(&app).await;

    let mut ws = connect(addr, &evaluator).await.unwrap();
    next_message(&mut ws).await;
    assert_eq!(app.state.hub.subscriber_count(), 1);

    ws.close(None).await.unwrap();
    timeout(Duration::from_secs(5), async {
        while app.state.hub.subscriber_count() != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscription released");
}

#[tokio::test]
async fn bad_or_wrong_role_tokens_are_refused() {
    let app = spawn_app();
    let (dev, _) = app.account("ada@example.com", "developer").await;
    let addr = serve(&app).await;

    let err = connect(addr, "not-a-token").await.unwrap_err();
    assert_eq!(rejected_status(err), StatusCode::UNAUTHORIZED);

    let err = connect(addr, &dev).await.unwrap_err();
    assert_eq!(rejected_status(err), StatusCode::FORBIDDEN);
    assert_eq!(app.state.hub.subscriber_count(), 0);
}
