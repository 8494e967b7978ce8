//! FeedbackHub — live feedback change feed
//!
//! ```text
//! PostgreSQL trigger ── NOTIFY feedback_changes ──► pg_listener task ─┐
//! MemoryStore writes ─────────────────────────────────────────────────┤
//!                                                                     ▼
//!                                                           FeedbackHub (broadcast)
//!                                                                     │
//!                                            FeedbackSubscription ◄───┘ (one per evaluator screen)
//! ```

pub mod pg_listener;

use shared::feed::FeedbackChange;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Broadcast channel capacity — enough to absorb a burst of decisions
const BROADCAST_CAPACITY: usize = 256;

/// Event yielded by a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Change(FeedbackChange),
    /// The subscriber fell behind and `n` changes were dropped; the
    /// local list must be reloaded.
    Lagged(u64),
    /// The upstream source lost changes (listener reconnect); reload.
    Resync,
}

#[derive(Debug, Clone)]
enum Signal {
    Change(FeedbackChange),
    Resync,
}

/// Fan-out point for feedback table changes
#[derive(Clone)]
pub struct FeedbackHub {
    tx: broadcast::Sender<Signal>,
}

impl Default for FeedbackHub {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Publish a change to every current subscriber
    pub fn publish(&self, change: FeedbackChange) {
        // No subscribers is not an error
        let _ = self.tx.send(Signal::Change(change));
    }

    /// Tell every subscriber its view may be stale
    pub fn request_resync(&self) {
        let _ = self.tx.send(Signal::Resync);
    }

    pub fn subscribe(&self) -> FeedbackSubscription {
        FeedbackSubscription {
            rx: self.tx.subscribe(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One consumer of the change feed.
///
/// Events arrive in emission order. Dropping the subscription or calling
/// [`unsubscribe`](Self::unsubscribe) detaches it from the hub; cancelling
/// its token from another task ends a pending [`next`](Self::next).
pub struct FeedbackSubscription {
    rx: broadcast::Receiver<Signal>,
    cancel: CancellationToken,
}

impl FeedbackSubscription {
    /// Next event, or `None` once cancelled or the hub is gone
    pub async fn next(&mut self) -> Option<FeedEvent> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            received = self.rx.recv() => match received {
                Ok(Signal::Change(change)) => Some(FeedEvent::Change(change)),
                Ok(Signal::Resync) => Some(FeedEvent::Resync),
                Err(broadcast::error::RecvError::Lagged(n)) => Some(FeedEvent::Lagged(n)),
                Err(broadcast::error::RecvError::Closed) => None,
            },
        }
    }

    /// Token that ends this subscription when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Explicitly detach from the hub
    pub fn unsubscribe(self) {
        self.cancel.cancel();
    }
}
