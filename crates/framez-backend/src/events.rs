//! Session-change fan-out.
//!
//! Every subscriber gets its own unbounded channel. Emission happens under
//! one lock, so all subscribers observe events in the same order, and
//! nothing is dropped for a slow consumer.

use std::sync::{Mutex, PoisonError};

use framez_core::events::AuthEvent;
use tokio::sync::mpsc;

pub type AuthEventReceiver = mpsc::UnboundedReceiver<AuthEvent>;

#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<AuthEvent>>>,
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> AuthEventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber, pruning closed ones.
    pub fn emit(&self, event: &AuthEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        tracing::debug!(
            kind = %event.kind,
            subscribers = subscribers.len(),
            "auth event emitted"
        );
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
