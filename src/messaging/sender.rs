//! Message producer.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::info;

use crate::messaging::{Message, MessagingError, QUEUE_NAME};

/// Publishes JSON-encoded messages onto the channel.
#[derive(Debug)]
pub struct Sender {
    tx: mpsc::UnboundedSender<String>,
    next_id: AtomicU64,
}

impl Sender {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            tx,
            next_id: AtomicU64::new(1),
        }
    }

    /// Sends `body` under a fresh id and returns the envelope.
    pub fn send(&self, body: impl Into<String>) -> Result<Message, MessagingError> {
        let message = Message::new(self.next_id.fetch_add(1, Ordering::Relaxed), body);
        self.send_message(&message)?;
        Ok(message)
    }

    /// Sends an existing envelope as-is, e.g. to redeliver it.
    pub fn send_message(&self, message: &Message) -> Result<(), MessagingError> {
        let payload = serde_json::to_string(message)?;
        info!(
            queue = QUEUE_NAME,
            id = message.id,
            sent_at = %message.sent_at.to_rfc3339(),
            "sending message"
        );
        self.tx
            .send(payload)
            .map_err(|_| MessagingError::ChannelClosed)
    }
}
