//! Message consumer with cache-backed deduplication.

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::Cache;
use crate::messaging::{Message, MessagingError, QUEUE_NAME};

/// Outcome of handling one raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// First sighting within the dedup window
    Processed(Message),
    /// Id already seen; the payload was dropped
    Duplicate(u64),
}

/// Consumes messages, remembering handled ids in the cache.
#[derive(Debug, Clone)]
pub struct Receiver {
    cache: Cache,
    dedup_ttl: i64,
}

impl Receiver {
    /// `dedup_ttl` is in seconds; zero or negative remembers ids forever
    /// (until evicted).
    pub fn new(cache: Cache, dedup_ttl: i64) -> Self {
        Self { cache, dedup_ttl }
    }

    /// Decodes and handles a single payload.
    pub fn process(&self, raw: &str) -> Result<Delivery, MessagingError> {
        let message: Message = serde_json::from_str(raw)?;
        let seen_key = format!("{}:seen:{}", QUEUE_NAME, message.id);

        // The counter is atomic under the cache lock, so exactly one
        // delivery of an id observes 1
        if self.cache.increment(&seen_key, 1)? > 1 {
            debug!(id = message.id, "dropping duplicate message");
            return Ok(Delivery::Duplicate(message.id));
        }
        self.cache.expire(&seen_key, self.dedup_ttl)?;

        info!(
            queue = QUEUE_NAME,
            id = message.id,
            body = %message.body,
            received_at = %Utc::now().to_rfc3339(),
            "received message"
        );
        Ok(Delivery::Processed(message))
    }

    /// Drains `inbox` until every sender is dropped.
    ///
    /// Malformed payloads are logged and skipped. Returns how many messages
    /// were processed.
    pub async fn run(self, mut inbox: mpsc::UnboundedReceiver<String>) -> usize {
        let mut processed = 0;
        while let Some(raw) = inbox.recv().await {
            match self.process(&raw) {
                Ok(Delivery::Processed(_)) => processed += 1,
                Ok(Delivery::Duplicate(_)) => {}
                Err(err) => warn!(error = %err, "failed to handle message"),
            }
        }
        info!(processed, "message inbox closed");
        processed
    }
}
