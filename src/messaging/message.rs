//! Message envelope carried over the channel as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender-assigned id, unique per sender
    pub id: u64,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(id: u64, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
            sent_at: Utc::now(),
        }
    }
}
