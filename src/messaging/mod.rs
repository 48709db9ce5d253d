//! Messaging Module
//!
//! In-process producer/consumer pair over a tokio channel. The receiver uses
//! the cache to drop messages it has already handled within the dedup
//! window. There is no broker and no redelivery.

mod message;
mod receiver;
mod sender;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::error::CacheError;

pub use message::Message;
pub use receiver::{Delivery, Receiver};
pub use sender::Sender;

/// Name of the demo queue, used as the dedup key prefix.
pub const QUEUE_NAME: &str = "message";

/// Errors raised while sending or handling a message.
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Malformed message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Channel closed")]
    ChannelClosed,
}

/// Creates a connected sender and the raw inbox a [`Receiver`] drains.
pub fn channel() -> (Sender, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender::new(tx), rx)
}
