use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Sender name attached to orchestration/diagnostic log entries.
pub const SYSTEM_SENDER: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    /// Produced by the local participant's own send action.
    Own,
    /// Received over a peer data channel.
    Remote,
    /// Orchestration/diagnostic event. Never routed over the wire.
    System,
}

/// One entry in the append-only room log.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: String,
    pub content: String,
    pub timestamp: SystemTime,
    pub origin: MessageOrigin,
}

impl ChatMessage {
    pub fn new(id: u64, sender: &str, content: &str, origin: MessageOrigin) -> Self {
        Self {
            id,
            sender: sender.to_string(),
            content: content.to_string(),
            timestamp: SystemTime::now(),
            origin,
        }
    }
}

/// The only payload that crosses a data channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WirePayload {
    pub sender: String,
    pub content: String,
}
