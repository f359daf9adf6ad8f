use crate::transport::DataLink;
use bytes::Bytes;
use huddle_core::{ChatMessage, MessageOrigin, PeerId, SYSTEM_SENDER, WirePayload};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Fan-out of outgoing chat text to every open channel, fan-in of inbound
/// payloads into one ordered log and event stream. Owned by the
/// coordinator task; never touched from two notification sources at once.
pub struct MessageBus {
    channels: HashMap<PeerId, Arc<dyn DataLink>>,
    log: Vec<ChatMessage>,
    next_id: u64,
    events: mpsc::UnboundedSender<ChatMessage>,
}

impl MessageBus {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChatMessage>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let bus = Self {
            channels: HashMap::new(),
            log: Vec::new(),
            next_id: 0,
            events,
        };
        (bus, events_rx)
    }

    /// Make a peer's open channel a broadcast target.
    pub fn register(&mut self, peer_id: PeerId, channel: Arc<dyn DataLink>) {
        self.channels.insert(peer_id, channel);
    }

    pub fn unregister(&mut self, peer_id: &PeerId) {
        self.channels.remove(peer_id);
    }

    pub fn is_registered(&self, peer_id: &PeerId) -> bool {
        self.channels.contains_key(peer_id)
    }

    /// Broadcast one chat line to every registered channel. Returns the
    /// number of successful sends; the local echo is appended only when
    /// at least one send succeeded.
    pub async fn broadcast(&mut self, sender: &str, content: &str) -> usize {
        if self.channels.is_empty() {
            self.system("no connected peers, message not sent");
            return 0;
        }

        let payload = WirePayload {
            sender: sender.to_string(),
            content: content.to_string(),
        };
        let bytes = match serde_json::to_vec(&payload) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                error!("failed to serialize outgoing payload: {e}");
                return 0;
            }
        };

        let mut sent = 0;
        for (peer_id, channel) in &self.channels {
            match channel.send(bytes.clone()).await {
                Ok(()) => sent += 1,
                Err(e) => error!("send to peer {peer_id} failed: {e}"),
            }
        }

        if sent > 0 {
            self.append(sender, content, MessageOrigin::Own);
        } else {
            self.system("all sends failed, message not delivered");
        }
        sent
    }

    /// Parse an inbound channel payload and append it to the log. Returns
    /// the sender name on success; malformed payloads are dropped.
    pub fn deliver(&mut self, peer_id: PeerId, raw: &[u8]) -> Option<String> {
        match serde_json::from_slice::<WirePayload>(raw) {
            Ok(payload) => {
                self.append(&payload.sender, &payload.content, MessageOrigin::Remote);
                Some(payload.sender)
            }
            Err(e) => {
                warn!("dropping malformed payload from peer {peer_id}: {e}");
                None
            }
        }
    }

    /// Append an orchestration/diagnostic entry. System entries never go
    /// over the wire.
    pub fn system(&mut self, content: &str) {
        self.append(SYSTEM_SENDER, content, MessageOrigin::System);
    }

    pub fn log(&self) -> &[ChatMessage] {
        &self.log
    }

    fn append(&mut self, sender: &str, content: &str, origin: MessageOrigin) {
        let message = ChatMessage::new(self.next_id, sender, content, origin);
        self.next_id += 1;
        // The receiver may be gone (presentation detached); the log is
        // still the source of truth.
        let _ = self.events.send(message.clone());
        self.log.push(message);
    }
}
