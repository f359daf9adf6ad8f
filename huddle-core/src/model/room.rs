use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Room code, case-normalized so "abc123" and "ABC123" name the same room.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Local participant identity for the lifetime of one joined room.
#[derive(Debug, Clone)]
pub struct RoomMembership {
    pub local_peer_id: PeerId,
    pub room: RoomId,
    pub display_name: String,
}

impl RoomMembership {
    pub fn new(display_name: &str, room: RoomId) -> Self {
        Self {
            local_peer_id: PeerId::new(),
            room,
            display_name: display_name.trim().to_string(),
        }
    }
}
