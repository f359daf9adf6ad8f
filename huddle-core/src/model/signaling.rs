use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Payload half of a signaling envelope, opaque to the signaling service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum SignalPayload {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    IceCandidate {
        candidate: String,
        sdp_mid: Option<String>,
        sdp_m_line_index: Option<u16>,
    },
}

/// Unit submitted to the signaling service, addressed peer to peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEnvelope {
    pub room: RoomId,
    pub from: PeerId,
    pub to: PeerId,
    #[serde(flatten)]
    pub payload: SignalPayload,
}

/// Result of announcing ourselves to a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub success: bool,
    #[serde(default)]
    pub peers: Vec<PeerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingOffer {
    pub from: PeerId,
    pub offer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingAnswer {
    pub from: PeerId,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingCandidate {
    pub from: PeerId,
    pub candidate: String,
}

/// One poll cycle's worth of queued signaling traffic: at most one offer
/// and one answer, plus any number of candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollResponse {
    pub offer: Option<IncomingOffer>,
    pub answer: Option<IncomingAnswer>,
    #[serde(default)]
    pub ice_candidates: Vec<IncomingCandidate>,
}
