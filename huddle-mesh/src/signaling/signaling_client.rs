use anyhow::Result;
use async_trait::async_trait;
use huddle_core::{JoinResponse, PeerId, PollResponse, RoomId, SignalEnvelope};

/// Request/response client to the external signaling service. Holds no
/// session state; every call may fail with a transient network error,
/// which the caller logs and retries on the next poll cycle.
#[async_trait]
pub trait SignalingClient: Send + Sync {
    /// Announce ourselves to a room and learn which peers are already
    /// present.
    async fn join(&self, room: &RoomId, local: PeerId) -> Result<JoinResponse>;

    /// Drain queued signaling traffic addressed to us: at most one offer
    /// and one answer per cycle, plus any queued candidates.
    async fn poll(&self, room: &RoomId, local: PeerId) -> Result<PollResponse>;

    /// Submit an offer/answer/candidate envelope for another peer.
    async fn send(&self, envelope: &SignalEnvelope) -> Result<()>;
}
