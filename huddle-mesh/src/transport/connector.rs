use crate::transport::LinkEvent;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use huddle_core::PeerId;
use tokio::sync::mpsc;

/// One reliable, ordered byte channel to a single peer.
#[async_trait]
pub trait DataLink: Send + Sync {
    async fn send(&self, data: Bytes) -> Result<()>;
}

/// One point-to-point connection under negotiation or established.
/// Exclusively owned by a single peer session.
#[async_trait]
pub trait PeerLink: Send + Sync {
    /// Create the local byte-channel intent and an offer description,
    /// set it as the local description, and return it.
    async fn create_offer(&self) -> Result<String>;

    /// Apply a remote offer, produce an answer description, set it as
    /// the local description, and return it.
    async fn accept_offer(&self, sdp: String) -> Result<String>;

    /// Apply a remote answer description.
    async fn apply_answer(&self, sdp: String) -> Result<()>;

    /// Apply a remote connectivity candidate.
    async fn add_candidate(&self, candidate: String) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Factory for connection primitives. Lifecycle notifications for every
/// link it creates are delivered on the supplied event channel.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn connect(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Box<dyn PeerLink>>;
}
