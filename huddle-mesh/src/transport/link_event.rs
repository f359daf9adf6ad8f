use crate::transport::DataLink;
use bytes::Bytes;
use huddle_core::PeerId;
use std::sync::Arc;

/// Asynchronous notifications from a connection primitive, funneled into
/// the coordinator's event loop so they share one serialization point
/// with poll results and user commands.
pub enum LinkEvent {
    /// The link is fully established.
    Connected(PeerId),
    /// The link failed, disconnected, or was closed by the remote side.
    Disconnected(PeerId),
    /// The reliable ordered byte channel is open and writable.
    ChannelReady(PeerId, Arc<dyn DataLink>),
    /// An opaque payload arrived on the channel.
    Message(PeerId, Bytes),
    /// A local connectivity candidate is ready to be signaled out.
    CandidateGenerated(PeerId, String),
}
