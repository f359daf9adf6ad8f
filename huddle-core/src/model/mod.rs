mod message;
mod peer;
mod room;
mod signaling;

pub use message::{ChatMessage, MessageOrigin, WirePayload, SYSTEM_SENDER};
pub use peer::PeerId;
pub use room::{RoomId, RoomMembership};
pub use signaling::{
    IceServerConfig, IncomingAnswer, IncomingCandidate, IncomingOffer, JoinResponse, PollResponse,
    SignalEnvelope, SignalPayload,
};
