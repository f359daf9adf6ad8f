pub mod bus;
pub mod error;
pub mod mesh;
pub mod signaling;
pub mod transport;

pub use bus::MessageBus;
pub use error::MeshError;
pub use mesh::{MeshCommand, PeerStatus, RoomHandle, RoomStatus, SessionRole, SessionState, join_room};
pub use signaling::{HttpSignaling, SignalingClient};
pub use transport::{DataLink, LinkEvent, PeerConnector, PeerLink, TransportConfig, WebRtcConnector};
