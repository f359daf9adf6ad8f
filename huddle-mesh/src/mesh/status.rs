use crate::mesh::SessionState;
use huddle_core::PeerId;

#[derive(Debug, Clone)]
pub struct PeerStatus {
    pub peer_id: PeerId,
    pub display_name: String,
    pub state: SessionState,
}

/// Room-wide connectivity summary, recomputed from the session collection
/// after every mutation rather than counted incrementally.
#[derive(Debug, Clone, Default)]
pub struct RoomStatus {
    pub connected_peers: usize,
    pub peers: Vec<PeerStatus>,
    pub summary: String,
}

impl RoomStatus {
    pub fn new(peers: Vec<PeerStatus>) -> Self {
        let connected_peers = peers
            .iter()
            .filter(|p| p.state == SessionState::Connected)
            .count();
        let summary = if connected_peers == 0 {
            "Disconnected".to_string()
        } else {
            format!("Connected to {connected_peers} peer(s)")
        };
        Self {
            connected_peers,
            peers,
            summary,
        }
    }
}
