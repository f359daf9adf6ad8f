use thiserror::Error;

/// Errors surfaced at the presentation boundary. Session-level failures
/// never appear here; they degrade the mesh one link at a time and show
/// up as system diagnostics in the room log.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("display name must not be empty")]
    EmptyDisplayName,
    #[error("room id must not be empty")]
    EmptyRoomId,
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("join rejected by signaling server")]
    JoinRejected,
    #[error("signaling request failed: {0}")]
    Signaling(String),
    #[error("room is closed")]
    RoomClosed,
}
