use crate::error::MeshError;
use crate::mesh::{MeshCommand, MeshCoordinator, RoomStatus};
use crate::signaling::SignalingClient;
use crate::transport::PeerConnector;
use huddle_core::{ChatMessage, RoomId, RoomMembership};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

const COMMAND_BUFFER: usize = 64;

/// Validate inputs, announce ourselves to the signaling service, and
/// spawn the room's coordinator task. The room is not entered when the
/// join is rejected.
pub async fn join_room(
    signaling: Arc<dyn SignalingClient>,
    connector: Arc<dyn PeerConnector>,
    display_name: &str,
    room_code: &str,
) -> Result<RoomHandle, MeshError> {
    if display_name.trim().is_empty() {
        return Err(MeshError::EmptyDisplayName);
    }
    let room = RoomId::new(room_code);
    if room.is_empty() {
        return Err(MeshError::EmptyRoomId);
    }

    let membership = RoomMembership::new(display_name, room.clone());
    let join = signaling
        .join(&room, membership.local_peer_id)
        .await
        .map_err(|e| MeshError::Signaling(e.to_string()))?;
    if !join.success {
        return Err(MeshError::JoinRejected);
    }

    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (status_tx, status_rx) = watch::channel(RoomStatus::default());
    let (coordinator, events_rx) = MeshCoordinator::new(
        membership.clone(),
        signaling,
        connector,
        command_rx,
        status_tx,
    );
    tokio::spawn(coordinator.run(join.peers));

    Ok(RoomHandle {
        membership,
        command_tx,
        status_rx,
        events_rx: Some(events_rx),
    })
}

/// Presentation-boundary handle to an active room.
pub struct RoomHandle {
    membership: RoomMembership,
    command_tx: mpsc::Sender<MeshCommand>,
    status_rx: watch::Receiver<RoomStatus>,
    events_rx: Option<mpsc::UnboundedReceiver<ChatMessage>>,
}

impl RoomHandle {
    pub fn membership(&self) -> &RoomMembership {
        &self.membership
    }

    /// Latest connectivity summary, updated after every mesh mutation.
    pub fn status(&self) -> watch::Receiver<RoomStatus> {
        self.status_rx.clone()
    }

    /// The ordered message stream. Can be taken once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ChatMessage>> {
        self.events_rx.take()
    }

    /// Broadcast a chat line to every connected peer. Resolves to the
    /// number of peers the message was transmitted to.
    pub async fn send_message(&self, text: &str) -> Result<usize, MeshError> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(MeshCommand::Send {
                text: text.to_string(),
                reply,
            })
            .await
            .map_err(|_| MeshError::RoomClosed)?;
        response.await.map_err(|_| MeshError::RoomClosed)?
    }

    /// Snapshot of the append-only room log.
    pub async fn log_snapshot(&self) -> Result<Vec<ChatMessage>, MeshError> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(MeshCommand::Snapshot { reply })
            .await
            .map_err(|_| MeshError::RoomClosed)?;
        response.await.map_err(|_| MeshError::RoomClosed)
    }

    /// Tear the room down: the poll cycle stops, every link is closed,
    /// and the connectivity summary resets to zero. Resolves once
    /// teardown has completed.
    pub async fn leave(&self) -> Result<(), MeshError> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(MeshCommand::Leave { reply })
            .await
            .map_err(|_| MeshError::RoomClosed)?;
        response.await.map_err(|_| MeshError::RoomClosed)
    }
}
