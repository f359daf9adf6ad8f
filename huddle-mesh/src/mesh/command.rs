use crate::error::MeshError;
use huddle_core::ChatMessage;
use tokio::sync::oneshot;

/// User actions submitted to the coordinator task.
pub enum MeshCommand {
    /// Broadcast a chat line; replies with the number of wire sends.
    Send {
        text: String,
        reply: oneshot::Sender<Result<usize, MeshError>>,
    },
    /// Snapshot of the ordered room log.
    Snapshot {
        reply: oneshot::Sender<Vec<ChatMessage>>,
    },
    /// Synchronous teardown of every session, then loop exit.
    Leave { reply: oneshot::Sender<()> },
}
