use crate::transport::{DataLink, PeerLink};
use anyhow::Result;
use huddle_core::PeerId;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Who creates the offer for this peer relationship. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    New,
    /// Initiator only: offer being produced.
    Offering,
    /// Initiator: offer emitted, waiting for the remote answer.
    AwaitingAnswer,
    /// Responder: answer emitted, waiting for connectivity.
    AnsweringSent,
    /// Initiator: answer applied, connectivity being established.
    Negotiating,
    Connected,
    Failed,
    Closed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Failed | SessionState::Closed)
    }
}

/// One remote participant relationship: a state machine that exclusively
/// owns one connection primitive and, once negotiation completes, one
/// byte channel. Mutated only from the coordinator loop.
pub struct PeerSession {
    pub peer_id: PeerId,
    pub display_name: String,
    pub role: SessionRole,
    pub state: SessionState,
    link: Box<dyn PeerLink>,
    channel: Option<Arc<dyn DataLink>>,
    pub created_at: Instant,
    pub last_activity: Instant,
}

impl PeerSession {
    pub fn new(peer_id: PeerId, role: SessionRole, link: Box<dyn PeerLink>) -> Self {
        let now = Instant::now();
        Self {
            peer_id,
            display_name: peer_id.short(),
            role,
            state: SessionState::New,
            link,
            channel: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// Initiator handshake half: channel intent + offer, emitted by the
    /// caller. `New -> Offering -> AwaitingAnswer`.
    pub async fn start_offer(&mut self) -> Result<String> {
        debug_assert_eq!(self.role, SessionRole::Initiator);
        self.state = SessionState::Offering;
        let sdp = self.link.create_offer().await?;
        self.state = SessionState::AwaitingAnswer;
        self.touch();
        Ok(sdp)
    }

    /// Responder handshake half: the inbound offer is applied and the
    /// answer produced in one step. `New -> AnsweringSent`.
    pub async fn accept_offer(&mut self, sdp: String) -> Result<String> {
        debug_assert_eq!(self.role, SessionRole::Responder);
        let answer = self.link.accept_offer(sdp).await?;
        self.state = SessionState::AnsweringSent;
        self.touch();
        Ok(answer)
    }

    /// Apply a remote answer. Returns false (and leaves the session
    /// untouched) when the session is not waiting for one, so an answer
    /// racing ahead of the handshake is ignorable rather than fatal.
    pub async fn apply_answer(&mut self, sdp: String) -> Result<bool> {
        if self.state != SessionState::AwaitingAnswer {
            return Ok(false);
        }
        self.link.apply_answer(sdp).await?;
        self.state = SessionState::Negotiating;
        self.touch();
        Ok(true)
    }

    /// Candidates are applied as they arrive until the link is finalized;
    /// anything addressed to a terminal session is discarded.
    pub async fn add_candidate(&mut self, candidate: String) -> Result<()> {
        if self.state.is_terminal() {
            debug!("discarding candidate for closed session {}", self.peer_id);
            return Ok(());
        }
        self.link.add_candidate(candidate).await?;
        self.touch();
        Ok(())
    }

    /// Connectivity notification reported an established link. Returns
    /// false when the notification is stale (terminal or already there).
    pub fn mark_connected(&mut self) -> bool {
        if self.state.is_terminal() || self.state == SessionState::Connected {
            return false;
        }
        self.state = SessionState::Connected;
        self.touch();
        true
    }

    pub fn mark_failed(&mut self) {
        if !self.state.is_terminal() {
            self.state = SessionState::Failed;
        }
    }

    pub fn mark_closed(&mut self) {
        self.state = SessionState::Closed;
    }

    pub fn attach_channel(&mut self, channel: Arc<dyn DataLink>) {
        self.channel = Some(channel);
        self.touch();
    }

    pub fn channel(&self) -> Option<Arc<dyn DataLink>> {
        self.channel.clone()
    }

    /// A session that has not reached `Connected` within the deadline is
    /// forced to `Failed` by the coordinator's sweep.
    pub fn deadline_expired(&self, deadline: Duration) -> bool {
        !matches!(self.state, SessionState::Connected) // terminal states are removed eagerly
            && self.created_at.elapsed() >= deadline
    }

    pub async fn close_link(&self) -> Result<()> {
        self.link.close().await
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}
