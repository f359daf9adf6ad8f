use crate::bus::MessageBus;
use crate::error::MeshError;
use crate::mesh::{MeshCommand, PeerSession, PeerStatus, RoomStatus, SessionRole, SessionState};
use crate::signaling::SignalingClient;
use crate::transport::{LinkEvent, PeerConnector};
use huddle_core::{
    ChatMessage, IncomingAnswer, IncomingCandidate, IncomingOffer, PeerId, PollResponse,
    RoomMembership, SignalEnvelope, SignalPayload,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Fixed cadence of the signaling poll cycle.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A session that has not reached `Connected` within this window of its
/// creation is forced to `Failed`.
pub const NEGOTIATION_DEADLINE: Duration = Duration::from_secs(30);

const LINK_EVENT_BUFFER: usize = 256;

/// Single owner of a room's peer sessions. Every mutation (poll results,
/// connectivity notifications, user commands) flows through this task's
/// select loop, so transitions never interleave.
pub struct MeshCoordinator {
    membership: RoomMembership,
    signaling: Arc<dyn SignalingClient>,
    connector: Arc<dyn PeerConnector>,
    sessions: HashMap<PeerId, PeerSession>,
    bus: MessageBus,
    command_rx: mpsc::Receiver<MeshCommand>,
    link_rx: mpsc::Receiver<LinkEvent>,
    link_tx: mpsc::Sender<LinkEvent>,
    status_tx: watch::Sender<RoomStatus>,
}

impl MeshCoordinator {
    pub fn new(
        membership: RoomMembership,
        signaling: Arc<dyn SignalingClient>,
        connector: Arc<dyn PeerConnector>,
        command_rx: mpsc::Receiver<MeshCommand>,
        status_tx: watch::Sender<RoomStatus>,
    ) -> (Self, mpsc::UnboundedReceiver<ChatMessage>) {
        let (link_tx, link_rx) = mpsc::channel(LINK_EVENT_BUFFER);
        let (bus, events_rx) = MessageBus::new();

        let coordinator = Self {
            membership,
            signaling,
            connector,
            sessions: HashMap::new(),
            bus,
            command_rx,
            link_rx,
            link_tx,
            status_tx,
        };
        (coordinator, events_rx)
    }

    pub async fn run(mut self, known_peers: Vec<PeerId>) {
        info!(room = %self.membership.room, "mesh event loop started");
        self.bus
            .system(&format!("joined room {}", self.membership.room));

        for peer_id in known_peers {
            self.open_session_to(peer_id).await;
        }
        self.publish_status();

        let mut poll = tokio::time::interval(POLL_INTERVAL);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(MeshCommand::Send { text, reply }) => {
                            let _ = reply.send(self.handle_send(&text).await);
                        }
                        Some(MeshCommand::Snapshot { reply }) => {
                            let _ = reply.send(self.bus.log().to_vec());
                        }
                        Some(MeshCommand::Leave { reply }) => {
                            self.teardown().await;
                            let _ = reply.send(());
                            break;
                        }
                        None => {
                            // Handle dropped without an explicit leave.
                            self.teardown().await;
                            break;
                        }
                    }
                }

                event = self.link_rx.recv() => {
                    if let Some(event) = event {
                        self.handle_link_event(event).await;
                        self.publish_status();
                    }
                }

                _ = poll.tick() => {
                    self.poll_cycle().await;
                    self.publish_status();
                }
            }
        }

        info!(room = %self.membership.room, "mesh event loop finished");
    }

    async fn handle_send(&mut self, text: &str) -> Result<usize, MeshError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MeshError::EmptyMessage);
        }
        let sender = self.membership.display_name.clone();
        Ok(self.bus.broadcast(&sender, text).await)
    }

    /// One poll cycle: sweep negotiation deadlines, then drain whatever
    /// the signaling service queued for us.
    async fn poll_cycle(&mut self) {
        self.sweep_deadlines().await;

        let poll = match self
            .signaling
            .poll(&self.membership.room, self.membership.local_peer_id)
            .await
        {
            Ok(poll) => poll,
            Err(e) => {
                // Transient by definition; the next tick retries.
                warn!("signaling poll failed: {e:#}");
                self.bus.system(&format!("signaling poll failed: {e}"));
                return;
            }
        };

        self.dispatch_poll(poll).await;
    }

    async fn dispatch_poll(&mut self, poll: PollResponse) {
        if let Some(offer) = poll.offer {
            self.handle_offer(offer).await;
        }
        if let Some(answer) = poll.answer {
            self.handle_answer(answer).await;
        }
        for candidate in poll.ice_candidates {
            self.handle_candidate(candidate).await;
        }
    }

    async fn sweep_deadlines(&mut self) {
        let expired: Vec<PeerId> = self
            .sessions
            .values()
            .filter(|s| s.deadline_expired(NEGOTIATION_DEADLINE))
            .map(|s| s.peer_id)
            .collect();

        for peer_id in expired {
            self.fail_session(peer_id, "negotiation timed out").await;
        }
    }

    /// Create an Initiator session toward an already-present peer and
    /// emit our offer.
    async fn open_session_to(&mut self, peer_id: PeerId) {
        if self.sessions.contains_key(&peer_id) {
            debug!("duplicate discovery of peer {peer_id} ignored");
            return;
        }

        let link = match self.connector.connect(peer_id, self.link_tx.clone()).await {
            Ok(link) => link,
            Err(e) => {
                error!("failed to create connection for peer {peer_id}: {e:#}");
                self.bus
                    .system(&format!("could not reach peer {}", peer_id.short()));
                return;
            }
        };

        let mut session = PeerSession::new(peer_id, SessionRole::Initiator, link);
        let sdp = match session.start_offer().await {
            Ok(sdp) => sdp,
            Err(e) => {
                error!("offer creation for peer {peer_id} failed: {e:#}");
                let _ = session.close_link().await;
                return;
            }
        };

        self.send_signal(peer_id, SignalPayload::Offer { sdp }).await;
        self.bus
            .system(&format!("discovered peer {}", session.display_name));
        self.sessions.insert(peer_id, session);
    }

    /// Inbound offer: a new peer announcing itself. An offer for a live
    /// session is idempotent re-discovery, not a new negotiation.
    async fn handle_offer(&mut self, offer: IncomingOffer) {
        let peer_id = offer.from;

        if let Some(existing) = self.sessions.get(&peer_id) {
            if !existing.state.is_terminal() {
                warn!("ignoring duplicate offer from peer {peer_id}");
                return;
            }
            self.remove_session(&peer_id).await;
        }

        let link = match self.connector.connect(peer_id, self.link_tx.clone()).await {
            Ok(link) => link,
            Err(e) => {
                error!("failed to create connection for peer {peer_id}: {e:#}");
                return;
            }
        };

        let mut session = PeerSession::new(peer_id, SessionRole::Responder, link);
        let answer = match session.accept_offer(offer.offer).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("failed to answer offer from peer {peer_id}: {e:#}");
                let _ = session.close_link().await;
                return;
            }
        };

        self.send_signal(peer_id, SignalPayload::Answer { sdp: answer })
            .await;
        self.bus
            .system(&format!("discovered peer {}", session.display_name));
        self.sessions.insert(peer_id, session);
    }

    async fn handle_answer(&mut self, answer: IncomingAnswer) {
        let Some(session) = self.sessions.get_mut(&answer.from) else {
            warn!("ignoring answer from unknown peer {}", answer.from);
            return;
        };

        match session.apply_answer(answer.answer).await {
            Ok(true) => {}
            Ok(false) => warn!(
                "ignoring answer from peer {} in state {:?}",
                answer.from, session.state
            ),
            Err(e) => {
                error!("failed to apply answer from peer {}: {e:#}", answer.from);
                self.fail_session(answer.from, "negotiation failed").await;
            }
        }
    }

    async fn handle_candidate(&mut self, candidate: IncomingCandidate) {
        let Some(session) = self.sessions.get_mut(&candidate.from) else {
            debug!("discarding candidate from unknown peer {}", candidate.from);
            return;
        };

        if let Err(e) = session.add_candidate(candidate.candidate).await {
            warn!("candidate from peer {} not applied: {e:#}", candidate.from);
        }
    }

    async fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected(peer_id) => {
                let Some(session) = self.sessions.get_mut(&peer_id) else {
                    debug!("connectivity notification for unknown peer {peer_id}");
                    return;
                };
                if !session.mark_connected() {
                    return;
                }
                info!("peer {peer_id} connected");
                let name = session.display_name.clone();
                if let Some(channel) = session.channel() {
                    self.bus.register(peer_id, channel);
                }
                self.bus.system(&format!("{name} connected"));
            }

            LinkEvent::Disconnected(peer_id) => {
                if self.sessions.contains_key(&peer_id) {
                    self.fail_session(peer_id, "link lost").await;
                }
            }

            LinkEvent::ChannelReady(peer_id, channel) => {
                let Some(session) = self.sessions.get_mut(&peer_id) else {
                    debug!("channel for unknown peer {peer_id} dropped");
                    return;
                };
                session.attach_channel(channel.clone());
                // Connectivity notification and channel-open can arrive
                // in either order.
                if session.state == SessionState::Connected {
                    self.bus.register(peer_id, channel);
                }
            }

            LinkEvent::Message(peer_id, data) => {
                let Some(session) = self.sessions.get_mut(&peer_id) else {
                    debug!("payload from unknown peer {peer_id} dropped");
                    return;
                };
                session.touch();
                if let Some(sender) = self.bus.deliver(peer_id, &data) {
                    // First payload refines the derived display name.
                    let session = self
                        .sessions
                        .get_mut(&peer_id)
                        .filter(|s| s.display_name == peer_id.short());
                    if let Some(session) = session {
                        session.display_name = sender;
                    }
                }
            }

            LinkEvent::CandidateGenerated(peer_id, candidate) => {
                self.send_signal(
                    peer_id,
                    SignalPayload::IceCandidate {
                        candidate,
                        sdp_mid: None,
                        sdp_m_line_index: None,
                    },
                )
                .await;
            }
        }
    }

    async fn send_signal(&mut self, to: PeerId, payload: SignalPayload) {
        let envelope = SignalEnvelope {
            room: self.membership.room.clone(),
            from: self.membership.local_peer_id,
            to,
            payload,
        };
        if let Err(e) = self.signaling.send(&envelope).await {
            // Lost signals stall the handshake; the deadline sweep cleans
            // up anything that never recovers.
            warn!("failed to submit signal for peer {to}: {e:#}");
            self.bus.system(&format!("signaling send failed: {e}"));
        }
    }

    async fn fail_session(&mut self, peer_id: PeerId, reason: &str) {
        let Some(mut session) = self.sessions.remove(&peer_id) else {
            return;
        };
        session.mark_failed();
        self.bus.unregister(&peer_id);
        if let Err(e) = session.close_link().await {
            warn!("closing link to peer {peer_id} failed: {e:#}");
        }
        warn!("session with peer {peer_id} failed: {reason}");
        self.bus
            .system(&format!("{} left: {reason}", session.display_name));
    }

    async fn remove_session(&mut self, peer_id: &PeerId) {
        if let Some(session) = self.sessions.remove(peer_id) {
            self.bus.unregister(peer_id);
            let _ = session.close_link().await;
        }
    }

    /// Leave-room teardown. Not cancellable: every link is closed
    /// independently, a failure in one never stops the rest.
    async fn teardown(&mut self) {
        info!(room = %self.membership.room, "leaving room");
        for (peer_id, mut session) in self.sessions.drain() {
            session.mark_closed();
            self.bus.unregister(&peer_id);
            if let Err(e) = session.close_link().await {
                warn!("closing link to peer {peer_id} failed: {e:#}");
            }
        }
        self.bus.system("left room");
        self.publish_status();
    }

    /// Pure recomputation from the session collection; no incrementally
    /// maintained counter to drift.
    fn publish_status(&self) {
        let peers = self
            .sessions
            .values()
            .map(|s| PeerStatus {
                peer_id: s.peer_id,
                display_name: s.display_name.clone(),
                state: s.state,
            })
            .collect();
        self.status_tx.send_replace(RoomStatus::new(peers));
    }
}
