use anyhow::Result;
use async_trait::async_trait;
use huddle_core::{JoinResponse, PeerId, PollResponse, RoomId, SignalEnvelope, SignalPayload};
use huddle_mesh::SignalingClient;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted signaling service: join response and poll cycles are queued
/// by the test, every submitted envelope is captured for verification.
pub struct MockSignaling {
    join_response: Mutex<JoinResponse>,
    join_calls: Mutex<Vec<(RoomId, PeerId)>>,
    polls: Mutex<VecDeque<PollResponse>>,
    sent: Mutex<Vec<SignalEnvelope>>,
    fail_next_poll: Mutex<bool>,
}

impl MockSignaling {
    pub fn new() -> Self {
        Self::with_peers(Vec::new())
    }

    pub fn with_peers(peers: Vec<PeerId>) -> Self {
        Self {
            join_response: Mutex::new(JoinResponse {
                success: true,
                peers,
            }),
            join_calls: Mutex::new(Vec::new()),
            polls: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            fail_next_poll: Mutex::new(false),
        }
    }

    pub fn rejecting() -> Self {
        let signaling = Self::new();
        signaling.join_response.lock().unwrap().success = false;
        signaling
    }

    /// Queue the result of the next poll cycle.
    pub fn push_poll(&self, poll: PollResponse) {
        self.polls.lock().unwrap().push_back(poll);
    }

    pub fn fail_next_poll(&self) {
        *self.fail_next_poll.lock().unwrap() = true;
    }

    pub fn pending_polls(&self) -> usize {
        self.polls.lock().unwrap().len()
    }

    pub fn join_calls(&self) -> usize {
        self.join_calls.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<SignalEnvelope> {
        self.sent.lock().unwrap().clone()
    }

    pub fn offers_to(&self, peer: PeerId) -> usize {
        self.count_sent(peer, |p| matches!(p, SignalPayload::Offer { .. }))
    }

    pub fn answers_to(&self, peer: PeerId) -> usize {
        self.count_sent(peer, |p| matches!(p, SignalPayload::Answer { .. }))
    }

    pub fn candidates_to(&self, peer: PeerId) -> usize {
        self.count_sent(peer, |p| matches!(p, SignalPayload::IceCandidate { .. }))
    }

    fn count_sent(&self, peer: PeerId, matcher: impl Fn(&SignalPayload) -> bool) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.to == peer && matcher(&e.payload))
            .count()
    }
}

#[async_trait]
impl SignalingClient for MockSignaling {
    async fn join(&self, room: &RoomId, local: PeerId) -> Result<JoinResponse> {
        self.join_calls.lock().unwrap().push((room.clone(), local));
        Ok(self.join_response.lock().unwrap().clone())
    }

    async fn poll(&self, _room: &RoomId, _local: PeerId) -> Result<PollResponse> {
        let mut fail = self.fail_next_poll.lock().unwrap();
        if *fail {
            *fail = false;
            anyhow::bail!("simulated network error");
        }
        drop(fail);
        Ok(self.polls.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn send(&self, envelope: &SignalEnvelope) -> Result<()> {
        self.sent.lock().unwrap().push(envelope.clone());
        Ok(())
    }
}
