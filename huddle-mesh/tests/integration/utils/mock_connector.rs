use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use huddle_core::{PeerId, WirePayload};
use huddle_mesh::{DataLink, LinkEvent, PeerConnector, PeerLink};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Everything a mock link recorded during negotiation.
#[derive(Default)]
pub struct MockLinkState {
    pub offers_created: Mutex<usize>,
    pub offers_accepted: Mutex<Vec<String>>,
    pub answers_applied: Mutex<Vec<String>>,
    pub candidates: Mutex<Vec<String>>,
    pub closed: AtomicBool,
}

impl MockLinkState {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Connection-primitive factory that records every negotiation call and
/// lets the test inject link events as the external transport would.
pub struct MockConnector {
    links: Mutex<HashMap<PeerId, Arc<MockLinkState>>>,
    event_senders: Mutex<HashMap<PeerId, mpsc::Sender<LinkEvent>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            links: Mutex::new(HashMap::new()),
            event_senders: Mutex::new(HashMap::new()),
        }
    }

    pub fn link(&self, peer: PeerId) -> Option<Arc<MockLinkState>> {
        self.links.lock().unwrap().get(&peer).cloned()
    }

    pub fn connects(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    /// Deliver a link event to the coordinator, as the connection
    /// primitive would from its callbacks.
    pub async fn emit(&self, peer: PeerId, event: LinkEvent) {
        let sender = self
            .event_senders
            .lock()
            .unwrap()
            .get(&peer)
            .cloned()
            .expect("no link created for peer");
        sender.send(event).await.expect("coordinator gone");
    }
}

#[async_trait]
impl PeerConnector for MockConnector {
    async fn connect(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Box<dyn PeerLink>> {
        let state = Arc::new(MockLinkState::default());
        self.links.lock().unwrap().insert(peer_id, state.clone());
        self.event_senders.lock().unwrap().insert(peer_id, events);
        Ok(Box::new(MockLink { peer_id, state }))
    }
}

struct MockLink {
    peer_id: PeerId,
    state: Arc<MockLinkState>,
}

#[async_trait]
impl PeerLink for MockLink {
    async fn create_offer(&self) -> Result<String> {
        *self.state.offers_created.lock().unwrap() += 1;
        Ok(format!("offer-from-{}", self.peer_id))
    }

    async fn accept_offer(&self, sdp: String) -> Result<String> {
        self.state.offers_accepted.lock().unwrap().push(sdp);
        Ok(format!("answer-from-{}", self.peer_id))
    }

    async fn apply_answer(&self, sdp: String) -> Result<()> {
        self.state.answers_applied.lock().unwrap().push(sdp);
        Ok(())
    }

    async fn add_candidate(&self, candidate: String) -> Result<()> {
        self.state.candidates.lock().unwrap().push(candidate);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Byte channel that records everything broadcast over it.
#[derive(Default)]
pub struct MockDataLink {
    pub sent: Mutex<Vec<Bytes>>,
}

impl MockDataLink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn payloads(&self) -> Vec<WirePayload> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|bytes| serde_json::from_slice(bytes).ok())
            .collect()
    }
}

#[async_trait]
impl DataLink for MockDataLink {
    async fn send(&self, data: Bytes) -> Result<()> {
        self.sent.lock().unwrap().push(data);
        Ok(())
    }
}
