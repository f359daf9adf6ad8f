use crate::signaling::SignalingClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use huddle_core::{JoinResponse, PeerId, PollResponse, RoomId, SignalEnvelope};
use serde_json::json;

/// Signaling over a plain HTTP request/response API. No retry loop of its
/// own; the coordinator's poll cadence is the retry.
pub struct HttpSignaling {
    base: String,
    http: reqwest::Client,
}

impl HttpSignaling {
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SignalingClient for HttpSignaling {
    async fn join(&self, room: &RoomId, local: PeerId) -> Result<JoinResponse> {
        let url = format!("{}/rooms/{}/join", self.base, room);
        let response = self
            .http
            .post(url)
            .json(&json!({ "peer_id": local }))
            .send()
            .await
            .context("join request failed")?
            .error_for_status()
            .context("join rejected by server")?;
        Ok(response.json().await.context("malformed join response")?)
    }

    async fn poll(&self, room: &RoomId, local: PeerId) -> Result<PollResponse> {
        let url = format!("{}/rooms/{}/poll?peer_id={}", self.base, room, local);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("poll request failed")?
            .error_for_status()
            .context("poll rejected by server")?;
        Ok(response.json().await.context("malformed poll response")?)
    }

    async fn send(&self, envelope: &SignalEnvelope) -> Result<()> {
        let url = format!("{}/rooms/{}/signal", self.base, envelope.room);
        self.http
            .post(url)
            .json(envelope)
            .send()
            .await
            .context("signal submission failed")?
            .error_for_status()
            .context("signal rejected by server")?;
        Ok(())
    }
}
