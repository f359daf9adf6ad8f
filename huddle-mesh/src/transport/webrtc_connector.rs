use crate::transport::{DataLink, LinkEvent, PeerConnector, PeerLink, TransportConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use huddle_core::PeerId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Connection-primitive factory backed by the `webrtc` crate.
pub struct WebRtcConnector {
    config: TransportConfig,
}

impl WebRtcConnector {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PeerConnector for WebRtcConnector {
    async fn connect(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Box<dyn PeerLink>> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = self
            .config
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
            })
            .collect();

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // Connectivity-state notifications drive the session state machine.
        let state_tx = events.clone();
        let state_peer = peer_id;
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let peer = state_peer;

                Box::pin(async move {
                    info!("connection state for peer {peer}: {state:?}");
                    match state {
                        RTCPeerConnectionState::Connected => {
                            let _ = tx.send(LinkEvent::Connected(peer)).await;
                        }
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(LinkEvent::Disconnected(peer)).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        // Trickle ICE: hand local candidates to the coordinator for signaling.
        let ice_tx = events.clone();
        let ice_peer = peer_id;
        peer_connection.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let peer = ice_peer;

            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(serialized) = serde_json::to_string(&json_candidate) else {
                    return;
                };
                let _ = tx
                    .send(LinkEvent::CandidateGenerated(peer, serialized))
                    .await;
            })
        }));

        // Responder side: the initiator creates the channel, we accept it.
        let dc_tx = events.clone();
        let dc_peer = peer_id;
        peer_connection.on_data_channel(Box::new(move |channel: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            let peer = dc_peer;

            Box::pin(async move {
                debug!("incoming data channel '{}' from peer {peer}", channel.label());
                wire_channel(peer, channel, tx);
            })
        }));

        Ok(Box::new(WebRtcLink {
            peer_id,
            peer_connection,
            channel_label: self.config.channel_label.clone(),
            events,
        }))
    }
}

struct WebRtcLink {
    peer_id: PeerId,
    peer_connection: Arc<RTCPeerConnection>,
    channel_label: String,
    events: mpsc::Sender<LinkEvent>,
}

#[async_trait]
impl PeerLink for WebRtcLink {
    async fn create_offer(&self) -> Result<String> {
        let channel = self
            .peer_connection
            .create_data_channel(&self.channel_label, None)
            .await
            .context("failed to create data channel")?;
        wire_channel(self.peer_id, channel, self.events.clone());

        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .context("failed to create offer")?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .context("failed to set local offer")?;
        Ok(offer.sdp)
    }

    async fn accept_offer(&self, sdp: String) -> Result<String> {
        let offer = RTCSessionDescription::offer(sdp)?;
        self.peer_connection
            .set_remote_description(offer)
            .await
            .context("failed to apply remote offer")?;

        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .context("failed to create answer")?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .context("failed to set local answer")?;
        Ok(answer.sdp)
    }

    async fn apply_answer(&self, sdp: String) -> Result<()> {
        let answer = RTCSessionDescription::answer(sdp)?;
        self.peer_connection
            .set_remote_description(answer)
            .await
            .context("failed to apply remote answer")?;
        Ok(())
    }

    async fn add_candidate(&self, candidate: String) -> Result<()> {
        let candidate: RTCIceCandidateInit =
            serde_json::from_str(&candidate).context("failed to parse candidate JSON")?;
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

struct WebRtcChannel {
    channel: Arc<RTCDataChannel>,
}

#[async_trait]
impl DataLink for WebRtcChannel {
    async fn send(&self, data: Bytes) -> Result<()> {
        self.channel.send(&data).await?;
        Ok(())
    }
}

/// Attach open/message callbacks to a data channel and surface it as a
/// `LinkEvent::ChannelReady` once writable.
fn wire_channel(peer: PeerId, channel: Arc<RTCDataChannel>, events: mpsc::Sender<LinkEvent>) {
    let open_channel = channel.clone();
    let open_tx = events.clone();
    channel.on_open(Box::new(move || {
        let tx = open_tx.clone();
        let ready: Arc<dyn DataLink> = Arc::new(WebRtcChannel {
            channel: open_channel.clone(),
        });

        Box::pin(async move {
            info!("data channel open for peer {peer}");
            let _ = tx.send(LinkEvent::ChannelReady(peer, ready)).await;
        })
    }));

    let message_tx = events;
    channel.on_message(Box::new(move |message: DataChannelMessage| {
        let tx = message_tx.clone();

        Box::pin(async move {
            let bytes = Bytes::from(message.data.to_vec());
            let _ = tx.send(LinkEvent::Message(peer, bytes)).await;
        })
    }));
}
