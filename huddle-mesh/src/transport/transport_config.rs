use huddle_core::IceServerConfig;

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Reflection/relay endpoints handed to the connection primitive.
    pub ice_servers: Vec<IceServerConfig>,
    /// Label of the single chat data channel.
    pub channel_label: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_string()],
                username: None,
                credential: None,
            }],
            channel_label: "chat".to_string(),
        }
    }
}
