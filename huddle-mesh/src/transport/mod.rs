mod connector;
mod link_event;
mod transport_config;
mod webrtc_connector;

pub use connector::*;
pub use link_event::*;
pub use transport_config::*;
pub use webrtc_connector::*;
