//! Event Channel Module
//!
//! Seam between the live monitor and whatever delivers backend events.
//! The connection itself (socket, reconnect, endpoint fallback) lives
//! behind this trait; the monitor only sees subscribe/unsubscribe and a
//! connected flag.
//!
//! ## Structure
//! - `subscription`: revocable subscription handle
//! - `local`: in-process channel with explicit open/close lifecycle

pub mod subscription;
pub mod local;

use std::sync::Arc;

use serde_json::Value;

use crate::error::ChannelError;

pub use local::LocalChannel;
pub use subscription::{Subscription, SubscriptionId};

/// Event names
pub mod events {
    /// Classification results (ingested)
    pub const CLASSIFICATION: &str = "classification";
    /// Raw packets (ignored by the store)
    pub const RAW_PACKET: &str = "raw-packet";

    /// Backend wire name for classification results
    pub const WIRE_CLASSIFICATION: &str = "real_time_prediction";
    /// Backend wire name for raw packets
    pub const WIRE_RAW_PACKET: &str = "network_packet";
}

/// Map backend wire names onto channel event names
pub fn canonical_event_name(name: &str) -> &str {
    match name {
        events::WIRE_CLASSIFICATION => events::CLASSIFICATION,
        events::WIRE_RAW_PACKET => events::RAW_PACKET,
        other => other,
    }
}

pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

pub trait EventChannel: Send + Sync {
    /// Register a handler; dropping or revoking the handle unsubscribes
    fn subscribe(&self, event: &str, handler: EventHandler) -> Subscription;

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), ChannelError>;

    fn is_connected(&self) -> bool;
}
