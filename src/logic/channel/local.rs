//! In-process event channel
//!
//! Owned, cloneable channel with explicit `open`/`close`. Closing pauses
//! delivery but keeps subscribers, so a reconnect resumes where it left off.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::subscription::{Subscription, SubscriptionId};
use super::{canonical_event_name, EventChannel, EventHandler};
use crate::error::ChannelError;

// ============================================================================
// STATE
// ============================================================================

struct Registration {
    id: SubscriptionId,
    event: String,
    handler: EventHandler,
}

#[derive(Default)]
struct ChannelInner {
    connected: AtomicBool,
    next_id: AtomicU64,
    handlers: RwLock<Vec<Registration>>,
}

impl ChannelInner {
    fn remove(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|r| r.id != id);
        handlers.len() != before
    }
}

// ============================================================================
// LOCAL CHANNEL
// ============================================================================

#[derive(Clone, Default)]
pub struct LocalChannel {
    inner: Arc<ChannelInner>,
}

impl LocalChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        if !self.inner.connected.swap(true, Ordering::SeqCst) {
            log::info!("Event channel opened");
        }
    }

    pub fn close(&self) {
        if self.inner.connected.swap(false, Ordering::SeqCst) {
            log::info!("Event channel closed");
        }
    }

    /// Deliver a payload to every handler of `event` (wire names accepted).
    /// Returns the number of handlers reached.
    pub fn publish(&self, event: &str, payload: &Value) -> Result<usize, ChannelError> {
        let event = canonical_event_name(event);
        if !self.is_connected() {
            return Err(ChannelError::Closed(event.to_string()));
        }

        // Call handlers outside the lock so they may (un)subscribe
        let targets: Vec<EventHandler> = self
            .inner
            .handlers
            .read()
            .iter()
            .filter(|r| r.event == event)
            .map(|r| Arc::clone(&r.handler))
            .collect();

        for handler in &targets {
            handler(payload);
        }
        Ok(targets.len())
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        let event = canonical_event_name(event);
        self.inner
            .handlers
            .read()
            .iter()
            .filter(|r| r.event == event)
            .count()
    }
}

impl EventChannel for LocalChannel {
    fn subscribe(&self, event: &str, handler: EventHandler) -> Subscription {
        let event = canonical_event_name(event).to_string();
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        self.inner.handlers.write().push(Registration {
            id,
            event: event.clone(),
            handler,
        });
        log::debug!("Subscribed #{} to '{}'", id, event);

        let inner = Arc::clone(&self.inner);
        Subscription::new(id, &event, move |id| {
            if inner.remove(id) {
                log::debug!("Unsubscribed #{}", id);
            }
        })
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), ChannelError> {
        if self.inner.remove(id) {
            Ok(())
        } else {
            Err(ChannelError::UnknownSubscription(id))
        }
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::channel::events;
    use parking_lot::Mutex;
    use serde_json::json;

    fn collector() -> (EventHandler, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: EventHandler = Arc::new(move |v: &Value| sink.lock().push(v.clone()));
        (handler, seen)
    }

    #[test]
    fn test_publish_requires_open() {
        let channel = LocalChannel::new();
        let (handler, seen) = collector();
        let _sub = channel.subscribe(events::CLASSIFICATION, handler);

        assert!(channel.publish(events::CLASSIFICATION, &json!({})).is_err());
        channel.open();
        assert_eq!(channel.publish(events::CLASSIFICATION, &json!({"a": 1})).unwrap(), 1);
        channel.close();
        assert!(!channel.is_connected());
        assert!(channel.publish(events::CLASSIFICATION, &json!({})).is_err());

        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_wire_names_route_to_core_names() {
        let channel = LocalChannel::new();
        channel.open();
        let (handler, seen) = collector();
        let _sub = channel.subscribe(events::CLASSIFICATION, handler);

        channel.publish("real_time_prediction", &json!({"x": 1})).unwrap();
        channel.publish("network_packet", &json!({"y": 2})).unwrap();

        assert_eq!(seen.lock().as_slice(), &[json!({"x": 1})]);
    }

    #[test]
    fn test_drop_and_explicit_unsubscribe() {
        let channel = LocalChannel::new();
        let (handler, _) = collector();

        let sub = channel.subscribe(events::CLASSIFICATION, Arc::clone(&handler));
        assert_eq!(channel.subscriber_count(events::CLASSIFICATION), 1);
        drop(sub);
        assert_eq!(channel.subscriber_count(events::CLASSIFICATION), 0);

        let sub = channel.subscribe(events::CLASSIFICATION, handler);
        let id = sub.id();
        sub.unsubscribe();
        assert!(matches!(
            channel.unsubscribe(id),
            Err(ChannelError::UnknownSubscription(_))
        ));
    }
}
