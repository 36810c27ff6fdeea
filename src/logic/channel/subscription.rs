//! Revocable subscription handle.

pub type SubscriptionId = u64;

type Revoke = Box<dyn FnOnce(SubscriptionId) + Send + Sync>;

/// Returned by `EventChannel::subscribe`. Unsubscribes when revoked or dropped.
pub struct Subscription {
    id: SubscriptionId,
    event: String,
    revoke: Option<Revoke>,
}

impl Subscription {
    pub fn new<F>(id: SubscriptionId, event: &str, revoke: F) -> Self
    where
        F: FnOnce(SubscriptionId) + Send + Sync + 'static,
    {
        Self {
            id,
            event: event.to_string(),
            revoke: Some(Box::new(revoke)),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn unsubscribe(mut self) {
        self.revoke_now();
    }

    fn revoke_now(&mut self) {
        if let Some(revoke) = self.revoke.take() {
            revoke(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.revoke_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("active", &self.revoke.is_some())
            .finish()
    }
}
