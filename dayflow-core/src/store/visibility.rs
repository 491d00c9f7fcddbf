//! Query-time visibility of subscription-owned events.

use std::collections::HashSet;

use crate::event::Event;
use crate::subscription::Subscription;

/// Snapshot of the enabled subscription ids, taken once per query.
#[derive(Debug, Clone, Default)]
pub struct VisibilityGate {
    enabled: HashSet<i64>,
}

impl VisibilityGate {
    pub fn new(enabled: impl IntoIterator<Item = i64>) -> Self {
        VisibilityGate {
            enabled: enabled.into_iter().collect(),
        }
    }

    pub fn from_subscriptions<'a>(subscriptions: impl IntoIterator<Item = &'a Subscription>) -> Self {
        Self::new(
            subscriptions
                .into_iter()
                .filter(|s| s.enabled)
                .map(|s| s.id),
        )
    }

    /// Locally authored events are always visible; subscribed ones only while
    /// their subscription exists and is enabled.
    pub fn allows(&self, event: &Event) -> bool {
        match event.subscription_id {
            None => true,
            Some(id) => self.enabled.contains(&id),
        }
    }
}
