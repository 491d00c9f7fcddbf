//! Storage interfaces for events and subscriptions.
//!
//! Every event read except [`EventStore::events_by_subscription`] and
//! [`EventStore::count_events`] passes through the [`VisibilityGate`]:
//! events owned by a disabled subscription stay stored but are not returned.

mod memory;
mod visibility;

pub use memory::MemoryStore;
pub use visibility::VisibilityGate;

use chrono::{NaiveDate, NaiveDateTime};

use crate::date_range::DateRange;
use crate::error::DayflowResult;
use crate::event::Event;
use crate::subscription::{Subscription, SyncStatus};

/// Durable keyed storage for events.
pub trait EventStore: Send + Sync {
    /// Store a new event and return its assigned id. Any id on `event` is ignored.
    fn insert_event(&self, event: Event) -> DayflowResult<i64>;

    fn update_event(&self, event: Event) -> DayflowResult<()>;

    fn delete_event(&self, id: i64) -> DayflowResult<()>;

    /// Remove every event owned by the subscription, returning how many went.
    fn delete_events_by_subscription(&self, subscription_id: i64) -> DayflowResult<usize>;

    /// Swap every event owned by the subscription for `events`, tagging each
    /// with `subscription_id`. Either the whole set is replaced or nothing
    /// changes. Returns how many events were stored.
    fn replace_subscription_events(
        &self,
        subscription_id: i64,
        events: Vec<Event>,
    ) -> DayflowResult<usize>;

    fn get_event(&self, id: i64) -> DayflowResult<Option<Event>>;

    fn events_in_range(&self, range: &DateRange) -> DayflowResult<Vec<Event>>;

    fn events_on_date(&self, date: NaiveDate) -> DayflowResult<Vec<Event>>;

    /// Events owned by a subscription, regardless of whether it is enabled.
    fn events_by_subscription(&self, subscription_id: i64) -> DayflowResult<Vec<Event>>;

    /// Case-insensitive match on title, description or location, newest first.
    fn search_events(&self, query: &str) -> DayflowResult<Vec<Event>>;

    fn visible_events(&self) -> DayflowResult<Vec<Event>>;

    /// Events with a reminder that start after `now`.
    fn upcoming_reminders(&self, now: NaiveDateTime) -> DayflowResult<Vec<Event>>;

    /// Number of stored events, hidden ones included.
    fn count_events(&self) -> DayflowResult<usize>;
}

/// Durable keyed storage for subscription records.
pub trait SubscriptionStore: Send + Sync {
    fn get_subscription(&self, id: i64) -> DayflowResult<Option<Subscription>>;

    fn subscription_by_url(&self, url: &str) -> DayflowResult<Option<Subscription>>;

    /// All subscriptions, newest first.
    fn list_subscriptions(&self) -> DayflowResult<Vec<Subscription>>;

    fn list_enabled_subscriptions(&self) -> DayflowResult<Vec<Subscription>>;

    /// Store a new subscription and return its id. Fails if the URL is taken.
    fn insert_subscription(&self, subscription: Subscription) -> DayflowResult<i64>;

    fn update_subscription(&self, subscription: Subscription) -> DayflowResult<()>;

    fn delete_subscription(&self, id: i64) -> DayflowResult<()>;

    fn set_subscription_enabled(&self, id: i64, enabled: bool) -> DayflowResult<()>;

    fn update_sync_status(
        &self,
        id: i64,
        time: NaiveDateTime,
        status: SyncStatus,
        error: Option<String>,
    ) -> DayflowResult<()>;
}
