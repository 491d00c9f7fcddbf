//! In-process store, optionally backed by a JSON snapshot file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EventStore, SubscriptionStore, VisibilityGate};
use crate::date_range::DateRange;
use crate::error::{DayflowError, DayflowResult};
use crate::event::Event;
use crate::subscription::{Subscription, SyncStatus};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Snapshot {
    last_event_id: i64,
    last_subscription_id: i64,
    events: BTreeMap<i64, Event>,
    subscriptions: BTreeMap<i64, Subscription>,
}

impl Snapshot {
    fn gate(&self) -> VisibilityGate {
        VisibilityGate::from_subscriptions(self.subscriptions.values())
    }

    /// Visible events matching `filter`, ordered by start time.
    fn visible(&self, filter: impl Fn(&Event) -> bool) -> Vec<Event> {
        let gate = self.gate();
        let mut events: Vec<Event> = self
            .events
            .values()
            .filter(|e| gate.allows(e) && filter(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.start, e.id));
        events
    }

    fn subscription_mut(&mut self, id: i64) -> DayflowResult<&mut Subscription> {
        self.subscriptions
            .get_mut(&id)
            .ok_or(DayflowError::SubscriptionNotFound(id))
    }
}

/// Event and subscription store held in memory.
///
/// Opened with [`MemoryStore::open`], every write is flushed to a JSON file
/// (written to a temp file, then renamed into place).
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Snapshot>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`, starting empty if the file doesn't exist.
    pub fn open(path: impl Into<PathBuf>) -> DayflowResult<Self> {
        let path = path.into();

        let snapshot = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)
                .map_err(|e| DayflowError::Serialization(format!("{}: {}", path.display(), e)))?
        } else {
            Snapshot::default()
        };

        Ok(MemoryStore {
            data: RwLock::new(snapshot),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read(&self) -> DayflowResult<RwLockReadGuard<'_, Snapshot>> {
        self.data
            .read()
            .map_err(|_| DayflowError::Store("store lock poisoned".into()))
    }

    /// Apply a mutation under the write lock and flush it if file-backed.
    ///
    /// The mutation runs on a copy that replaces the live snapshot only once
    /// both it and the flush succeed, so a failed write changes nothing.
    fn write<T>(&self, f: impl FnOnce(&mut Snapshot) -> DayflowResult<T>) -> DayflowResult<T> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| DayflowError::Store("store lock poisoned".into()))?;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(out)
    }

    fn persist(&self, snapshot: &Snapshot) -> DayflowResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| DayflowError::Serialization(e.to_string()))?;
        let temp = path.with_extension("json.tmp");

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, path)?;
        debug!(path = %path.display(), events = snapshot.events.len(), "Store flushed");
        Ok(())
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

impl EventStore for MemoryStore {
    fn insert_event(&self, mut event: Event) -> DayflowResult<i64> {
        event.validate()?;
        self.write(|data| {
            data.last_event_id += 1;
            let id = data.last_event_id;
            let now = now();
            event.id = id;
            event.created_at = now;
            event.updated_at = now;
            data.events.insert(id, event);
            Ok(id)
        })
    }

    fn update_event(&self, mut event: Event) -> DayflowResult<()> {
        event.validate()?;
        self.write(|data| {
            let existing = data
                .events
                .get_mut(&event.id)
                .ok_or(DayflowError::EventNotFound(event.id))?;
            event.created_at = existing.created_at;
            event.updated_at = now();
            *existing = event;
            Ok(())
        })
    }

    fn delete_event(&self, id: i64) -> DayflowResult<()> {
        self.write(|data| {
            data.events
                .remove(&id)
                .map(|_| ())
                .ok_or(DayflowError::EventNotFound(id))
        })
    }

    fn delete_events_by_subscription(&self, subscription_id: i64) -> DayflowResult<usize> {
        self.write(|data| {
            let before = data.events.len();
            data.events
                .retain(|_, e| e.subscription_id != Some(subscription_id));
            Ok(before - data.events.len())
        })
    }

    fn replace_subscription_events(
        &self,
        subscription_id: i64,
        events: Vec<Event>,
    ) -> DayflowResult<usize> {
        for event in &events {
            event.validate()?;
        }

        self.write(|data| {
            data.events
                .retain(|_, e| e.subscription_id != Some(subscription_id));

            let now = now();
            let count = events.len();
            for mut event in events {
                data.last_event_id += 1;
                event.id = data.last_event_id;
                event.subscription_id = Some(subscription_id);
                event.created_at = now;
                event.updated_at = now;
                data.events.insert(event.id, event);
            }
            Ok(count)
        })
    }

    fn get_event(&self, id: i64) -> DayflowResult<Option<Event>> {
        let data = self.read()?;
        let gate = data.gate();
        Ok(data.events.get(&id).filter(|e| gate.allows(e)).cloned())
    }

    fn events_in_range(&self, range: &DateRange) -> DayflowResult<Vec<Event>> {
        Ok(self.read()?.visible(|e| range.overlaps(e)))
    }

    fn events_on_date(&self, date: NaiveDate) -> DayflowResult<Vec<Event>> {
        Ok(self.read()?.visible(|e| e.is_on_date(date)))
    }

    fn events_by_subscription(&self, subscription_id: i64) -> DayflowResult<Vec<Event>> {
        let data = self.read()?;
        let mut events: Vec<Event> = data
            .events
            .values()
            .filter(|e| e.subscription_id == Some(subscription_id))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.start, e.id));
        Ok(events)
    }

    fn search_events(&self, query: &str) -> DayflowResult<Vec<Event>> {
        let needle = query.to_lowercase();
        let mut events = self.read()?.visible(|e| {
            contains_ci(Some(e.title.as_str()), &needle)
                || contains_ci(e.description.as_deref(), &needle)
                || contains_ci(e.location.as_deref(), &needle)
        });
        events.reverse();
        Ok(events)
    }

    fn visible_events(&self) -> DayflowResult<Vec<Event>> {
        Ok(self.read()?.visible(|_| true))
    }

    fn upcoming_reminders(&self, now: NaiveDateTime) -> DayflowResult<Vec<Event>> {
        Ok(self
            .read()?
            .visible(|e| e.reminder.is_some() && e.start > now))
    }

    fn count_events(&self) -> DayflowResult<usize> {
        Ok(self.read()?.events.len())
    }
}

impl SubscriptionStore for MemoryStore {
    fn get_subscription(&self, id: i64) -> DayflowResult<Option<Subscription>> {
        Ok(self.read()?.subscriptions.get(&id).cloned())
    }

    fn subscription_by_url(&self, url: &str) -> DayflowResult<Option<Subscription>> {
        Ok(self
            .read()?
            .subscriptions
            .values()
            .find(|s| s.url == url)
            .cloned())
    }

    fn list_subscriptions(&self) -> DayflowResult<Vec<Subscription>> {
        let mut subscriptions: Vec<Subscription> =
            self.read()?.subscriptions.values().cloned().collect();
        subscriptions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(subscriptions)
    }

    fn list_enabled_subscriptions(&self) -> DayflowResult<Vec<Subscription>> {
        Ok(self
            .read()?
            .subscriptions
            .values()
            .filter(|s| s.enabled)
            .cloned()
            .collect())
    }

    fn insert_subscription(&self, mut subscription: Subscription) -> DayflowResult<i64> {
        self.write(|data| {
            if data.subscriptions.values().any(|s| s.url == subscription.url) {
                return Err(DayflowError::DuplicateSubscription(subscription.url));
            }
            data.last_subscription_id += 1;
            let id = data.last_subscription_id;
            subscription.id = id;
            data.subscriptions.insert(id, subscription);
            Ok(id)
        })
    }

    fn update_subscription(&self, subscription: Subscription) -> DayflowResult<()> {
        self.write(|data| {
            if data
                .subscriptions
                .values()
                .any(|s| s.url == subscription.url && s.id != subscription.id)
            {
                return Err(DayflowError::DuplicateSubscription(subscription.url));
            }
            let existing = data.subscription_mut(subscription.id)?;
            *existing = subscription;
            Ok(())
        })
    }

    fn delete_subscription(&self, id: i64) -> DayflowResult<()> {
        self.write(|data| {
            data.subscriptions
                .remove(&id)
                .map(|_| ())
                .ok_or(DayflowError::SubscriptionNotFound(id))
        })
    }

    fn set_subscription_enabled(&self, id: i64, enabled: bool) -> DayflowResult<()> {
        self.write(|data| {
            data.subscription_mut(id)?.enabled = enabled;
            Ok(())
        })
    }

    fn update_sync_status(
        &self,
        id: i64,
        time: NaiveDateTime,
        status: SyncStatus,
        error: Option<String>,
    ) -> DayflowResult<()> {
        self.write(|data| {
            let subscription = data.subscription_mut(id)?;
            subscription.last_sync_time = Some(time);
            subscription.last_sync_status = status;
            subscription.error_message = error;
            Ok(())
        })
    }
}
