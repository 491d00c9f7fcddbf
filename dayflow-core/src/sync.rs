//! Subscription synchronization.
//!
//! A sync replaces every event a subscription owns with the events decoded
//! from a fresh download. Syncs of different subscriptions are independent;
//! syncs of the same subscription are serialized by a per-id lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, NaiveDateTime};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::error::{DayflowError, DayflowResult, FetchError};
use crate::event::EventColor;
use crate::fetch::Fetcher;
use crate::ics::parse_ics;
use crate::store::{EventStore, SubscriptionStore};
use crate::subscription::{Subscription, SyncOutcome};

/// Fetches, decodes and stores subscribed calendars, and manages the
/// subscription records themselves.
pub struct Synchronizer<S, F> {
    store: Arc<S>,
    fetcher: F,
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl<S, F> Synchronizer<S, F>
where
    S: EventStore + SubscriptionStore,
    F: Fetcher,
{
    pub fn new(store: Arc<S>, fetcher: F) -> Self {
        Synchronizer {
            store,
            fetcher,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Add a new enabled subscription. Fails if the URL is already subscribed.
    pub fn subscribe(&self, name: &str, url: &str, color: EventColor) -> DayflowResult<i64> {
        let url = url.trim();
        if self.store.subscription_by_url(url)?.is_some() {
            return Err(DayflowError::DuplicateSubscription(url.to_string()));
        }

        let id = self
            .store
            .insert_subscription(Subscription::new(name, url, color))?;
        info!(id, url, "Subscription added");
        Ok(id)
    }

    /// Delete a subscription together with every event it owns.
    pub async fn unsubscribe(&self, id: i64) -> DayflowResult<usize> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        if self.store.get_subscription(id)?.is_none() {
            self.forget_lock(id);
            return Err(DayflowError::SubscriptionNotFound(id));
        }

        let removed = self.store.delete_events_by_subscription(id)?;
        self.store.delete_subscription(id)?;
        self.forget_lock(id);

        info!(id, removed, "Subscription removed");
        Ok(removed)
    }

    /// Toggle a subscription. Its events stay stored either way.
    pub fn set_enabled(&self, id: i64, enabled: bool) -> DayflowResult<()> {
        self.store.set_subscription_enabled(id, enabled)
    }

    /// Check that a URL is reachable before subscribing to it.
    pub async fn check_url(&self, url: &str) -> DayflowResult<()> {
        Ok(self.fetcher.probe(url).await?)
    }

    /// Sync one subscription and return how many events were imported.
    ///
    /// Whatever happens after the record is found, it ends with a terminal
    /// status and `last_sync_time` stamped.
    pub async fn sync(&self, id: i64) -> DayflowResult<usize> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let Some(subscription) = self.store.get_subscription(id)? else {
            self.forget_lock(id);
            return Err(DayflowError::SubscriptionNotFound(id));
        };

        info!(id, url = %subscription.url, "Syncing subscription");
        let result = self.replace_events(&subscription).await;

        let outcome = match &result {
            Ok(imported) => {
                info!(id, imported, "Subscription synced");
                SyncOutcome::Success
            }
            Err(e) => {
                warn!(id, error = %e, "Subscription sync failed");
                SyncOutcome::Failed(e.to_string())
            }
        };

        let finished = now();
        let mut updated = subscription;
        updated.record_sync(finished, outcome);
        self.store.update_sync_status(
            id,
            finished,
            updated.last_sync_status,
            updated.error_message,
        )?;

        result
    }

    /// Sync every enabled subscription. One failure doesn't stop the rest;
    /// each attempted id maps to its own result.
    pub async fn sync_all_enabled(&self) -> DayflowResult<BTreeMap<i64, DayflowResult<usize>>> {
        let subscriptions = self.store.list_enabled_subscriptions()?;

        let mut results = BTreeMap::new();
        for subscription in subscriptions {
            let result = self.sync(subscription.id).await;
            results.insert(subscription.id, result);
        }
        Ok(results)
    }

    async fn replace_events(&self, subscription: &Subscription) -> DayflowResult<usize> {
        let bytes = self.fetcher.fetch(&subscription.url).await?;

        let events = parse_ics(&bytes);
        if events.is_empty() {
            return Err(FetchError::NoValidEvents.into());
        }

        self.store
            .replace_subscription_events(subscription.id, events)
    }

    fn lock_for(&self, id: i64) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(id).or_default().clone()
    }

    fn forget_lock(&self, id: i64) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.remove(&id);
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
