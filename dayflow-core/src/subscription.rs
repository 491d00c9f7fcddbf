//! Remote calendar subscriptions.

use std::fmt;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::event::EventColor;

pub const DEFAULT_SYNC_INTERVAL_HOURS: u32 = 24;

/// A remote ICS source whose events are mirrored into the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub name: String,
    /// Unique across all subscriptions.
    pub url: String,
    pub color: EventColor,
    pub enabled: bool,
    /// Advisory only; nothing in the core schedules syncs.
    pub sync_interval_hours: u32,
    /// When the last sync attempt finished, successfully or not.
    pub last_sync_time: Option<NaiveDateTime>,
    pub last_sync_status: SyncStatus,
    /// Set only while `last_sync_status` is `Failed`.
    pub error_message: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Subscription {
    pub fn new(name: impl Into<String>, url: impl Into<String>, color: EventColor) -> Self {
        Subscription {
            id: 0,
            name: name.into(),
            url: url.into(),
            color,
            enabled: true,
            sync_interval_hours: DEFAULT_SYNC_INTERVAL_HOURS,
            last_sync_time: None,
            last_sync_status: SyncStatus::Never,
            error_message: None,
            created_at: Local::now().naive_local(),
        }
    }

    /// Record the outcome of a finished sync attempt.
    pub fn record_sync(&mut self, time: NaiveDateTime, outcome: SyncOutcome) {
        self.last_sync_time = Some(time);
        match outcome {
            SyncOutcome::Success => {
                self.last_sync_status = SyncStatus::Success;
                self.error_message = None;
            }
            SyncOutcome::Failed(message) => {
                self.last_sync_status = SyncStatus::Failed;
                self.error_message = Some(message);
            }
        }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    #[default]
    Never,
    Success,
    Failed,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SyncStatus::Never => "NEVER",
            SyncStatus::Success => "SUCCESS",
            SyncStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Terminal result of one sync attempt, as written back to the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Success,
    Failed(String),
}
