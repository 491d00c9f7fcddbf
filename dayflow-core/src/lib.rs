//! Core of the DayFlow calendar.
//!
//! This crate provides:
//! - `Event`, `Subscription` and their palettes/enums
//! - `ics` module for reading and writing iCalendar VEVENT/VALARM data
//! - `store` traits with an in-process implementation
//! - `Synchronizer` for keeping subscribed calendars up to date

pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod fetch;
pub mod ics;
pub mod store;
pub mod subscription;
pub mod sync;
pub mod transfer;

pub use config::DayflowConfig;
pub use date_range::DateRange;
pub use error::{DayflowError, DayflowResult, FetchError};
pub use event::{Event, EventColor, Reminder};
pub use fetch::{Fetcher, HttpFetcher};
pub use store::{EventStore, MemoryStore, SubscriptionStore};
pub use subscription::{Subscription, SyncStatus};
pub use sync::Synchronizer;
