//! Importing and exporting ICS files.

use std::path::Path;

use tracing::info;

use crate::error::{DayflowResult, FetchError};
use crate::event::Event;
use crate::ics::{generate_ics, parse_ics};
use crate::store::EventStore;

/// Decode `content` and store every event as locally authored.
///
/// Returns how many events were stored, or `NoValidEvents` if nothing
/// decoded.
pub fn import_ics<S: EventStore + ?Sized>(store: &S, content: &[u8]) -> DayflowResult<usize> {
    let events = parse_ics(content);
    if events.is_empty() {
        return Err(FetchError::NoValidEvents.into());
    }

    let mut imported = 0;
    for mut event in events {
        event.subscription_id = None;
        store.insert_event(event)?;
        imported += 1;
    }

    info!(imported, "Imported events");
    Ok(imported)
}

pub fn export_ics(events: &[Event]) -> String {
    generate_ics(events)
}

/// Write `events` as a calendar file at `path`, creating parent directories.
pub fn export_to_path(path: &Path, events: &[Event]) -> DayflowResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, export_ics(events))?;

    info!(path = %path.display(), count = events.len(), "Exported events");
    Ok(())
}
