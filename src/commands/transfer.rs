use std::path::Path;

use anyhow::{Context, Result};
use dayflow_core::date_range::DateRange;
use dayflow_core::store::EventStore;
use dayflow_core::transfer;

use super::App;
use crate::render::pluralize;

pub fn import(app: &App, path: &Path) -> Result<()> {
    let content =
        std::fs::read(path).with_context(|| format!("Could not read {}", path.display()))?;
    let count = transfer::import_ics(&*app.store, &content)?;

    println!("Imported {} {} from {}", count, pluralize("event", count), path.display());
    Ok(())
}

/// Export visible events, optionally limited to a date range.
pub fn export(app: &App, path: &Path, range: Option<DateRange>) -> Result<()> {
    let events = match range {
        Some(range) => app.store.events_in_range(&range)?,
        None => app.store.visible_events()?,
    };

    transfer::export_to_path(path, &events)?;
    println!(
        "Exported {} {} to {}",
        events.len(),
        pluralize("event", events.len()),
        path.display()
    );
    Ok(())
}
