use anyhow::Result;
use chrono::NaiveDate;
use dayflow_core::date_range::DateRange;
use dayflow_core::store::EventStore;
use owo_colors::OwoColorize;

use super::App;
use crate::render::{date_label, Render};

pub enum Query {
    Range(DateRange),
    Day(NaiveDate),
    Search(String),
}

pub fn run(app: &App, query: Query) -> Result<()> {
    let events = match &query {
        Query::Range(range) => app.store.events_in_range(range)?,
        Query::Day(date) => app.store.events_on_date(*date)?,
        Query::Search(text) => app.store.search_events(text)?,
    };

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group by start day
    let mut current_date: Option<NaiveDate> = None;
    for event in &events {
        let date = event.start.date();
        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label(date).bold());
            current_date = Some(date);
        }
        println!("{}", event.render());
    }

    Ok(())
}
