//! Colored terminal rendering for dayflow types.

use chrono::{Local, NaiveDate};
use dayflow_core::event::{Event, EventColor};
use dayflow_core::subscription::{Subscription, SyncStatus};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventColor {
    /// A swatch in the palette color itself.
    fn render(&self) -> String {
        let rgb = self.hex();
        let (r, g, b) = ((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8);
        "●".truecolor(r, g, b).to_string()
    }
}

impl Render for SyncStatus {
    fn render(&self) -> String {
        match self {
            SyncStatus::Never => "never synced".dimmed().to_string(),
            SyncStatus::Success => "ok".green().to_string(),
            SyncStatus::Failed => "failed".red().to_string(),
        }
    }
}

impl Render for Subscription {
    fn render(&self) -> String {
        let mut line = format!(
            "{} {} {} {}",
            format!("#{}", self.id).dimmed(),
            self.color.render(),
            self.name.bold(),
            self.url.dimmed()
        );

        if !self.enabled {
            line.push_str(&format!(" {}", "(disabled)".yellow()));
        }

        let last_sync = match self.last_sync_time {
            Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
            None => "-".to_string(),
        };
        line.push_str(&format!("\n     {} {}", self.last_sync_status.render(), last_sync.dimmed()));

        if let Some(message) = &self.error_message {
            line.push_str(&format!("\n     {}", message.red()));
        }

        line
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let time = if self.all_day {
            format!("{:>7}", "all-day")
        } else {
            format!("{:>7}", self.start.format("%H:%M"))
        };

        let mut line = format!("  {} {} {}", time, self.color.render(), self.title);
        if let Some(location) = &self.location {
            line.push_str(&format!(" {}", format!("@ {}", location).dimmed()));
        }
        if let Some(id) = self.subscription_id {
            line.push_str(&format!(" {}", format!("[sub #{}]", id).dimmed()));
        }
        line
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
pub fn date_label(date: NaiveDate) -> String {
    let today = Local::now().date_naive();
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
