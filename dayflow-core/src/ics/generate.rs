//! ICS generation.

use chrono::{Days, Local, NaiveDateTime};
use uuid::Uuid;

use super::text::escape_text;
use super::{DATE_FORMAT, DATE_TIME_FORMAT, PRODID};
use crate::event::{Event, Reminder};

/// Generate a VCALENDAR document containing one VEVENT per event.
pub fn generate_ics(events: &[Event]) -> String {
    let dtstamp = Local::now().naive_local();

    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{}", PRODID));
    push_line(&mut out, "CALSCALE:GREGORIAN");
    push_line(&mut out, "METHOD:PUBLISH");

    for event in events {
        push_event(&mut out, event, dtstamp);
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

/// TRIGGER value for a reminder: the negated lead time as an RFC 5545
/// duration, using the largest whole unit.
pub fn trigger_for(reminder: Reminder) -> String {
    let minutes = reminder.minutes_before();
    if minutes == 0 {
        "-PT0M".to_string()
    } else if minutes % 1440 == 0 {
        format!("-P{}D", minutes / 1440)
    } else if minutes % 60 == 0 {
        format!("-PT{}H", minutes / 60)
    } else {
        format!("-PT{}M", minutes)
    }
}

fn push_event(out: &mut String, event: &Event, dtstamp: NaiveDateTime) {
    push_line(out, "BEGIN:VEVENT");
    push_line(out, &format!("UID:{}", uid_for(event)));
    push_line(out, &format!("DTSTAMP:{}", dtstamp.format(DATE_TIME_FORMAT)));

    if event.all_day {
        // DTEND;VALUE=DATE is exclusive, the model's end day is inclusive
        let end = event
            .end
            .date()
            .checked_add_days(Days::new(1))
            .unwrap_or(event.end.date());
        push_line(
            out,
            &format!("DTSTART;VALUE=DATE:{}", event.start.format(DATE_FORMAT)),
        );
        push_line(out, &format!("DTEND;VALUE=DATE:{}", end.format(DATE_FORMAT)));
    } else {
        push_line(out, &format!("DTSTART:{}", event.start.format(DATE_TIME_FORMAT)));
        push_line(out, &format!("DTEND:{}", event.end.format(DATE_TIME_FORMAT)));
    }

    push_line(out, &format!("SUMMARY:{}", escape_text(&event.title)));

    if let Some(desc) = non_blank(event.description.as_deref()) {
        push_line(out, &format!("DESCRIPTION:{}", escape_text(desc)));
    }

    if let Some(loc) = non_blank(event.location.as_deref()) {
        push_line(out, &format!("LOCATION:{}", escape_text(loc)));
    }

    if let Some(reminder) = event.reminder {
        push_line(out, "BEGIN:VALARM");
        push_line(out, &format!("TRIGGER:{}", trigger_for(reminder)));
        push_line(out, "ACTION:DISPLAY");
        push_line(out, "DESCRIPTION:Reminder");
        push_line(out, "END:VALARM");
    }

    push_line(out, "END:VEVENT");
}

/// Persisted events get a stable UID, unsaved ones a random one.
fn uid_for(event: &Event) -> String {
    if event.id > 0 {
        format!("event-{}@dayflow.app", event.id)
    } else {
        format!("{}@dayflow.app", Uuid::new_v4())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str("\r\n");
}
