//! ICS parsing.
//!
//! A single pass over the unfolded lines drives a three-state machine
//! (outside any event, inside a VEVENT, inside a VALARM of that VEVENT).
//! Each block accumulates `NAME -> value` pairs; a finished VEVENT is turned
//! into an [`Event`] or dropped. Malformed input never aborts the pass.

use std::collections::HashMap;

use chrono::{Days, NaiveDate, NaiveDateTime, TimeDelta};
use icalendar::parser::unfold;
use thiserror::Error;
use tracing::debug;

use super::text::unescape_text;
use super::{DATE_FORMAT, DATE_TIME_FORMAT};
use crate::event::{Event, Reminder};

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";
const BEGIN_ALARM: &str = "BEGIN:VALARM";
const END_ALARM: &str = "END:VALARM";

/// Parse ICS content into the events it contains, skipping any VEVENT that
/// cannot be turned into an event.
pub fn parse_ics(content: &[u8]) -> Vec<Event> {
    let text = String::from_utf8_lossy(content);
    let unfolded = unfold(&text);

    let mut parser = Parser::default();
    for line in unfolded.lines() {
        parser.feed(line.trim_end_matches('\r'));
    }
    parser.events
}

/// Map a VALARM TRIGGER value onto one of the fixed reminder lead times.
///
/// Only the exact spellings the encoder writes are recognised, plus `PT0M`.
/// Equivalent durations such as `-PT60M` give no reminder.
pub fn reminder_for_trigger(value: &str) -> Option<Reminder> {
    let reminder = match value.trim() {
        "-PT0M" | "PT0M" => Reminder::AtTime,
        "-PT5M" => Reminder::Minutes5,
        "-PT10M" => Reminder::Minutes10,
        "-PT15M" => Reminder::Minutes15,
        "-PT30M" => Reminder::Minutes30,
        "-PT1H" => Reminder::Hours1,
        "-PT2H" => Reminder::Hours2,
        "-P1D" => Reminder::Days1,
        "-P2D" => Reminder::Days2,
        _ => return None,
    };
    Some(reminder)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Outside,
    InEvent,
    InAlarm,
}

type Properties = HashMap<String, String>;

#[derive(Default)]
struct Parser {
    state: State,
    event_props: Properties,
    alarm_props: Option<Properties>,
    events: Vec<Event>,
}

impl Parser {
    fn feed(&mut self, line: &str) {
        let marker = line.trim();

        // A new VEVENT always starts fresh, discarding any unterminated one
        if marker == BEGIN_EVENT {
            self.state = State::InEvent;
            self.event_props.clear();
            self.alarm_props = None;
            return;
        }

        match self.state {
            State::Outside => {}
            State::InEvent | State::InAlarm if marker == END_EVENT => self.finish_event(),
            State::InEvent if marker == BEGIN_ALARM => {
                self.alarm_props = Some(Properties::new());
                self.state = State::InAlarm;
            }
            State::InEvent => {
                if let Some((name, value)) = split_property(line) {
                    self.event_props.insert(name, value);
                }
            }
            State::InAlarm if marker == END_ALARM => self.state = State::InEvent,
            State::InAlarm => {
                if let (Some((name, value)), Some(alarm)) =
                    (split_property(line), self.alarm_props.as_mut())
                {
                    alarm.insert(name, value);
                }
            }
        }
    }

    fn finish_event(&mut self) {
        let props = std::mem::take(&mut self.event_props);
        let alarm = self.alarm_props.take();
        self.state = State::Outside;

        match build_event(&props, alarm.as_ref()) {
            Ok(event) => self.events.push(event),
            Err(reason) => debug!(%reason, uid = props.get("UID").map(String::as_str), "Skipping VEVENT"),
        }
    }
}

/// Why a VEVENT block was dropped.
#[derive(Error, Debug)]
enum SkipReason {
    #[error("missing SUMMARY")]
    MissingSummary,

    #[error("missing DTSTART")]
    MissingStart,

    #[error("unparseable DTSTART '{0}'")]
    InvalidStart(String),
}

/// Split `NAME;PARAM=x:VALUE` into the upper-cased bare name and the raw value.
fn split_property(line: &str) -> Option<(String, String)> {
    let line = line.trim_start();
    let (head, value) = line.split_once(':')?;
    let name = head.split(';').next().unwrap_or(head).trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_ascii_uppercase(), value.to_string()))
}

fn build_event(props: &Properties, alarm: Option<&Properties>) -> Result<Event, SkipReason> {
    let title = props
        .get("SUMMARY")
        .map(|s| unescape_text(s))
        .filter(|s| !s.trim().is_empty())
        .ok_or(SkipReason::MissingSummary)?;

    let raw_start = props.get("DTSTART").ok_or(SkipReason::MissingStart)?;
    let start_value =
        parse_date_value(raw_start).ok_or_else(|| SkipReason::InvalidStart(raw_start.clone()))?;
    let all_day = start_value.is_date();
    let start = start_value.to_naive();

    let end = match props.get("DTEND").and_then(|v| parse_date_value(v)) {
        // A date-only DTEND is exclusive; the model's end day is inclusive
        Some(DateValue::Date(d)) if all_day => d
            .checked_sub_days(Days::new(1))
            .map(|d| d.and_time(start.time()))
            .filter(|end| *end >= start)
            .unwrap_or(start),
        Some(value) => value.to_naive(),
        None => start + TimeDelta::hours(1),
    };

    let reminder = alarm
        .and_then(|a| a.get("TRIGGER"))
        .and_then(|t| reminder_for_trigger(t));

    let mut event = Event::new(title, start, end);
    event.all_day = all_day;
    event.description = props.get("DESCRIPTION").map(|s| unescape_text(s));
    event.location = props.get("LOCATION").map(|s| unescape_text(s));
    event.recurrence_rule = props.get("RRULE").cloned();
    event.reminder = reminder;
    Ok(event)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DateValue {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl DateValue {
    fn is_date(&self) -> bool {
        matches!(self, DateValue::Date(_))
    }

    fn to_naive(self) -> NaiveDateTime {
        match self {
            DateValue::Date(d) => d.and_time(chrono::NaiveTime::MIN),
            DateValue::DateTime(dt) => dt,
        }
    }
}

/// `YYYYMMDD` is a date; anything with a `T` is a date-time whose trailing
/// `Z` is dropped (times are treated as local).
fn parse_date_value(value: &str) -> Option<DateValue> {
    let value = value.trim();
    if value.len() == 8 {
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .ok()
            .map(DateValue::Date)
    } else if value.contains('T') {
        let value = value.strip_suffix('Z').unwrap_or(value);
        NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
            .ok()
            .map(DateValue::DateTime)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventColor;
    use crate::ics::generate_ics;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_and_generate_roundtrip() {
        let mut event = Event::new("Design review", dt(2025, 3, 20, 15, 0), dt(2025, 3, 20, 16, 30));
        event.description = Some("Agenda:\n1) API, 2) schema; C:\\docs".into());
        event.location = Some("Room 4, Building B".into());
        event.reminder = Some(Reminder::Minutes15);

        let ics = generate_ics(std::slice::from_ref(&event));
        let parsed = parse_ics(ics.as_bytes());

        assert_eq!(parsed.len(), 1, "ICS:\n{}", ics);
        let parsed = &parsed[0];
        assert_eq!(parsed.title, event.title);
        assert_eq!(parsed.description, event.description);
        assert_eq!(parsed.location, event.location);
        assert_eq!(parsed.start, event.start);
        assert_eq!(parsed.end, event.end);
        assert!(!parsed.all_day);
        assert_eq!(parsed.reminder, Some(Reminder::Minutes15));
    }

    #[test]
    fn test_all_day_roundtrip_keeps_inclusive_end() {
        let day = dt(2024, 1, 1, 0, 0);
        let mut event = Event::new("Holiday", day, day);
        event.all_day = true;

        let ics = generate_ics(&[event]);
        assert!(ics.contains("DTEND;VALUE=DATE:20240102"));

        let parsed = parse_ics(ics.as_bytes());
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].all_day);
        assert_eq!(parsed[0].start, day);
        assert_eq!(parsed[0].end.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_multi_day_all_day_event() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
SUMMARY:Conference\n\
DTSTART;VALUE=DATE:20240610\n\
DTEND;VALUE=DATE:20240613\n\
END:VEVENT\n\
END:VCALENDAR\n";

        let events = parse_ics(ics.as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, dt(2024, 6, 10, 0, 0));
        assert_eq!(events[0].end, dt(2024, 6, 12, 0, 0));
    }

    #[test]
    fn test_malformed_block_is_dropped() {
        let ics = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
UID:good\r\n\
SUMMARY:Kept\r\n\
DTSTART:20240301T090000\r\n\
DTEND:20240301T100000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:no-summary\r\n\
DTSTART:20240302T090000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:bad-start\r\n\
SUMMARY:Broken\r\n\
DTSTART:tomorrow\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:no-start\r\n\
SUMMARY:Floating\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse_ics(ics.as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Kept");
    }

    #[test]
    fn test_decoded_events_are_unassigned() {
        let ics = "BEGIN:VEVENT\nSUMMARY:x\nDTSTART:20240301T090000\nEND:VEVENT\n";
        let events = parse_ics(ics.as_bytes());

        assert_eq!(events[0].id, 0);
        assert_eq!(events[0].color, EventColor::Blue);
        assert_eq!(events[0].subscription_id, None);
    }

    #[test]
    fn test_missing_dtend_defaults_to_one_hour() {
        let ics = "BEGIN:VEVENT\nSUMMARY:Call\nDTSTART:20240301T090000Z\nEND:VEVENT\n";
        let events = parse_ics(ics.as_bytes());

        assert_eq!(events[0].start, dt(2024, 3, 1, 9, 0));
        assert_eq!(events[0].end, dt(2024, 3, 1, 10, 0));
    }

    #[test]
    fn test_parameters_are_discarded() {
        let ics = "BEGIN:VEVENT\n\
SUMMARY;LANGUAGE=en:Standup\n\
DTSTART;TZID=Europe/Berlin:20240301T090000\n\
DTEND;TZID=Europe/Berlin:20240301T091500\n\
END:VEVENT\n";

        let events = parse_ics(ics.as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Standup");
        assert_eq!(events[0].end, dt(2024, 3, 1, 9, 15));
    }

    #[test]
    fn test_last_duplicate_property_wins() {
        let ics = "BEGIN:VEVENT\n\
SUMMARY:First\n\
SUMMARY:Second\n\
DTSTART:20240301T090000\n\
END:VEVENT\n";

        let events = parse_ics(ics.as_bytes());
        assert_eq!(events[0].title, "Second");
    }

    #[test]
    fn test_reminder_trigger_mapping() {
        let ics = "BEGIN:VEVENT\n\
SUMMARY:Dentist\n\
DTSTART:20240301T090000\n\
BEGIN:VALARM\n\
TRIGGER:-PT30M\n\
ACTION:DISPLAY\n\
DESCRIPTION:Reminder\n\
END:VALARM\n\
END:VEVENT\n";

        let events = parse_ics(ics.as_bytes());
        assert_eq!(events[0].reminder, Some(Reminder::Minutes30));
        // The alarm DESCRIPTION must not leak into the event
        assert_eq!(events[0].description, None);
    }

    #[test]
    fn test_reminder_for_trigger_values() {
        assert_eq!(reminder_for_trigger("-PT0M"), Some(Reminder::AtTime));
        assert_eq!(reminder_for_trigger("PT0M"), Some(Reminder::AtTime));
        assert_eq!(reminder_for_trigger("-PT5M"), Some(Reminder::Minutes5));
        assert_eq!(reminder_for_trigger("-PT10M"), Some(Reminder::Minutes10));
        assert_eq!(reminder_for_trigger("-PT15M"), Some(Reminder::Minutes15));
        assert_eq!(reminder_for_trigger("-PT30M"), Some(Reminder::Minutes30));
        assert_eq!(reminder_for_trigger("-PT1H"), Some(Reminder::Hours1));
        assert_eq!(reminder_for_trigger("-PT2H"), Some(Reminder::Hours2));
        assert_eq!(reminder_for_trigger("-P1D"), Some(Reminder::Days1));
        assert_eq!(reminder_for_trigger("-P2D"), Some(Reminder::Days2));

        assert_eq!(reminder_for_trigger("-PT7M"), None);
        assert_eq!(reminder_for_trigger("PT5M"), None);
        assert_eq!(reminder_for_trigger("19980101T050000Z"), None);
        assert_eq!(reminder_for_trigger(""), None);
    }

    #[test]
    fn test_equivalent_trigger_spellings_are_not_reminders() {
        assert_eq!(reminder_for_trigger("-PT60M"), None);
        assert_eq!(reminder_for_trigger("-P0D"), None);
        assert_eq!(reminder_for_trigger("+PT0S"), None);
        assert_eq!(reminder_for_trigger("-PT1440M"), None);
        assert_eq!(reminder_for_trigger("-PT120M"), None);

        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
SUMMARY:Standup\n\
DTSTART:20240410T090000\n\
BEGIN:VALARM\n\
TRIGGER:-PT60M\n\
END:VALARM\n\
END:VEVENT\n\
END:VCALENDAR\n";
        let events = parse_ics(ics.as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reminder, None);
    }

    #[test]
    fn test_encoded_triggers_decode_to_same_reminder() {
        for reminder in Reminder::ALL {
            let trigger = crate::ics::trigger_for(reminder);
            assert_eq!(reminder_for_trigger(&trigger), Some(reminder));
        }
    }

    #[test]
    fn test_unknown_components_are_ignored() {
        let ics = "BEGIN:VCALENDAR\n\
BEGIN:VTIMEZONE\n\
TZID:Europe/Berlin\n\
END:VTIMEZONE\n\
BEGIN:VTODO\n\
SUMMARY:Not an event\n\
DTSTART:20240301T090000\n\
END:VTODO\n\
BEGIN:VEVENT\n\
SUMMARY:Real\n\
DTSTART:20240301T090000\n\
END:VEVENT\n\
END:VCALENDAR\n";

        let events = parse_ics(ics.as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Real");
    }

    #[test]
    fn test_unterminated_event_is_discarded_by_next_begin() {
        let ics = "BEGIN:VEVENT\n\
SUMMARY:Lost\n\
DTSTART:20240301T090000\n\
BEGIN:VEVENT\n\
SUMMARY:Found\n\
DTSTART:20240302T090000\n\
END:VEVENT\n";

        let events = parse_ics(ics.as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Found");
    }

    #[test]
    fn test_folded_lines_are_joined() {
        let ics = "BEGIN:VEVENT\r\n\
SUMMARY:A rather long\r\n  title\r\n\
DTSTART:20240301T090000\r\n\
END:VEVENT\r\n";

        let events = parse_ics(ics.as_bytes());
        assert_eq!(events[0].title, "A rather long title");
    }

    #[test]
    fn test_blank_summary_is_dropped() {
        let ics = "BEGIN:VEVENT\nSUMMARY:\nDTSTART:20240301T090000\nEND:VEVENT\n";
        assert!(parse_ics(ics.as_bytes()).is_empty());
    }

    #[test]
    fn test_garbage_input_yields_nothing() {
        assert!(parse_ics(b"").is_empty());
        assert!(parse_ics(b"<html><body>404</body></html>").is_empty());
        assert!(parse_ics(&[0xff, 0xfe, 0x00, 0x42]).is_empty());
    }

    #[test]
    fn test_recurrence_rule_is_passed_through() {
        let ics = "BEGIN:VEVENT\n\
SUMMARY:Weekly\n\
DTSTART:20240101T100000\n\
RRULE:FREQ=WEEKLY;BYDAY=MO\n\
END:VEVENT\n";

        let events = parse_ics(ics.as_bytes());
        assert_eq!(events[0].recurrence_rule.as_deref(), Some("FREQ=WEEKLY;BYDAY=MO"));
    }
}
