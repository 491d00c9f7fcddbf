//! Calendar event types.
//!
//! `Event` is the single in-memory representation shared by the ICS codec,
//! the stores and the synchronizer. Times are naive local times; the codec
//! does not interpret timezones.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DayflowError, DayflowResult};

/// A scheduled occurrence on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier, `0` until the event is persisted.
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: NaiveDateTime,
    /// Inclusive end. Not required to be after `start`; kept as given.
    pub end: NaiveDateTime,
    pub all_day: bool,
    pub color: EventColor,
    pub reminder: Option<Reminder>,
    /// RRULE value, carried through untouched.
    pub recurrence_rule: Option<String>,
    /// Owning subscription. `None` for locally authored events.
    pub subscription_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Event {
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let now = Local::now().naive_local();
        Event {
            id: 0,
            title: title.into(),
            description: None,
            location: None,
            start,
            end,
            all_day: false,
            color: EventColor::default(),
            reminder: None,
            recurrence_rule: None,
            subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the fields a caller must supply before the event is stored.
    pub fn validate(&self) -> DayflowResult<()> {
        if self.title.trim().is_empty() {
            return Err(DayflowError::Validation("title must not be blank".into()));
        }
        Ok(())
    }

    /// Whether `date` falls within the event's start..=end day span.
    pub fn is_on_date(&self, date: NaiveDate) -> bool {
        date >= self.start.date() && date <= self.end.date()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription_id.is_some()
    }
}

/// The fixed display palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventColor {
    Red,
    Pink,
    Purple,
    DeepPurple,
    Indigo,
    #[default]
    Blue,
    LightBlue,
    Cyan,
    Teal,
    Green,
    LightGreen,
    Lime,
    Yellow,
    Amber,
    Orange,
    DeepOrange,
    Brown,
    Grey,
}

impl EventColor {
    pub const ALL: [EventColor; 18] = [
        EventColor::Red,
        EventColor::Pink,
        EventColor::Purple,
        EventColor::DeepPurple,
        EventColor::Indigo,
        EventColor::Blue,
        EventColor::LightBlue,
        EventColor::Cyan,
        EventColor::Teal,
        EventColor::Green,
        EventColor::LightGreen,
        EventColor::Lime,
        EventColor::Yellow,
        EventColor::Amber,
        EventColor::Orange,
        EventColor::DeepOrange,
        EventColor::Brown,
        EventColor::Grey,
    ];

    /// Palette entry at `ordinal`, falling back to the default color.
    pub fn from_ordinal(ordinal: usize) -> Self {
        Self::ALL.get(ordinal).copied().unwrap_or_default()
    }

    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Look up a color by its tag (`"DEEP_ORANGE"`, `"deep-orange"`, ...).
    /// Unknown tags map to the default color.
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.tag() == normalized)
            .unwrap_or_default()
    }

    pub fn tag(self) -> &'static str {
        match self {
            EventColor::Red => "RED",
            EventColor::Pink => "PINK",
            EventColor::Purple => "PURPLE",
            EventColor::DeepPurple => "DEEP_PURPLE",
            EventColor::Indigo => "INDIGO",
            EventColor::Blue => "BLUE",
            EventColor::LightBlue => "LIGHT_BLUE",
            EventColor::Cyan => "CYAN",
            EventColor::Teal => "TEAL",
            EventColor::Green => "GREEN",
            EventColor::LightGreen => "LIGHT_GREEN",
            EventColor::Lime => "LIME",
            EventColor::Yellow => "YELLOW",
            EventColor::Amber => "AMBER",
            EventColor::Orange => "ORANGE",
            EventColor::DeepOrange => "DEEP_ORANGE",
            EventColor::Brown => "BROWN",
            EventColor::Grey => "GREY",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EventColor::Red => "Red",
            EventColor::Pink => "Pink",
            EventColor::Purple => "Purple",
            EventColor::DeepPurple => "Deep purple",
            EventColor::Indigo => "Indigo",
            EventColor::Blue => "Blue",
            EventColor::LightBlue => "Light blue",
            EventColor::Cyan => "Cyan",
            EventColor::Teal => "Teal",
            EventColor::Green => "Green",
            EventColor::LightGreen => "Light green",
            EventColor::Lime => "Lime",
            EventColor::Yellow => "Yellow",
            EventColor::Amber => "Amber",
            EventColor::Orange => "Orange",
            EventColor::DeepOrange => "Deep orange",
            EventColor::Brown => "Brown",
            EventColor::Grey => "Grey",
        }
    }

    /// ARGB value used by the presentation layer.
    pub fn hex(self) -> u32 {
        match self {
            EventColor::Red => 0xFFE53935,
            EventColor::Pink => 0xFFD81B60,
            EventColor::Purple => 0xFF8E24AA,
            EventColor::DeepPurple => 0xFF5E35B1,
            EventColor::Indigo => 0xFF3949AB,
            EventColor::Blue => 0xFF1E88E5,
            EventColor::LightBlue => 0xFF039BE5,
            EventColor::Cyan => 0xFF00ACC1,
            EventColor::Teal => 0xFF00897B,
            EventColor::Green => 0xFF43A047,
            EventColor::LightGreen => 0xFF7CB342,
            EventColor::Lime => 0xFFC0CA33,
            EventColor::Yellow => 0xFFFDD835,
            EventColor::Amber => 0xFFFFB300,
            EventColor::Orange => 0xFFFB8C00,
            EventColor::DeepOrange => 0xFFF4511E,
            EventColor::Brown => 0xFF6D4C41,
            EventColor::Grey => 0xFF757575,
        }
    }
}

/// Lead time before `start` at which a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reminder {
    AtTime,
    Minutes5,
    Minutes10,
    Minutes15,
    Minutes30,
    Hours1,
    Hours2,
    Days1,
    Days2,
}

impl Reminder {
    pub const ALL: [Reminder; 9] = [
        Reminder::AtTime,
        Reminder::Minutes5,
        Reminder::Minutes10,
        Reminder::Minutes15,
        Reminder::Minutes30,
        Reminder::Hours1,
        Reminder::Hours2,
        Reminder::Days1,
        Reminder::Days2,
    ];

    pub fn minutes_before(self) -> i64 {
        match self {
            Reminder::AtTime => 0,
            Reminder::Minutes5 => 5,
            Reminder::Minutes10 => 10,
            Reminder::Minutes15 => 15,
            Reminder::Minutes30 => 30,
            Reminder::Hours1 => 60,
            Reminder::Hours2 => 120,
            Reminder::Days1 => 1440,
            Reminder::Days2 => 2880,
        }
    }

    /// The reminder with exactly this lead time, if it is one of the fixed set.
    pub fn from_minutes(minutes: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.minutes_before() == minutes)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Reminder::AtTime => "At time of event",
            Reminder::Minutes5 => "5 minutes before",
            Reminder::Minutes10 => "10 minutes before",
            Reminder::Minutes15 => "15 minutes before",
            Reminder::Minutes30 => "30 minutes before",
            Reminder::Hours1 => "1 hour before",
            Reminder::Hours2 => "2 hours before",
            Reminder::Days1 => "1 day before",
            Reminder::Days2 => "2 days before",
        }
    }
}
