//! Date range for filtering events.

use chrono::{Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::event::Event;

/// Half-open window `[from, to)` over naive local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl Default for DateRange {
    /// Default range: the current month
    fn default() -> Self {
        let today = Local::now().date_naive();
        DateRange::month(today.year(), today.month()).unwrap_or_else(|| DateRange::day(today))
    }
}

impl DateRange {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        DateRange { from, to }
    }

    /// The whole of one day.
    pub fn day(date: NaiveDate) -> Self {
        DateRange::days(date, date)
    }

    /// From the start of `first` through the end of `last`.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        DateRange {
            from: first.and_time(NaiveTime::MIN),
            to: last.and_time(end_of_day()),
        }
    }

    /// One calendar month. `None` for an invalid year/month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(DateRange::days(first, last))
    }

    /// Parse command-line style bounds.
    /// - `from`: YYYY-MM-DD, defaults to the first of the current month
    /// - `to`: YYYY-MM-DD (inclusive), defaults to the end of `from`'s month
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> Result<Self, String> {
        let default = DateRange::default();

        let first = match from {
            Some(s) => parse_date(s)?,
            None => default.from.date(),
        };

        let last = match to {
            Some(s) => parse_date(s)?,
            None => DateRange::month(first.year(), first.month())
                .map(|m| m.to.date())
                .unwrap_or(first),
        };

        Ok(DateRange::days(first, last))
    }

    /// Whether an event overlaps the window: it starts inside it, ends inside
    /// it, or covers it entirely.
    pub fn overlaps(&self, event: &Event) -> bool {
        let starts_inside = event.start >= self.from && event.start < self.to;
        let ends_inside = event.end >= self.from && event.end < self.to;
        let covers = event.start < self.from && event.end >= self.to;
        starts_inside || ends_inside || covers
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

/// Parse YYYY-MM-DD
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
