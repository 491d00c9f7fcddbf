//! ICS generation and parsing.
//!
//! This module reads and writes the subset of RFC 5545 that dayflow cares
//! about: VEVENT blocks with an optional VALARM. Both directions are plain
//! functions with no shared state.

mod generate;
mod parse;
mod text;

pub use generate::{generate_ics, trigger_for};
pub use parse::{parse_ics, reminder_for_trigger};
pub use text::{escape_text, unescape_text};

/// Product identifier written into every generated calendar.
pub const PRODID: &str = "-//DayFlow//Calendar//CN";

pub(crate) const DATE_FORMAT: &str = "%Y%m%d";
pub(crate) const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
