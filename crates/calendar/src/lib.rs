//! "Add to calendar" links for events: a Google Calendar template URL and a
//! local iCalendar file.

mod google;
mod ics;

use chrono::{DateTime, Datelike, Duration, Utc};
use eventdesk_shared::Event;

pub use google::google_calendar_link;
pub use ics::*;

/// Returned in place of a link when the event date cannot be read.
pub const SENTINEL: &str = "#";

/// Start and end (two hours later) of the calendar entry. Logs and returns
/// `None` when the event date is not a valid instant or the entry does not
/// fit in four-digit years.
pub fn event_window(event: &Event) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let window = event.starts_at().and_then(|start| {
        let end = start.checked_add_signed(Duration::hours(2))?;
        (start.year() >= 0 && end.year() <= 9999).then_some((start, end))
    });

    if window.is_none() {
        tracing::error!(event_id = %event.id, event_date = %event.event_date, "invalid event date");
    }

    window
}

/// `YYYYMMDDTHHMMSSZ`
pub fn format_utc_basic(value: &DateTime<Utc>) -> String {
    value.format("%Y%m%dT%H%M%SZ").to_string()
}
