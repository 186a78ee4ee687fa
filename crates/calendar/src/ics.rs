use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use eventdesk_shared::Event;
use url::Url;

use crate::{SENTINEL, event_window, format_utc_basic};

pub const UID_DOMAIN: &str = "eventdesk.app";

/// Escapes a TEXT value (RFC 5545, 3.3.11).
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }

    escaped
}

/// The CRLF-joined VCALENDAR for `event`, or `None` when its date is invalid.
pub fn ics_document(event: &Event) -> Option<String> {
    let (start, end) = event_window(event)?;

    let lines = [
        "BEGIN:VCALENDAR".to_owned(),
        "VERSION:2.0".to_owned(),
        "PRODID:-//eventdesk//eventdesk//EN".to_owned(),
        "BEGIN:VEVENT".to_owned(),
        format!("UID:{}@{UID_DOMAIN}", event.id),
        format!("DTSTART:{}", format_utc_basic(&start)),
        format!("DTEND:{}", format_utc_basic(&end)),
        format!("SUMMARY:{}", escape_text(&event.name)),
        format!(
            "DESCRIPTION:{}",
            escape_text(event.description.as_deref().unwrap_or_default())
        ),
        format!("LOCATION:{}", escape_text(event.venue_text())),
        "END:VEVENT".to_owned(),
        "END:VCALENDAR".to_owned(),
    ];

    Some(lines.join("\r\n"))
}

/// A `file://` link to a calendar file that lives as long as the handle.
#[derive(Debug)]
pub struct IcalLink {
    href: String,
    path: Option<PathBuf>,
}

impl IcalLink {
    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Keeps the file on disk after the handle is dropped.
    pub fn persist(mut self) -> Option<PathBuf> {
        self.path.take()
    }
}

impl Drop for IcalLink {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };

        if let Err(err) = fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), err = %err, "failed to remove calendar file");
        }
    }
}

pub fn ical_link(event: &Event) -> io::Result<IcalLink> {
    ical_link_in(event, &env::temp_dir())
}

/// Writes the calendar file into `dir`, resolved against the working
/// directory when relative. An event with an invalid date
/// yields the `#` link and no file.
pub fn ical_link_in(event: &Event, dir: &Path) -> io::Result<IcalLink> {
    let Some(document) = ics_document(event) else {
        return Ok(IcalLink {
            href: SENTINEL.to_owned(),
            path: None,
        });
    };

    let dir = std::path::absolute(dir)?;
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("event-{}.ics", ulid::Ulid::new()));
    fs::write(&path, document)?;

    let href = Url::from_file_path(&path)
        .map(String::from)
        .map_err(|()| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not an absolute path", path.display()),
            )
        });

    let href = match href {
        Ok(href) => href,
        Err(err) => {
            let _ = fs::remove_file(&path);
            return Err(err);
        }
    };

    tracing::debug!(path = %path.display(), "calendar file written");

    Ok(IcalLink {
        href,
        path: Some(path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(
            escape_text("Room 1; floor 2, \"west\"\r\nBring a laptop \\o/"),
            "Room 1\\; floor 2\\, \"west\"\\nBring a laptop \\\\o/"
        );
    }
}
