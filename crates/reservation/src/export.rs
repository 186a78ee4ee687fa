use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use eventdesk_shared::{Reservation, format_display, parse_instant};

use crate::reservation_name_or_marker;

pub const CSV_HEADER: &str = "Name,Email,Reservation date";
pub const EMAIL_UNAVAILABLE: &str = "Email unavailable";
pub const DATE_UNAVAILABLE: &str = "Date unavailable";
pub const INVALID_DATE: &str = "Invalid date";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no reservations to export")]
    Empty,

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
    pub rows: usize,
}

impl CsvExport {
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// `dd/MM/yyyy HH:mm` of the reservation time, or a marker.
pub fn export_date(reservation: &Reservation) -> String {
    let Some(raw) = reservation
        .reserved_at()
        .filter(|raw| !matches!(*raw, "null" | "undefined"))
    else {
        return DATE_UNAVAILABLE.to_owned();
    };

    match parse_instant(raw) {
        Some(instant) => format_display(&instant),
        None => INVALID_DATE.to_owned(),
    }
}

/// `reservations-<event name>-<yyyy-MM-dd>.csv`, with every character of the
/// name outside `[A-Za-z0-9]` replaced by `-`.
pub fn export_file_name(event_name: Option<&str>, today: NaiveDate) -> String {
    let name = event_name
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
                .collect::<String>()
        })
        .unwrap_or_else(|| "event".to_owned());

    format!("reservations-{name}-{}.csv", today.format("%Y-%m-%d"))
}

/// Encodes the view in its current order. Every field is quoted.
pub fn export_csv(
    view: &[&Reservation],
    event_name: Option<&str>,
    today: NaiveDate,
) -> Result<CsvExport, ExportError> {
    if view.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for reservation in view {
        writer.write_record([
            reservation_name_or_marker(reservation).as_str(),
            reservation.email().unwrap_or(EMAIL_UNAVAILABLE),
            export_date(reservation).as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    let content = format!("{CSV_HEADER}\n{}", String::from_utf8_lossy(&bytes));

    tracing::info!(rows = view.len(), "roster exported");

    Ok(CsvExport {
        file_name: export_file_name(event_name, today),
        content,
        rows: view.len(),
    })
}
