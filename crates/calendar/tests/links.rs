use std::{
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use eventdesk_calendar::{SENTINEL, google_calendar_link, ical_link_in, ics_document};
use eventdesk_shared::Event;
use temp_dir::TempDir;

fn event(event_date: &str) -> Event {
    Event {
        id: "e42".to_owned(),
        name: "Rust & Coffee".to_owned(),
        description: Some("Talks, then coffee".to_owned()),
        event_date: event_date.to_owned(),
        location: Some("Hall A; 2nd floor".to_owned()),
        online_link: Some("https://meet.example.com/rust".to_owned()),
        max_capacity: 30,
        available_spots: 10,
        price: None,
        creator_id: "admin".to_owned(),
        creator: None,
        count: None,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn test_google_link() {
    let link = google_calendar_link(&event("2025-06-10T18:30:00.000Z"));

    assert_eq!(
        link,
        "https://calendar.google.com/calendar/render?action=TEMPLATE\
         &text=Rust+%26+Coffee\
         &dates=20250610T183000Z%2F20250610T203000Z\
         &details=Talks%2C+then+coffee\
         &location=Hall+A%3B+2nd+floor"
    );
}

#[test]
fn test_google_link_online_event() {
    let mut online = event("2025-06-10T23:00:00Z");
    online.location = None;
    online.description = None;

    let link = google_calendar_link(&online);

    assert!(link.contains("dates=20250610T230000Z%2F20250611T010000Z"));
    assert!(link.contains("&details=&"));
    assert!(link.ends_with("location=https%3A%2F%2Fmeet.example.com%2Frust"));
}

#[test]
fn test_ics_document() {
    let document = ics_document(&event("2025-06-10T18:30:00.000Z")).unwrap();

    assert_eq!(
        document.split("\r\n").collect::<Vec<_>>(),
        vec![
            "BEGIN:VCALENDAR",
            "VERSION:2.0",
            "PRODID:-//eventdesk//eventdesk//EN",
            "BEGIN:VEVENT",
            "UID:e42@eventdesk.app",
            "DTSTART:20250610T183000Z",
            "DTEND:20250610T203000Z",
            "SUMMARY:Rust & Coffee",
            "DESCRIPTION:Talks\\, then coffee",
            "LOCATION:Hall A\\; 2nd floor",
            "END:VEVENT",
            "END:VCALENDAR",
        ]
    );
    assert!(!document.ends_with("\r\n"));
}

#[test]
fn test_ical_file_lives_with_the_link() -> anyhow::Result<()> {
    let dir = TempDir::new()?;

    let link = ical_link_in(&event("2025-06-10T18:30:00.000Z"), dir.path())?;
    let path = link.path().unwrap().to_path_buf();

    assert!(link.href().starts_with("file://"));
    assert!(link.href().ends_with(".ics"));
    assert!(std::fs::read_to_string(&path)?.contains("UID:e42@eventdesk.app"));

    drop(link);
    assert!(!path.exists());

    Ok(())
}

#[test]
fn test_ical_file_in_relative_dir() -> anyhow::Result<()> {
    let link = ical_link_in(&event("2025-06-10T18:30:00.000Z"), Path::new("."))?;
    let path = link.path().unwrap().to_path_buf();

    assert!(path.is_absolute());
    assert!(path.exists());
    assert!(link.href().starts_with("file:///"));

    drop(link);
    assert!(!path.exists());

    Ok(())
}

#[test]
fn test_far_future_date_yields_sentinel() {
    let event = event("9999-12-31T23:00:00.000Z");

    assert_eq!(google_calendar_link(&event), SENTINEL);
    assert!(ics_document(&event).is_none());
}

#[test]
fn test_invalid_date_yields_sentinel_and_logs() -> anyhow::Result<()> {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let dir = TempDir::new()?;
    let invalid = event("not-a-date");

    let (google, ical) = tracing::subscriber::with_default(subscriber, || {
        (
            google_calendar_link(&invalid),
            ical_link_in(&invalid, dir.path()),
        )
    });
    let ical = ical?;

    assert_eq!(google, SENTINEL);
    assert_eq!(ical.href(), SENTINEL);
    assert!(ical.path().is_none());
    assert!(ics_document(&invalid).is_none());
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);

    let logs = captured.text();
    assert_eq!(logs.matches("invalid event date").count(), 2);
    assert!(logs.contains("ERROR"));
    assert!(logs.contains("not-a-date"));

    Ok(())
}
