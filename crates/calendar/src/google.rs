use eventdesk_shared::Event;

use crate::{SENTINEL, event_window, format_utc_basic};

const RENDER_URL: &str = "https://calendar.google.com/calendar/render";

pub fn google_calendar_link(event: &Event) -> String {
    let Some((start, end)) = event_window(event) else {
        return SENTINEL.to_owned();
    };

    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("action", "TEMPLATE")
        .append_pair("text", &event.name)
        .append_pair(
            "dates",
            &format!("{}/{}", format_utc_basic(&start), format_utc_basic(&end)),
        )
        .append_pair("details", event.description.as_deref().unwrap_or_default())
        .append_pair("location", event.venue_text())
        .finish();

    format!("{RENDER_URL}?{query}")
}
