use eventdesk_api::EventList;
use eventdesk_reservation::{
    EMAIL_UNAVAILABLE, RosterStats, export_date, reservation_name_or_marker,
};
use eventdesk_shared::{
    DashboardStats, Event, Level, Navigator, Notice, Notifier, OccupancyReport, Reservation, User,
    Venue, format_display,
};

/// Prints notices on stderr, keeping stdout for data.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        let marker = match notice.level {
            Level::Success => "ok",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        eprintln!("[{marker}] {}", notice.message);
    }
}

/// There is no page to move to in a terminal; the destination is shown so
/// the user knows which command to run next.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, to: &str) {
        tracing::debug!(to, "redirect");
        eprintln!("-> {to}");
    }
}

fn when(raw: &str) -> String {
    eventdesk_shared::parse_instant(raw)
        .map(|instant| format_display(&instant))
        .unwrap_or_else(|| raw.to_owned())
}

fn venue(event: &Event) -> String {
    match event.venue() {
        Venue::Physical(location) => location.to_owned(),
        Venue::Online(link) => format!("online: {link}"),
        Venue::Unspecified => "-".to_owned(),
    }
}

pub fn print_user(user: &User) {
    println!("{} <{}>", user.full_name(), user.email);
    println!("  id:    {}", user.id);
    println!("  role:  {}", user.role);
}

pub fn print_events(list: &EventList) {
    if list.events.is_empty() {
        println!("No events found.");
        return;
    }

    for event in &list.events {
        println!(
            "{:<26} {:<32} {:<16} {:>4}/{:<4} {}",
            event.id,
            event.name,
            when(&event.event_date),
            event.available(),
            event.max_capacity,
            venue(event),
        );
    }

    if let Some(pagination) = &list.pagination {
        println!(
            "page {} of {} ({} events)",
            pagination.page.unwrap_or(1),
            pagination.total_pages.unwrap_or(1),
            pagination.total.unwrap_or(list.events.len() as u64),
        );
    }
}

pub fn print_event(event: &Event) {
    println!("{}", event.name);
    println!("  id:        {}", event.id);
    println!("  when:      {}", when(&event.event_date));
    println!("  where:     {}", venue(event));
    println!(
        "  spots:     {} of {} available ({}% taken)",
        event.available(),
        event.max_capacity,
        event.occupancy_rate()
    );
    if let Some(price) = event.price {
        println!("  price:     {price:.2}");
    }
    if let Some(creator) = &event.creator {
        println!("  organizer: {} {}", creator.first_name, creator.last_name);
    }
    if let Some(description) = &event.description {
        println!();
        println!("{description}");
    }
}

pub fn print_my_reservations(reservations: &[Reservation]) {
    if reservations.is_empty() {
        println!("You have no reservations.");
        return;
    }

    for reservation in reservations {
        let (name, date) = reservation
            .event
            .as_ref()
            .map(|event| (event.name.as_str(), when(&event.event_date)))
            .unwrap_or(("-", "-".to_owned()));

        println!(
            "{:<26} {:<10} {:<32} {}",
            reservation.id, reservation.status, name, date
        );
    }
}

pub fn print_roster(event: &Event, view: &[&Reservation], stats: &RosterStats) {
    println!("{} ({})", event.name, when(&event.event_date));
    println!(
        "  reservations: {}  available: {}/{}  occupancy: {}% ({})",
        stats.total_reservations,
        stats.available_spots,
        stats.max_capacity,
        stats.occupancy_rate,
        stats.band
    );
    println!();

    for reservation in view {
        println!(
            "{:<26} {:<28} {:<32} {}",
            reservation.id,
            reservation_name_or_marker(reservation),
            reservation.email().unwrap_or(EMAIL_UNAVAILABLE),
            export_date(reservation),
        );
    }
}

pub fn print_report(report: &OccupancyReport) {
    for row in &report.rows {
        println!(
            "{:<32} {:>5}/{:<5} {:>6.1}% {:<8} {}",
            row.name,
            row.reserved_spots,
            row.max_capacity,
            row.occupancy_rate,
            row.band(),
            when(&row.event_date),
        );
    }

    let summary = &report.summary;
    println!();
    println!(
        "{} events, {} of {} spots reserved, average occupancy {:.1}%",
        summary.total_events,
        summary.total_reserved,
        summary.total_capacity,
        summary.average_occupancy
    );
}

pub fn print_dashboard(events: &[Event], stats: &DashboardStats) {
    println!(
        "{} events, {} upcoming, {} reservations",
        stats.total_events, stats.upcoming_events, stats.total_reservations
    );
    println!();

    for event in events {
        println!(
            "{:<26} {:<32} {:<16} {:>3}% {}",
            event.id,
            event.name,
            when(&event.event_date),
            event.occupancy_rate(),
            event.occupancy_band(),
        );
    }
}
