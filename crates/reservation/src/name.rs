use eventdesk_shared::{Reservation, ReservationUser};

pub const NAME_UNAVAILABLE: &str = "Name unavailable";

fn filled(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Resolves the name shown for a reservation holder, in order: explicit
/// `name`, first and last name, local part of the email.
pub fn display_name(user: &ReservationUser) -> Option<String> {
    if let Some(name) = filled(&user.name) {
        return Some(name.to_owned());
    }

    let full = [filled(&user.first_name), filled(&user.last_name)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    if !full.is_empty() {
        return Some(full);
    }

    filled(&user.email)
        .and_then(|email| email.split('@').next())
        .filter(|local| !local.is_empty())
        .map(str::to_owned)
}

pub fn reservation_name(reservation: &Reservation) -> Option<String> {
    reservation.user.as_ref().and_then(display_name)
}

/// Like [`reservation_name`] but never empty.
pub fn reservation_name_or_marker(reservation: &Reservation) -> String {
    reservation_name(reservation).unwrap_or_else(|| NAME_UNAVAILABLE.to_owned())
}
