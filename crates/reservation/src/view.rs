use chrono::{DateTime, Utc};
use eventdesk_shared::Reservation;
use strum::{AsRefStr, Display, EnumString};

use crate::reservation_name;

#[derive(EnumString, Display, AsRefStr, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum SortKey {
    Name,
    Email,
    #[default]
    Date,
}

#[derive(EnumString, Display, AsRefStr, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Search and ordering applied to a roster. Defaults to newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RosterQuery {
    pub search: String,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

impl RosterQuery {
    /// Filters then sorts. The result only holds items from `reservations`.
    pub fn apply<'a>(&self, reservations: &'a [Reservation]) -> Vec<&'a Reservation> {
        let mut view = filter(reservations, &self.search);
        sort(&mut view, self.sort_key, self.sort_order);
        view
    }
}

fn email_of(reservation: &Reservation) -> String {
    reservation.email().unwrap_or_default().to_lowercase()
}

fn name_of(reservation: &Reservation) -> String {
    reservation_name(reservation)
        .unwrap_or_default()
        .to_lowercase()
}

/// Reservations whose display name or email contains `search`, ignoring
/// case. A blank search keeps everything.
pub fn filter<'a>(reservations: &'a [Reservation], search: &str) -> Vec<&'a Reservation> {
    let needle = search.trim().to_lowercase();

    reservations
        .iter()
        .filter(|reservation| {
            needle.is_empty()
                || name_of(reservation).contains(&needle)
                || email_of(reservation).contains(&needle)
        })
        .collect()
}

/// When the reservation was made; undated or unreadable dates count as the
/// Unix epoch.
pub fn sort_instant(reservation: &Reservation) -> DateTime<Utc> {
    reservation
        .reserved_instant()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Stable in both directions: equal keys keep their relative order.
pub fn sort(view: &mut [&Reservation], key: SortKey, order: SortOrder) {
    view.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => name_of(a).cmp(&name_of(b)),
            SortKey::Email => email_of(a).cmp(&email_of(b)),
            SortKey::Date => sort_instant(a).cmp(&sort_instant(b)),
        };

        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}
