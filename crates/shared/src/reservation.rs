use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Event, parse_instant};

#[derive(
    EnumString,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ReservationStatus {
    #[default]
    Confirmed,
    Canceled,
}

/// The attendee attached to a reservation. Event rosters return a reduced
/// user that may carry a precomputed `name`, so every field is optional.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ReservationUser>,
}

impl Reservation {
    /// Raw timestamp of the reservation: `reservationDate`, then
    /// `reservedAt`, then `createdAt`.
    pub fn reserved_at(&self) -> Option<&str> {
        [&self.reservation_date, &self.reserved_at, &self.created_at]
            .into_iter()
            .filter_map(|value| value.as_deref())
            .find(|value| !value.trim().is_empty())
    }

    pub fn reserved_instant(&self) -> Option<DateTime<Utc>> {
        self.reserved_at().and_then(parse_instant)
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }

    pub fn email(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|user| user.email.as_deref())
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}
