use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use validator::{Validate, ValidationError};

use crate::{format_iso, parse_instant};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub event_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_link: Option<String>,
    pub max_capacity: u32,
    pub available_spots: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub creator_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Creator>,
    #[serde(rename = "_count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<EventCount>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventCount {
    pub reservations: u32,
}

/// Where an event takes place. A physical location wins over an online
/// link when a payload carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue<'a> {
    Physical(&'a str),
    Online(&'a str),
    Unspecified,
}

#[derive(AsRefStr, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum OccupancyBand {
    Low,
    High,
    Critical,
}

impl OccupancyBand {
    pub fn from_rate(rate: u32) -> Self {
        match rate {
            90.. => Self::Critical,
            70.. => Self::High,
            _ => Self::Low,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl Event {
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.event_date)
    }

    pub fn venue(&self) -> Venue<'_> {
        match (non_empty(&self.location), non_empty(&self.online_link)) {
            (Some(location), _) => Venue::Physical(location),
            (None, Some(link)) => Venue::Online(link),
            (None, None) => Venue::Unspecified,
        }
    }

    /// Location text used by calendars: the physical place, else the link.
    pub fn venue_text(&self) -> &str {
        match self.venue() {
            Venue::Physical(value) | Venue::Online(value) => value,
            Venue::Unspecified => "",
        }
    }

    pub fn available(&self) -> u32 {
        self.available_spots.min(self.max_capacity)
    }

    pub fn reserved_spots(&self) -> u32 {
        self.max_capacity - self.available()
    }

    pub fn is_full(&self) -> bool {
        self.available() == 0
    }

    /// Rounded percentage of the capacity already taken.
    pub fn occupancy_rate(&self) -> u32 {
        if self.max_capacity == 0 {
            return 0;
        }

        (f64::from(self.reserved_spots()) / f64::from(self.max_capacity) * 100.0).round() as u32
    }

    pub fn occupancy_band(&self) -> OccupancyBand {
        OccupancyBand::from_rate(self.occupancy_rate())
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.starts_at().is_some_and(|starts_at| starts_at > now)
    }
}

#[derive(EnumString, Display, AsRefStr, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "camelCase")]
pub enum FilterField {
    Search,
    StartDate,
    EndDate,
    Location,
}

/// Query state of the public event listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventFilters {
    pub search: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub page: u32,
    pub limit: u32,
}

impl Default for EventFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            location: String::new(),
            page: 1,
            limit: 10,
        }
    }
}

impl EventFilters {
    /// Changing any filter sends the listing back to the first page.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FilterField::Search => self.search = value,
            FilterField::StartDate => self.start_date = value,
            FilterField::EndDate => self.end_date = value,
            FilterField::Location => self.location = value,
        }
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
        self.page = 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Non-empty parameters in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let text = [
            ("search", &self.search),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
            ("location", &self.location),
        ];

        let mut pairs = text
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(key, value)| (key, value.trim().to_owned()))
            .collect::<Vec<_>>();

        for (key, value) in [("page", self.page), ("limit", self.limit)] {
            if value > 0 {
                pairs.push((key, value.to_string()));
            }
        }

        pairs
    }

    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("Event name is required")));
    }

    Ok(())
}

fn venue_required(draft: &EventDraft) -> Result<(), ValidationError> {
    if draft.is_online && draft.online_link.trim().is_empty() {
        return Err(ValidationError::new("online_link")
            .with_message(Cow::Borrowed("A meeting link is required for online events")));
    }

    if !draft.is_online && draft.location.trim().is_empty() {
        return Err(ValidationError::new("location")
            .with_message(Cow::Borrowed("A location is required for in-person events")));
    }

    Ok(())
}

/// Form state used to create or edit an event.
#[derive(Validate, Clone, Debug, Default, PartialEq, Eq)]
#[validate(schema(function = "venue_required", skip_on_field_errors = false))]
pub struct EventDraft {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub description: String,
    pub event_date: String,
    #[validate(range(min = 1, message = "Maximum capacity must be greater than 0"))]
    pub max_capacity: u32,
    pub location: String,
    pub online_link: String,
    pub is_online: bool,
}

/// Body of `POST /events` and `PUT /events/:id`. Only the primary venue
/// field is sent.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub event_date: String,
    pub max_capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_link: Option<String>,
}

impl EventDraft {
    pub fn from_event(event: &Event) -> Self {
        Self {
            name: event.name.to_owned(),
            description: event.description.clone().unwrap_or_default(),
            event_date: event
                .starts_at()
                .map(|starts_at| starts_at.format("%Y-%m-%dT%H:%M").to_string())
                .unwrap_or_default(),
            max_capacity: event.max_capacity,
            location: event.location.clone().unwrap_or_default(),
            online_link: event.online_link.clone().unwrap_or_default(),
            is_online: matches!(event.venue(), Venue::Online(_)),
        }
    }

    /// Validates the draft against `now` and builds the request body.
    /// Edits require a description, creation does not.
    pub fn to_payload(
        &self,
        now: DateTime<Utc>,
        require_description: bool,
    ) -> crate::Result<EventPayload> {
        self.validate()?;

        if require_description && self.description.trim().is_empty() {
            crate::user!("Event description is required");
        }

        if self.event_date.trim().is_empty() {
            crate::user!("Event date is required");
        }

        let Some(starts_at) = parse_instant(&self.event_date) else {
            crate::user!("Event date '{}' is not a valid date", self.event_date);
        };

        if starts_at <= now {
            crate::user!("Event date must be in the future");
        }

        let description = Some(self.description.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_owned);

        let (location, online_link) = if self.is_online {
            (None, Some(self.online_link.trim().to_owned()))
        } else {
            (Some(self.location.trim().to_owned()), None)
        };

        Ok(EventPayload {
            name: self.name.trim().to_owned(),
            description,
            event_date: format_iso(&starts_at),
            max_capacity: self.max_capacity,
            location,
            online_link,
        })
    }
}
