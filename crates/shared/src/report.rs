use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Event, OccupancyBand};

/// One row of `GET /admin/reports/occupancy`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyRow {
    pub id: String,
    pub name: String,
    pub max_capacity: u32,
    pub available_spots: u32,
    pub reserved_spots: u32,
    pub occupancy_rate: f64,
    #[serde(default)]
    pub event_date: String,
}

impl OccupancyRow {
    pub fn band(&self) -> OccupancyBand {
        OccupancyBand::from_rate(self.occupancy_rate.round().max(0.0) as u32)
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySummary {
    pub total_events: usize,
    pub total_capacity: u64,
    pub total_reserved: u64,
    pub average_occupancy: f64,
}

impl OccupancySummary {
    pub fn from_rows(rows: &[OccupancyRow]) -> Self {
        let total_capacity = rows.iter().map(|row| u64::from(row.max_capacity)).sum();
        let total_reserved = rows.iter().map(|row| u64::from(row.reserved_spots)).sum();

        let average_occupancy = if rows.is_empty() || total_capacity == 0 {
            0.0
        } else {
            total_reserved as f64 / total_capacity as f64 * 100.0
        };

        Self {
            total_events: rows.len(),
            total_capacity,
            total_reserved,
            average_occupancy,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OccupancyReport {
    pub rows: Vec<OccupancyRow>,
    pub summary: OccupancySummary,
}

impl From<Vec<OccupancyRow>> for OccupancyReport {
    fn from(rows: Vec<OccupancyRow>) -> Self {
        let summary = OccupancySummary::from_rows(&rows);
        Self { rows, summary }
    }
}

/// Figures shown on the administrator dashboard, derived from the event list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_events: usize,
    pub total_reservations: u64,
    pub upcoming_events: usize,
}

impl DashboardStats {
    pub fn from_events(events: &[Event], now: DateTime<Utc>) -> Self {
        Self {
            total_events: events.len(),
            total_reservations: events
                .iter()
                .map(|event| u64::from(event.reserved_spots()))
                .sum(),
            upcoming_events: events.iter().filter(|event| event.is_upcoming(now)).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn row(max_capacity: u32, reserved_spots: u32) -> OccupancyRow {
        OccupancyRow {
            id: "e".to_owned(),
            name: "Event".to_owned(),
            max_capacity,
            available_spots: max_capacity - reserved_spots,
            reserved_spots,
            occupancy_rate: f64::from(reserved_spots) / f64::from(max_capacity) * 100.0,
            event_date: String::new(),
        }
    }

    #[test]
    fn test_summary_uses_total_capacity() {
        let summary = OccupancySummary::from_rows(&[row(100, 50), row(50, 50)]);

        assert_eq!(summary.total_events, 2);
        assert_eq!(summary.total_capacity, 150);
        assert_eq!(summary.total_reserved, 100);
        assert!((summary.average_occupancy - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_summary_of_nothing() {
        assert_eq!(OccupancySummary::from_rows(&[]), OccupancySummary::default());
    }

    #[test]
    fn test_row_band() {
        assert_eq!(row(10, 9).band(), OccupancyBand::Critical);
        assert_eq!(row(10, 1).band(), OccupancyBand::Low);
    }

    #[test]
    fn test_dashboard_stats() {
        let event = |date: &str, available_spots| Event {
            id: date.to_owned(),
            name: "Event".to_owned(),
            description: None,
            event_date: date.to_owned(),
            location: None,
            online_link: None,
            max_capacity: 10,
            available_spots,
            price: None,
            creator_id: String::new(),
            creator: None,
            count: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let stats = DashboardStats::from_events(
            &[
                event("2025-01-01T10:00:00Z", 4),
                event("2025-07-01T10:00:00Z", 10),
                event("garbage", 0),
            ],
            now,
        );

        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.total_reservations, 16);
        assert_eq!(stats.upcoming_events, 1);
    }
}
