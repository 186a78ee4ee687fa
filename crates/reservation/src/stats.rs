use eventdesk_shared::{Event, OccupancyBand, Reservation};

/// Header figures of an event roster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterStats {
    pub total_reservations: usize,
    pub available_spots: u32,
    pub max_capacity: u32,
    pub occupancy_rate: u32,
    pub band: OccupancyBand,
}

impl RosterStats {
    pub fn new(event: &Event, reservations: &[Reservation]) -> Self {
        Self {
            total_reservations: reservations.len(),
            available_spots: event.available(),
            max_capacity: event.max_capacity,
            occupancy_rate: event.occupancy_rate(),
            band: event.occupancy_band(),
        }
    }
}
