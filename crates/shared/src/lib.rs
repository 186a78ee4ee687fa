mod command;
mod date;
pub mod event;
mod notice;
pub mod report;
pub mod reservation;
pub mod user;

pub use command::*;
pub use date::*;
pub use event::{Event, EventDraft, EventFilters, EventPayload, FilterField, OccupancyBand, Venue};
pub use notice::*;
pub use report::{DashboardStats, OccupancyReport, OccupancyRow, OccupancySummary};
pub use reservation::{Reservation, ReservationStatus, ReservationUser};
pub use user::{LoginRequest, ProfileUpdate, RegisterRequest, Role, User};
