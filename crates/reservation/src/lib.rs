//! Roster tooling for an event's reservations: search, ordering, bulk
//! selection and CSV export over the visible view.

mod export;
mod name;
mod selection;
mod stats;
mod view;

pub use export::*;
pub use name::*;
pub use selection::*;
pub use stats::*;
pub use view::*;
