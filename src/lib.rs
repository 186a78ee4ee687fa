pub mod app;
pub mod config;
pub mod error;
pub mod guard;
pub mod observability;
pub mod terminal;

pub use app::{App, Roster};
pub use config::Config;
pub use error::AppError;
