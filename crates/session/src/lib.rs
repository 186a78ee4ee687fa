//! Client-side session: credentials, their durable copy, the session cookie
//! and the realtime channel opened for an authenticated user.

mod cookie;
mod error;
mod realtime;
mod storage;
mod store;
mod token;

pub use cookie::*;
pub use error::SessionError;
pub use realtime::*;
pub use storage::*;
pub use store::*;
pub use token::token_expiry;
