//! Session state and its single writer.
//!
//! - `SessionState`, `Phase`: the snapshot observers read
//! - `SessionStore`: mediates every transition

pub mod state;
pub mod store;

pub use state::{Phase, SessionState};
pub use store::{SessionStore, LOGOUT_MESSAGE, SESSION_EXPIRED_MESSAGE};
