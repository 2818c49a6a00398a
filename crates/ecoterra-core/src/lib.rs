//! Ecoterra session core.
//!
//! Client-side authentication session management for the Ecoterra mobile
//! app: an `AuthGateway` talking to the identity API and persisting the
//! credential, and a `SessionStore` exposing one consistent, observable
//! `SessionState` to the presentation layer.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;

pub use api::{HttpTransport, Transport};
pub use auth::{AuthError, AuthGateway};
pub use config::Config;
pub use models::{Category, LoginRequest, RegisterRequest, UserProfile};
pub use session::{Phase, SessionState, SessionStore};
pub use storage::KeyValueStore;
