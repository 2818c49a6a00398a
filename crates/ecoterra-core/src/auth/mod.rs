//! Authentication against the remote identity API.
//!
//! This module provides:
//! - `AuthGateway`: login, register, logout, status check and session restore
//! - `AuthError`: the failure taxonomy, each variant carrying its user-facing message
//!
//! The token and the last known profile are persisted through a
//! `KeyValueStore` under `TOKEN_KEY` and `PROFILE_KEY`.

pub mod error;
pub mod gateway;

pub use error::{AuthError, Operation};
pub use gateway::{AuthGateway, AuthSuccess, PROFILE_KEY, TOKEN_KEY};
