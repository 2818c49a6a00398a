//! Data models for the identity API.
//!
//! - `UserProfile`, `Category`: the signed-in user and sign-up categories
//! - `LoginRequest`, `RegisterRequest`: form submissions with field validation

pub mod request;
pub mod user;

pub use request::{looks_like_email, Field, FieldError, LoginRequest, RegisterRequest};
pub use user::{Category, UnknownCategory, UserProfile};
pub(crate) use user::AuthEnvelope;
