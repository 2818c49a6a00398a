//! Transport to the remote identity API.
//!
//! This module provides the `Transport` seam the auth gateway talks through,
//! plus `HttpTransport`, its `reqwest` implementation. Requests needing
//! authentication carry the stored token as a bearer credential.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{HttpTransport, TransportOptions};
pub use error::TransportError;
pub use transport::{ApiRequest, ApiResponse, Body, Method, Transport};
