use async_trait::async_trait;
use serde_json::Value;

use super::TransportError;

// ============================================================================
// Endpoints
// ============================================================================

pub const LOGIN_PATH: &str = "/api/login";
pub const REGISTER_PATH: &str = "/api/regis";
pub const LOGOUT_PATH: &str = "/api/logout";
pub const USER_PATH: &str = "/api/user";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    Json(Value),
}

/// A request to the identity API, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: &'static str,
    pub body: Body,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn get(path: &'static str) -> Self {
        Self {
            method: Method::Get,
            path,
            body: Body::Empty,
            bearer: None,
        }
    }

    pub fn post_form(path: &'static str, fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            path,
            body: Body::Form(fields),
            bearer: None,
        }
    }

    pub fn post_json(path: &'static str, body: Value) -> Self {
        Self {
            method: Method::Post,
            path,
            body: Body::Json(body),
            bearer: None,
        }
    }

    /// Attach `Authorization: Bearer <token>`
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Status and JSON body of whatever the server answered.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `Value::Null` when the body was empty or not JSON
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Human-readable error from the body: `message` first, then `error`.
    pub fn error_message(&self) -> Option<&str> {
        ["message", "error"]
            .into_iter()
            .filter_map(|field| self.body.get(field).and_then(Value::as_str))
            .find(|msg| !msg.trim().is_empty())
    }
}

/// Sends requests to the identity API.
///
/// Resolves with the server's answer whatever its status; errors only when
/// no answer arrived at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_message_prefers_message_field() {
        let resp = ApiResponse::new(401, json!({"message": "bad password", "error": "other"}));
        assert_eq!(resp.error_message(), Some("bad password"));
    }

    #[test]
    fn test_error_message_falls_back_to_error_field() {
        let resp = ApiResponse::new(400, json!({"error": "email sudah terdaftar"}));
        assert_eq!(resp.error_message(), Some("email sudah terdaftar"));

        let resp = ApiResponse::new(400, json!({"message": "", "error": "x"}));
        assert_eq!(resp.error_message(), Some("x"));
    }

    #[test]
    fn test_error_message_absent() {
        assert_eq!(ApiResponse::new(500, Value::Null).error_message(), None);
        assert_eq!(ApiResponse::new(500, json!({"message": 42})).error_message(), None);
    }

    #[test]
    fn test_is_success() {
        assert!(ApiResponse::new(200, Value::Null).is_success());
        assert!(ApiResponse::new(201, Value::Null).is_success());
        assert!(!ApiResponse::new(302, Value::Null).is_success());
        assert!(!ApiResponse::new(401, Value::Null).is_success());
    }
}
