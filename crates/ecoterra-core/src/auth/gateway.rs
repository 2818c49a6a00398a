//! Network-backed identity operations and the local persistence of their
//! outcome.
//!
//! The gateway holds no state of its own between calls. The token and the
//! profile snapshot live in the injected `KeyValueStore` under `TOKEN_KEY`
//! and `PROFILE_KEY`.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::api::transport::{LOGIN_PATH, LOGOUT_PATH, REGISTER_PATH, USER_PATH};
use crate::api::{ApiRequest, ApiResponse, Transport};
use crate::models::{AuthEnvelope, LoginRequest, RegisterRequest, UserProfile};
use crate::storage::KeyValueStore;

use super::{AuthError, Operation};

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "ecoterraToken";

/// Storage key of the last known profile (JSON)
pub const PROFILE_KEY: &str = "userData";

/// Profile returned by a successful login or registration, with the server's
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSuccess {
    pub user: UserProfile,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct AuthGateway {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn KeyValueStore>,
}

impl AuthGateway {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self { transport, storage }
    }

    /// Log in and persist the issued token and profile.
    ///
    /// Persistence failures are logged and do not fail the login; the next
    /// cold start may then find no session.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSuccess, AuthError> {
        debug!(
            email = %request.email,
            remember_me = ?request.remember_me,
            "Sending login request"
        );
        let api_request = ApiRequest::post_form(LOGIN_PATH, request.form_fields());
        let response = self.send(api_request, Operation::Login).await?;

        let envelope = parse_envelope(response, Operation::Login)?;
        let user = envelope.user.ok_or(AuthError::Malformed(Operation::Login))?;
        let token = user
            .token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Malformed(Operation::Login))?;

        self.persist_session(&token, &user.profile).await;
        info!(user_id = user.profile.id, "Logged in");

        Ok(AuthSuccess {
            user: user.profile,
            message: envelope.message,
        })
    }

    /// Create an account. Nothing is persisted; the user logs in afterwards.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSuccess, AuthError> {
        debug!(
            email = %request.email,
            username = %request.username,
            category = %request.category,
            "Sending registration request"
        );
        let body = serde_json::to_value(request.payload())
            .map_err(|_| AuthError::Malformed(Operation::Register))?;
        let api_request = ApiRequest::post_json(REGISTER_PATH, body);
        let response = self.send(api_request, Operation::Register).await?;

        let envelope = parse_envelope(response, Operation::Register)?;
        let user = envelope
            .user
            .ok_or(AuthError::Malformed(Operation::Register))?;
        info!(user_id = user.profile.id, "Registered");

        Ok(AuthSuccess {
            user: user.profile,
            message: envelope.message,
        })
    }

    /// Notify the server, then always clear the local session.
    ///
    /// An error means the remote notification failed; local state is clean
    /// either way.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let remote = match self.stored_token().await {
            Some(token) => {
                let api_request =
                    ApiRequest::post_json(LOGOUT_PATH, json!({ "token": token })).bearer(token);
                match self.transport.send(api_request).await {
                    Ok(response) if response.is_success() => Ok(()),
                    Ok(response) => {
                        warn!(status = response.status, "Logout rejected by server");
                        Err(AuthError::Rejected(
                            Operation::Logout.failure_message().to_string(),
                        ))
                    }
                    Err(e) => {
                        warn!(error = %e, "Logout request failed");
                        Err(AuthError::Unreachable(Operation::Logout))
                    }
                }
            }
            None => {
                debug!("No stored token, skipping remote logout");
                Ok(())
            }
        };

        self.clear_session().await;
        info!(remote_ok = remote.is_ok(), "Logged out");
        remote
    }

    /// Rebuild the session from storage without contacting the server.
    ///
    /// `Ok(None)` when no token is stored. A token without a readable profile
    /// is an error.
    pub async fn restore_session(&self) -> Result<Option<UserProfile>, AuthError> {
        let token = self.storage.get(TOKEN_KEY).await.map_err(|e| {
            warn!(error = %e, "Failed to read stored token");
            AuthError::Persistence(Operation::Restore)
        })?;
        if token.filter(|t| !t.is_empty()).is_none() {
            debug!("No stored token");
            return Ok(None);
        }

        let raw = self.storage.get(PROFILE_KEY).await.map_err(|e| {
            warn!(error = %e, "Failed to read stored profile");
            AuthError::Persistence(Operation::Restore)
        })?;
        let Some(raw) = raw else {
            warn!("Token stored without a profile");
            return Err(AuthError::Malformed(Operation::Restore));
        };
        let profile: UserProfile = serde_json::from_str(&raw).map_err(|e| {
            warn!(error = %e, "Stored profile is corrupt");
            AuthError::Malformed(Operation::Restore)
        })?;

        debug!(user_id = profile.id, "Session restored from storage");
        Ok(Some(profile))
    }

    /// Ask the server whether the stored token is still good.
    ///
    /// `Ok(None)` when there is no token, or when the check failed in any
    /// way; in the latter case the local session is cleared. A confirmed
    /// profile replaces the stored snapshot.
    pub async fn check_status(&self) -> Result<Option<UserProfile>, AuthError> {
        let token = self.storage.get(TOKEN_KEY).await.map_err(|e| {
            warn!(error = %e, "Failed to read stored token");
            AuthError::Persistence(Operation::Status)
        })?;
        if token.filter(|t| !t.is_empty()).is_none() {
            return Ok(None);
        }

        let api_request = self.authorized(ApiRequest::get(USER_PATH)).await;
        let response = match self.transport.send(api_request).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                warn!(status = response.status, "Stored token rejected, clearing session");
                self.clear_session().await;
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "Status check failed, clearing session");
                self.clear_session().await;
                return Ok(None);
            }
        };

        let envelope = parse_envelope(response, Operation::Status)?;
        let user = envelope.user.ok_or(AuthError::Malformed(Operation::Status))?;
        self.store_profile(&user.profile).await;
        Ok(Some(user.profile))
    }

    /// Attach the stored token, if any, as a bearer credential.
    async fn authorized(&self, request: ApiRequest) -> ApiRequest {
        match self.stored_token().await {
            Some(token) => request.bearer(token),
            None => request,
        }
    }

    /// Send a request whose non-2xx answer fails the operation.
    async fn send(&self, request: ApiRequest, op: Operation) -> Result<ApiResponse, AuthError> {
        let response = self.transport.send(request).await.map_err(|e| {
            warn!(operation = ?op, error = %e, "Request failed");
            AuthError::Unreachable(op)
        })?;
        if response.is_success() {
            return Ok(response);
        }
        let message = response
            .error_message()
            .unwrap_or_else(|| op.failure_message())
            .to_string();
        debug!(operation = ?op, status = response.status, "Request rejected");
        Err(AuthError::Rejected(message))
    }

    async fn stored_token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    /// Token first, then profile. A token that failed to store is not
    /// followed by a profile.
    async fn persist_session(&self, token: &str, profile: &UserProfile) {
        if let Err(e) = self.storage.set(TOKEN_KEY, token).await {
            error!(error = %e, "Failed to persist token");
            return;
        }
        self.store_profile(profile).await;
    }

    async fn store_profile(&self, profile: &UserProfile) {
        let snapshot = match serde_json::to_string(profile) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Failed to serialize profile");
                return;
            }
        };
        if let Err(e) = self.storage.set(PROFILE_KEY, &snapshot).await {
            error!(error = %e, "Failed to persist profile");
        }
    }

    async fn clear_session(&self) {
        for key in [TOKEN_KEY, PROFILE_KEY] {
            if let Err(e) = self.storage.remove(key).await {
                error!(key, error = %e, "Failed to remove stored entry");
            }
        }
    }
}

fn parse_envelope(response: ApiResponse, op: Operation) -> Result<AuthEnvelope, AuthError> {
    serde_json::from_value(response.body).map_err(|e| {
        warn!(operation = ?op, error = %e, "Unexpected response shape");
        AuthError::Malformed(op)
    })
}
