use serde::{Deserialize, Serialize};

use crate::models::UserProfile;

/// Discrete state of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing checked yet
    #[default]
    Idle,
    /// Restoration or an operation is in flight
    Loading,
    Authenticated,
    Unauthenticated,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Authenticated => "authenticated",
            Phase::Unauthenticated => "unauthenticated",
        }
    }
}

/// Snapshot handed to observers. `user` is set exactly when `phase` is
/// `Authenticated`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SessionState {
    pub phase: Phase,
    pub user: Option<UserProfile>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl SessionState {
    pub fn authenticated(user: UserProfile, message: Option<String>) -> Self {
        Self {
            phase: Phase::Authenticated,
            user: Some(user),
            message,
            error: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            phase: Phase::Unauthenticated,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == Phase::Authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Phase and user to fall back to when an operation leaves the session
    /// as it was: an authenticated session stays, anything else settles
    /// as unauthenticated.
    pub(crate) fn settled(&self) -> Self {
        match (&self.phase, &self.user) {
            (Phase::Authenticated, Some(user)) => Self::authenticated(user.clone(), None),
            _ => Self::unauthenticated(),
        }
    }

    pub(crate) fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self.error = None;
        self
    }

    pub(crate) fn with_error(mut self, error: impl Into<String>) -> Self {
        self.message = None;
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            full_name: "A".to_string(),
            email: "user@test.com".to_string(),
            username: "a".to_string(),
            category: "guru".to_string(),
        }
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = SessionState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.user.is_none());
    }

    #[test]
    fn test_settled_keeps_authenticated_session() {
        let state = SessionState::authenticated(profile(), Some("ok".to_string()));
        let settled = state.settled();
        assert_eq!(settled.phase, Phase::Authenticated);
        assert_eq!(settled.user, Some(profile()));
        assert!(settled.message.is_none());
    }

    #[test]
    fn test_settled_from_other_phases() {
        for phase in [Phase::Idle, Phase::Loading, Phase::Unauthenticated] {
            let state = SessionState {
                phase,
                ..SessionState::default()
            };
            assert_eq!(state.settled(), SessionState::unauthenticated());
        }
    }

    #[test]
    fn test_message_and_error_exclusive() {
        let state = SessionState::unauthenticated()
            .with_message(Some("hi".to_string()))
            .with_error("boom");
        assert!(state.message.is_none());
        assert_eq!(state.error.as_deref(), Some("boom"));

        let state = state.with_message(Some("again".to_string()));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Phase::Unauthenticated).unwrap(),
            r#""unauthenticated""#
        );
        assert_eq!(Phase::Loading.as_str(), "loading");
    }
}
