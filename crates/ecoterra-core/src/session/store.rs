//! The session store: sole writer of `SessionState`.
//!
//! Presentation code reads snapshots with `state()` or watches changes through
//! `subscribe()`, and drives the session with `login`, `register` and
//! `logout`. Each action resolves to a plain success flag; the details land
//! in the state's `message` or `error`.

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::auth::AuthGateway;
use crate::models::{LoginRequest, RegisterRequest};

use super::{Phase, SessionState};

/// Message shown after a successful logout
pub const LOGOUT_MESSAGE: &str = "Logout berhasil";

/// Error shown when the server no longer accepts the stored token
pub const SESSION_EXPIRED_MESSAGE: &str = "Sesi berakhir, silakan login kembali";

pub struct SessionStore {
    gateway: AuthGateway,
    state: watch::Sender<SessionState>,
    /// Held while an operation is in flight; a second one is turned away.
    in_flight: Mutex<()>,
}

impl SessionStore {
    /// Store in the `Idle` phase. Call `restore` to load a persisted session.
    pub fn new(gateway: AuthGateway) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            gateway,
            state,
            in_flight: Mutex::new(()),
        }
    }

    /// Create the store and restore any persisted session.
    pub async fn open(gateway: AuthGateway) -> Self {
        let store = Self::new(gateway);
        store.restore().await;
        store
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change. Dropping it is fine; the
    /// store never notices.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Rebuild the session from storage. A failed restoration settles as
    /// unauthenticated with the failure in `error`.
    ///
    /// Only runs from `Idle`; afterwards it returns `false` and changes
    /// nothing.
    pub async fn restore(&self) -> bool {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Restore requested while an operation is in flight");
            return false;
        };
        if self.state.borrow().phase != Phase::Idle {
            warn!("Restore requested after the session was already restored");
            return false;
        }
        self.enter_loading(false);

        let next = match self.gateway.restore_session().await {
            Ok(Some(user)) => {
                info!(user_id = user.id, "Session restored");
                SessionState::authenticated(user, None)
            }
            Ok(None) => SessionState::unauthenticated(),
            Err(e) => SessionState::unauthenticated().with_error(e.message()),
        };
        let restored = next.is_authenticated();
        self.set(next);
        restored
    }

    pub async fn login(&self, request: &LoginRequest) -> bool {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Login requested while an operation is in flight");
            return false;
        };
        let previous = self.enter_loading(true);

        match self.gateway.login(request).await {
            Ok(success) => {
                self.set(SessionState::authenticated(success.user, success.message));
                true
            }
            Err(e) => {
                debug!(error = %e, "Login failed");
                self.set(previous.settled().with_error(e.message()));
                false
            }
        }
    }

    /// Create an account. Never authenticates; the user logs in afterwards.
    ///
    /// Turned away while a user is signed in, leaving the state untouched.
    pub async fn register(&self, request: &RegisterRequest) -> bool {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Registration requested while an operation is in flight");
            return false;
        };
        if self.state.borrow().is_authenticated() {
            warn!("Registration requested while signed in");
            return false;
        }
        self.enter_loading(true);

        match self.gateway.register(request).await {
            Ok(success) => {
                self.set(SessionState::unauthenticated().with_message(success.message));
                true
            }
            Err(e) => {
                debug!(error = %e, "Registration failed");
                self.set(SessionState::unauthenticated().with_error(e.message()));
                false
            }
        }
    }

    /// Log out. The user is cleared whether or not the server was reached.
    pub async fn logout(&self) -> bool {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Logout requested while an operation is in flight");
            return false;
        };
        self.enter_loading(false);

        match self.gateway.logout().await {
            Ok(()) => {
                self.set(
                    SessionState::unauthenticated().with_message(Some(LOGOUT_MESSAGE.to_string())),
                );
                true
            }
            Err(e) => {
                self.set(SessionState::unauthenticated().with_error(e.message()));
                false
            }
        }
    }

    /// Confirm the stored token with the server, without passing through
    /// `Loading`. Returns whether the session is valid.
    pub async fn verify(&self) -> bool {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Verify requested while an operation is in flight");
            return false;
        };
        let current = self.state();

        match self.gateway.check_status().await {
            Ok(Some(user)) => {
                let message = current.message.filter(|_| current.user.is_some());
                self.set(SessionState::authenticated(user, message));
                true
            }
            Ok(None) => {
                if current.is_authenticated() {
                    info!("Stored session no longer accepted");
                    self.set(SessionState::unauthenticated().with_error(SESSION_EXPIRED_MESSAGE));
                }
                false
            }
            Err(e) => {
                self.set(current.settled().with_error(e.message()));
                false
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    pub fn clear_message(&self) {
        self.state.send_if_modified(|state| state.message.take().is_some());
    }

    /// Enter `Loading`, returning the state it replaced. The user is only
    /// visible while `Authenticated`, so it is held back until the
    /// operation settles.
    fn enter_loading(&self, clear_error: bool) -> SessionState {
        let previous = self.state();
        self.state.send_modify(|state| {
            state.phase = Phase::Loading;
            state.user = None;
            if clear_error {
                state.error = None;
            }
        });
        previous
    }

    fn set(&self, next: SessionState) {
        debug!(
            phase = next.phase.as_str(),
            has_user = next.user.is_some(),
            has_error = next.error.is_some(),
            "Session state changed"
        );
        self.state.send_replace(next);
    }
}
