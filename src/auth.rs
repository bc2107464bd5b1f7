// src/auth.rs
//! Authentication state and the hosted auth service behind it.
//!
//! [`AuthProvider`] owns the current [`AuthState`] and publishes every change
//! to its subscribers. Consumers such as [`crate::guard::AccessGuard`] are
//! handed a source explicitly instead of reaching for shared global state.
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub access_token: String,
    pub identity: Identity,
}

/// Snapshot of where authentication stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl AuthState {
    pub fn resolving() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            identity: None,
            loading: false,
        }
    }
}

/// Errors surfaced by the auth service. Provider messages are passed through
/// untouched so they can be shown as-is.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The hosted authentication service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Returns `None` when the account still has to be confirmed by email.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    async fn reset_password(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;

    /// Resolves an access token. An expired or unknown token is `Ok(None)`.
    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthError>;
}

/// Anything that can hand out authentication snapshots.
pub trait AuthSource {
    fn snapshot(&self) -> AuthState;

    fn subscribe(&self) -> AuthSubscription;
}

/// Live feed of [`AuthState`] changes.
///
/// The first call to [`AuthSubscription::next`] yields the state current at
/// subscription time. Later calls wait for the next change; if several
/// changes land before the consumer catches up only the newest is seen.
/// Dropping the handle cancels it, [`AuthSubscription::unsubscribe`] does the
/// same explicitly.
#[derive(Debug)]
pub struct AuthSubscription {
    receiver: watch::Receiver<AuthState>,
}

impl AuthSubscription {
    pub fn new(mut receiver: watch::Receiver<AuthState>) -> Self {
        receiver.mark_changed();
        Self { receiver }
    }

    /// Waits for the next snapshot, `None` once the source is gone.
    pub async fn next(&mut self) -> Option<AuthState> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {
        debug!("auth subscription cancelled");
    }
}

pub fn check_registration(password: &str, confirm_password: &str) -> Result<(), AuthError> {
    if password != confirm_password {
        return Err(AuthError::Rejected("Passwords do not match".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Rejected(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Holds the signed-in session and keeps subscribers informed.
pub struct AuthProvider {
    backend: Arc<dyn AuthBackend>,
    state: watch::Sender<AuthState>,
    session: Mutex<Option<Session>>,
}

impl AuthProvider {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (state, _) = watch::channel(AuthState::resolving());
        Self {
            backend,
            state,
            session: Mutex::new(None),
        }
    }

    /// Resolves a previously stored token, if any, and ends the loading phase.
    /// A failed lookup leaves the user signed out.
    pub async fn initialize(&self, stored_token: Option<&str>) {
        let identity = match stored_token {
            Some(token) => match self.backend.get_user(token).await {
                Ok(Some(identity)) => {
                    *self.session.lock().await = Some(Session {
                        access_token: token.to_string(),
                        identity: identity.clone(),
                    });
                    Some(identity)
                }
                Ok(None) => None,
                Err(e) => {
                    warn!("Failed to restore session: {e}");
                    None
                }
            },
            None => None,
        };

        self.publish(match identity {
            Some(identity) => AuthState::signed_in(identity),
            None => AuthState::signed_out(),
        });
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.backend.sign_in(email, password).await?;
        info!(user = %session.identity.id, "signed in");
        self.adopt(session.clone()).await;
        Ok(session)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Option<Session>, AuthError> {
        check_registration(password, confirm_password)?;

        let session = self.backend.sign_up(email, password).await?;
        match &session {
            Some(session) => self.adopt(session.clone()).await,
            None => info!("registration pending email confirmation"),
        }
        Ok(session)
    }

    /// Always ends signed out locally, even when the service call fails.
    pub async fn sign_out(&self) {
        // Session and published state change together under the lock.
        let session = {
            let mut current = self.session.lock().await;
            let session = current.take();
            self.publish(AuthState::signed_out());
            session
        };

        if let Some(session) = session {
            if let Err(e) = self.backend.sign_out(&session.access_token).await {
                warn!("Sign-out request failed: {e}");
            }
        }
    }

    pub async fn reset_password(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        self.backend.reset_password(email, redirect_to).await
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    async fn adopt(&self, session: Session) {
        let identity = session.identity.clone();
        let mut current = self.session.lock().await;
        *current = Some(session);
        self.publish(AuthState::signed_in(identity));
    }

    fn publish(&self, state: AuthState) {
        debug!(signed_in = state.identity.is_some(), "auth state changed");
        self.state.send_replace(state);
    }
}

impl AuthSource for AuthProvider {
    fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> AuthSubscription {
        AuthSubscription::new(self.state.subscribe())
    }
}
