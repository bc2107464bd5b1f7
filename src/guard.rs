// src/guard.rs
//! Gate for content that needs a signed-in user.
//!
//! The guard starts out [`GuardState::Resolving`] and moves on as auth
//! snapshots arrive. Entering [`GuardState::Unauthorized`] sends the viewer
//! to the sign-in page once per entry; staying there does not repeat it.
use tracing::{debug, info};

use crate::auth::{AuthState, AuthSubscription, Identity};

pub const SIGN_IN_PATH: &str = "/auth";

/// Where the guard sends unauthenticated viewers.
pub trait Navigator {
    fn redirect(&mut self, path: &str);
}

impl<F> Navigator for F
where
    F: FnMut(&str),
{
    fn redirect(&mut self, path: &str) {
        self(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Resolving,
    Authorized,
    Unauthorized,
}

/// What the guard shows for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<T> {
    /// Waiting on auth. Holds the caller's placeholder, `None` for the
    /// default loading indicator.
    Waiting(Option<T>),
    Content(T),
    Nothing,
}

pub struct AccessGuard<N> {
    state: GuardState,
    identity: Option<Identity>,
    navigator: N,
    sign_in_path: String,
}

impl<N: Navigator> AccessGuard<N> {
    pub fn new(navigator: N) -> Self {
        Self::with_sign_in_path(navigator, SIGN_IN_PATH)
    }

    pub fn with_sign_in_path(navigator: N, sign_in_path: impl Into<String>) -> Self {
        Self {
            state: GuardState::Resolving,
            identity: None,
            navigator,
            sign_in_path: sign_in_path.into(),
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }

    /// Applies one snapshot and returns the resulting state.
    ///
    /// A snapshot that is still loading never moves the guard, so once it
    /// has left `Resolving` it does not go back.
    pub fn apply(&mut self, snapshot: &AuthState) -> GuardState {
        if snapshot.loading {
            return self.state;
        }

        let next = match snapshot.identity {
            Some(_) => GuardState::Authorized,
            None => GuardState::Unauthorized,
        };
        let previous = std::mem::replace(&mut self.state, next);
        self.identity = snapshot.identity.clone();

        if previous != next {
            debug!(?previous, ?next, "guard transition");
            if next == GuardState::Unauthorized {
                info!(path = %self.sign_in_path, "redirecting unauthenticated viewer");
                self.navigator.redirect(&self.sign_in_path);
            }
        }

        next
    }

    pub fn render<T>(&self, content: impl FnOnce() -> T, placeholder: Option<T>) -> Rendered<T> {
        match self.state {
            GuardState::Resolving => Rendered::Waiting(placeholder),
            GuardState::Authorized => Rendered::Content(content()),
            GuardState::Unauthorized => Rendered::Nothing,
        }
    }
}

/// Feeds a guard from a subscription, in delivery order, until the source
/// goes away. Dropping the returned future cancels the subscription.
pub async fn watch_guard<N: Navigator>(guard: &mut AccessGuard<N>, mut subscription: AuthSubscription) {
    while let Some(snapshot) = subscription.next().await {
        guard.apply(&snapshot);
    }
    subscription.unsubscribe();
}
