//! Backend for a small poll-creation and voting app.
//!
//! The two pieces with real logic are [`validation`], which checks a poll
//! draft and reports every failing field at once, and [`guard`], the state
//! machine that decides whether protected content may be shown. The HTTP
//! surface in [`routes`] wires both to a hosted auth service.
pub mod auth;
pub mod config;
pub mod error;
pub mod form;
pub mod gate;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod supabase;
pub mod validation;

pub use auth::{AuthBackend, AuthProvider, AuthSource, AuthState, AuthSubscription, Identity};
pub use guard::{AccessGuard, GuardState, Navigator, Rendered};
pub use models::PollDraft;
pub use validation::{validate_create_poll, validate_create_poll_now, Field, ValidationReport};
