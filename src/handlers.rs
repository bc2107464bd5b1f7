// handlers.rs
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::{check_registration, AuthError, Identity, Session};
use crate::error::AppError;
use crate::gate::access_token;
use crate::models::{demo_polls, Poll, PollDraft, PollSummary};
use crate::state::AppState;
use crate::validation::{validate_create_poll_now, ValidationReport};

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

fn malformed(rejection: JsonRejection) -> AppError {
    AppError::MalformedPayload(rejection.body_text())
}

pub async fn health() -> &'static str {
    "ok"
}

/// List polls for the browse page
pub async fn list_polls() -> Json<Vec<PollSummary>> {
    Json(demo_polls())
}

/// Check a draft without creating anything
pub async fn validate_poll(
    payload: Result<Json<PollDraft>, JsonRejection>,
) -> Result<Json<ValidationReport>, AppError> {
    let Json(draft) = payload.map_err(malformed)?;
    Ok(Json(validate_create_poll_now(&draft)))
}

/// Create a poll for the signed-in user. Polls are not stored yet.
pub async fn create_poll(
    Extension(identity): Extension<Identity>,
    payload: Result<Json<PollDraft>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(draft) = payload.map_err(malformed)?;

    let report = validate_create_poll_now(&draft);
    if !report.is_valid() {
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(report)).into_response());
    }

    let poll = Poll::from_draft(&draft, &identity.id, Utc::now());
    info!(poll = %poll.id, user = %identity.id, options = poll.options.len(), "Creating poll");

    Ok((StatusCode::CREATED, Json(poll)).into_response())
}

pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, AppError> {
    let Json(credentials) = payload.map_err(malformed)?;
    let session = state
        .auth
        .sign_in(&credentials.email, &credentials.password)
        .await?;
    info!(user = %session.identity.id, "signed in");
    Ok(Json(session))
}

pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(registration) = payload.map_err(malformed)?;
    check_registration(&registration.password, &registration.confirm_password)?;

    let session = state
        .auth
        .sign_up(&registration.email, &registration.password)
        .await?;

    Ok(match session {
        Some(session) => (StatusCode::CREATED, Json(json!({ "session": session }))).into_response(),
        None => (
            StatusCode::ACCEPTED,
            Json(json!({
                "message": "Registration successful! Please check your email to confirm your account."
            })),
        )
            .into_response(),
    })
}

pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, AppError> {
    let token = access_token(&headers).ok_or(AuthError::NotSignedIn)?;
    state.auth.sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_password(
    State(state): State<AppState>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(request) = payload.map_err(malformed)?;
    state
        .auth
        .reset_password(&request.email, &state.config.reset_password_url())
        .await?;
    Ok(Json(json!({
        "message": "Password reset email sent! Please check your inbox."
    })))
}
