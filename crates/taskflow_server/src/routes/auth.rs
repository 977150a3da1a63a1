//! `/api/auth` handlers.

use crate::error::ApiError;
use crate::extract::{AppJson, AuthenticatedCaller};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use taskflow_core::{LoginInput, MessageEnvelope, RegisterInput, SessionEnvelope, UserEnvelope};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterInput>,
) -> Result<(StatusCode, AppJson<SessionEnvelope>), ApiError> {
    let session = state.with_auth(move |auth| auth.register(&input)).await?;
    Ok((StatusCode::CREATED, AppJson(session.into())))
}

async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginInput>,
) -> Result<AppJson<SessionEnvelope>, ApiError> {
    let session = state.with_auth(move |auth| auth.login(&input)).await?;
    Ok(AppJson(session.into()))
}

async fn me(
    State(state): State<AppState>,
    AuthenticatedCaller { caller, .. }: AuthenticatedCaller,
) -> Result<AppJson<UserEnvelope>, ApiError> {
    let user = state
        .with_auth(move |auth| auth.current_user(&caller))
        .await?;
    Ok(AppJson(UserEnvelope::new(user)))
}

async fn logout(
    State(state): State<AppState>,
    AuthenticatedCaller { token, .. }: AuthenticatedCaller,
) -> Result<AppJson<MessageEnvelope>, ApiError> {
    state.with_auth(move |auth| auth.logout(&token)).await?;
    Ok(AppJson(MessageEnvelope::ok("Logged out successfully")))
}
