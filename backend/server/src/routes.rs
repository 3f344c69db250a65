use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::{Value, json};

use crate::{
    error::AppError,
    model::Profile,
    state::State as AppState,
    validation::{RawProfileInput, validate_create, validate_update},
};

fn profile_body(message: &str, profile: &Profile) -> Value {
    json!({
        "success": true,
        "message": message,
        "data": { "profile": profile },
    })
}

fn parse_body(payload: Result<Json<RawProfileInput>, JsonRejection>) -> Result<RawProfileInput, AppError> {
    let Json(raw) = payload.map_err(|rejection| AppError::Malformed(rejection.to_string()))?;
    Ok(raw)
}

/// POST /api/profile - create-or-update, keyed by email.
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawProfileInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let raw = parse_body(payload)?;
    let input = validate_create(&raw).map_err(AppError::Validation)?;

    let profile = state.service.create_or_update(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(profile_body("Profile created/updated successfully", &profile)),
    )
        .into_response())
}

/// GET /api/profile
pub async fn get_profile(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let profile = state.service.get().await?.ok_or(AppError::NotFound)?;

    Ok(Json(profile_body("Profile retrieved successfully", &profile)).into_response())
}

/// PUT /api/profile - partial update.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawProfileInput>, JsonRejection>,
) -> Result<Response, AppError> {
    // Absence wins over input validity: a missing profile answers 404 even
    // when the body would not have validated.
    if state.service.get().await?.is_none() {
        return Err(AppError::NotFound);
    }

    let raw = parse_body(payload)?;
    let input = validate_update(&raw).map_err(AppError::Validation)?;

    let profile = state.service.update(input).await?;

    Ok(Json(profile_body("Profile updated successfully", &profile)).into_response())
}

/// DELETE /api/profile
pub async fn delete_profile(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    if !state.service.delete().await? {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Profile deleted successfully",
    }))
    .into_response())
}

/// GET /api/profile/stats - diagnostic record count.
pub async fn profile_stats(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let count = state.service.count().await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile statistics retrieved successfully",
        "data": { "totalProfiles": count },
    }))
    .into_response())
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    }))
}

/// GET /api - endpoint listing for humans poking at the service.
pub async fn api_index() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "API is running",
        "timestamp": Utc::now().to_rfc3339(),
        "endpoints": {
            "health": "/health",
            "profile": "/api/profile",
        },
    }))
}

pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
        })),
    )
}
