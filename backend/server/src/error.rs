use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error};

use crate::store::StoreError;

/// One violated rule on one field, as reported inside the response envelope.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            value: None,
        }
    }

    pub fn with_value(field: &str, message: &str, value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::new(field, message)
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Profile not found")]
    NotFound,

    #[error("Duplicate field value")]
    DuplicateKey { field: String, value: String },

    #[error("Invalid data format")]
    Malformed(String),

    #[error("storage failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // A lost race on the unique email index is a client-visible
            // conflict, not an internal failure.
            StoreError::DuplicateEmail(email) => AppError::DuplicateKey {
                field: "email".to_string(),
                value: email,
            },
            // The record vanished between load and persist: to the caller
            // the profile simply no longer exists.
            StoreError::Missing(_) => AppError::NotFound,
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, "Validation failed", errors)
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Profile not found", Vec::new()),
            AppError::DuplicateKey { field, value } => (
                StatusCode::BAD_REQUEST,
                "Duplicate field value",
                vec![FieldError::with_value(
                    &field,
                    &format!("{field} already exists"),
                    Value::String(value),
                )],
            ),
            AppError::Malformed(detail) => {
                debug!("rejected malformed payload: {detail}");
                (StatusCode::BAD_REQUEST, "Invalid data format", Vec::new())
            }
            AppError::Store(err) => {
                error!("storage failure: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    Vec::new(),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
        });
        if !errors.is_empty() {
            body["errors"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}
