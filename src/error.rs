//! Transport-level errors.
//!
//! Application outcomes (missing user, foreign note, store failure) are
//! always answered with a success status, see [`crate::router::Reply`]. Only
//! requests the service cannot even read end up here.

use axum::extract::rejection::BytesRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("error parsing JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Body(#[from] BytesRejection),
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
        }
    }
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match serde_json::to_string(&self) {
            Ok(body) => {
                (status, [(header::CONTENT_TYPE, "application/json")], body)
                    .into_response()
            },
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default().details(&self.to_string());

        match self {
            ServerError::Json(_) => response
                .title("Request body is not valid JSON.")
                .status(StatusCode::BAD_REQUEST),
            ServerError::Body(rejection) => {
                tracing::debug!(error = %rejection, "unreadable request body");
                response
                    .title("Request body could not be read.")
                    .status(rejection.status())
            },
        }
        .into_response()
    }
}
