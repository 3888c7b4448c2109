//! Route handlers and the response contract they share.
//!
//! Every handler answers `200 OK` with a JSON body: the requested data, a
//! `{message}` for a missing or foreign entity, or `{message, error}` when
//! the store failed.
pub mod note;
pub mod notes;
pub mod status;
pub mod users;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::StoreError;
use crate::error::ServerError;
use crate::model::Id;

/// `{ message }` body.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{ message, error }` body of a store failure.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub message: String,
    pub error: String,
}

/// `{ id, message }` body of a successful creation.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Created {
    pub id: Id,
    pub message: String,
}

/// Outcome of a handler.
#[derive(Debug)]
pub enum Reply<T> {
    Data(T),
    Message(String),
    Failure {
        message: &'static str,
        error: StoreError,
    },
}

impl<T> Reply<T> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn failure(message: &'static str, error: StoreError) -> Self {
        Self::Failure { message, error }
    }

    /// Report a store error under `message`.
    pub fn caught(
        result: Result<Reply<T>, StoreError>,
        message: &'static str,
    ) -> Self {
        result.unwrap_or_else(|error| Self::failure(message, error))
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        match self {
            Reply::Data(data) => Json(data).into_response(),
            Reply::Message(message) => Json(Message::new(message)).into_response(),
            Reply::Failure { message, error } => {
                tracing::warn!(%error, reply = message, "store request failed");

                Json(Failure {
                    message: message.to_owned(),
                    error: error.to_string(),
                })
                .into_response()
            },
        }
    }
}

/// JSON request body where an absent body counts as `{}`.
///
/// Bodies sent without a JSON content type, and top-level arrays, are read
/// the same way, so a missing field is reported by the handler rather than
/// rejected here. Only unparsable JSON and top-level scalars are refused.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));
        let bytes = Bytes::from_request(req, state).await?;

        if !is_json || bytes.is_empty() {
            return Ok(Self(T::default()));
        }

        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Array(_) => Ok(Self(T::default())),
            value => Ok(Self(serde_json::from_value(value)?)),
        }
    }
}

/// In-memory state for handler tests.
#[cfg(test)]
pub fn state() -> crate::AppState {
    crate::AppState {
        config: std::sync::Arc::new(crate::config::Configuration::default()),
        db: crate::database::Database::memory(),
    }
}
