//! Result/error encoding for the command endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Body of a 200 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessBody {
    pub result: String,
}

/// Body of a 400 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Outcome of one command, as sent on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResponse {
    Success(String),
    Failure(String),
}

impl<E: std::fmt::Display> From<Result<String, E>> for CommandResponse {
    fn from(outcome: Result<String, E>) -> Self {
        match outcome {
            Ok(result) => Self::Success(result),
            Err(e) => Self::Failure(e.to_string()),
        }
    }
}

impl IntoResponse for CommandResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Success(result) => (StatusCode::OK, Json(SuccessBody { result })).into_response(),
            Self::Failure(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response()
            }
        }
    }
}
