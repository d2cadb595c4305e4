use axum::{body::Bytes, extract::State};

use super::response::CommandResponse;
use crate::document::Document;

/// Generic message for faults that are not the caller's doing.
const INTERNAL_FAILURE: &str = "Internal error while executing command";

pub async fn execute_command(State(document): State<Document>, body: Bytes) -> CommandResponse {
    let outcome = tokio::task::spawn_blocking(move || document.execute_bytes(&body)).await;

    match outcome {
        Ok(result) => result.into(),
        Err(e) => {
            tracing::error!("Command task failed: {}", e);
            CommandResponse::Failure(INTERNAL_FAILURE.to_string())
        }
    }
}
