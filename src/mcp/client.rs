//! HTTP client for the command endpoint.
//!
//! The endpoint URL comes from `CADLINK_URL`, or from `CADLINK_HOST` and
//! `CADLINK_PORT` (see [`crate::config`]).

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::config;
use crate::dispatch::Command;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint refused the command (400 with an error message).
    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response: {0}")]
    Server(String),
}

#[derive(Debug, Deserialize)]
struct EndpointReply {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Posts commands to a running endpoint.
#[derive(Debug, Clone)]
pub struct CadClient {
    url: String,
    client: Client,
}

impl CadClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        Self::new(config::endpoint_url_from_env())
    }

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one command and return the endpoint's result line. A success
    /// reply without a result reads as `Success`.
    pub async fn execute(&self, command: &Command) -> Result<String, ClientError> {
        tracing::debug!(command = %command.kind(), url = %self.url, "Relaying command");
        let response = self.client.post(&self.url).json(command).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match status {
            StatusCode::OK => {
                let reply: EndpointReply = serde_json::from_str(&body)
                    .map_err(|_| ClientError::Server(format!("{}: {}", status, body)))?;
                Ok(reply.result.unwrap_or_else(|| "Success".to_string()))
            }
            StatusCode::BAD_REQUEST => match serde_json::from_str::<EndpointReply>(&body) {
                Ok(EndpointReply {
                    error: Some(error), ..
                }) => Err(ClientError::Rejected(error)),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            },
            _ => Err(ClientError::Server(format!("{}: {}", status, body))),
        }
    }
}
