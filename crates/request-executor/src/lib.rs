// Copyright 2022 Webb Technologies Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![warn(missing_docs)]
//! # Fusion Request Executor 🕸️
//!
//! Performs the HTTP call described by a request event and turns whatever happens into an
//! [`HttpOutcome`] that can be recorded on-chain.
//!
//! * an empty body is relayed as a `GET`,
//! * any other body must be UTF-8 JSON and is relayed as a `POST` with that JSON,
//! * every response, whatever its status, is an outcome carrying the remote status and body,
//! * failures become a `{"error": ..}` outcome with the remote status when one was received,
//!   `500` otherwise.

use ethers::types::Bytes;
use fusion_relayer_types::HttpOutcome;
use fusion_relayer_utils::RelayError;

/// Something able to run the HTTP call of a request.
#[async_trait::async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Runs the call, reporting failures as a tagged [`RelayError`].
    async fn try_execute(
        &self,
        url: &str,
        body: &Bytes,
    ) -> Result<HttpOutcome, RelayError>;

    /// Runs the call. Never fails, a failure is normalized into an error outcome.
    async fn execute(&self, url: &str, body: &Bytes) -> HttpOutcome {
        self.try_execute(url, body)
            .await
            .unwrap_or_else(HttpOutcome::from)
    }
}

/// [`RequestExecutor`] over a shared [`reqwest::Client`].
///
/// Timeouts and the user agent are whatever the client was built with. Calls are never
/// retried.
#[derive(Debug, Clone)]
pub struct HttpRequestExecutor {
    client: reqwest::Client,
}

impl HttpRequestExecutor {
    /// Creates an executor sending requests through `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl RequestExecutor for HttpRequestExecutor {
    async fn try_execute(
        &self,
        url: &str,
        body: &Bytes,
    ) -> Result<HttpOutcome, RelayError> {
        let request = if body.is_empty() {
            tracing::debug!(%url, "GET");
            self.client.get(url)
        } else {
            let json = decode_body(body)?;
            tracing::debug!(%url, "POST");
            self.client.post(url).json(&json)
        };
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            RelayError::HttpTransport {
                status: Some(status),
                message: e.to_string(),
            }
        })?;
        let outcome = HttpOutcome::new(status, response_payload(&text));
        if outcome.is_success() {
            tracing::debug!(%url, status, "Request succeeded");
        } else {
            tracing::warn!(%url, status, "Remote answered with a non-success status");
        }
        tracing::event!(
            target: fusion_relayer_utils::probe::TARGET,
            tracing::Level::DEBUG,
            kind = %fusion_relayer_utils::probe::Kind::HttpOutcome,
            %url,
            status,
        );
        Ok(outcome)
    }
}

/// Reads a request body as UTF-8 JSON.
pub fn decode_body(body: &[u8]) -> Result<serde_json::Value, RelayError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| RelayError::Decode(format!("body is not UTF-8: {e}")))?;
    serde_json::from_str(text)
        .map_err(|e| RelayError::Decode(format!("body is not JSON: {e}")))
}

/// The JSON text recorded for a response body.
///
/// JSON bodies are re-serialized compactly keeping their key order, anything else is
/// recorded as a JSON string.
pub fn response_payload(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => value.to_string(),
        Err(_) => serde_json::Value::String(text.to_owned()).to_string(),
    }
}

fn transport_error(e: reqwest::Error) -> RelayError {
    let message = if e.is_timeout() {
        format!("request timed out: {e}")
    } else {
        e.to_string()
    };
    RelayError::HttpTransport {
        status: e.status().map(|s| s.as_u16()),
        message,
    }
}

#[cfg(test)]
mod tests;
