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
//! # Fusion Relayer Utils 🕸️
//!
//! Errors, metrics and small helpers shared by every crate of the relayer.

use ethers::types::U256;

/// Helper for printing clickable transaction links in the terminal.
pub mod clickable_link;
/// Metrics functionality
pub mod metric;
/// A module used for debugging relayer lifecycle, sync state, or other relayer state.
pub mod probe;
/// Retry functionality
pub mod retry;

/// The status code recorded on-chain when the remote endpoint never answered.
pub const FALLBACK_STATUS_CODE: u16 = 500;

/// An enum of all possible errors that could be encountered during the execution of the Fusion
/// Relayer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An Io error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON Error occurred.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Config loading error.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Error while iterating over a glob pattern.
    #[error(transparent)]
    GlobPattern(#[from] glob::PatternError),
    /// Error from Glob Iterator.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
    /// Invalid regular expression.
    #[error(transparent)]
    Regex(#[from] regex::Error),
    /// Error while parsing a URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// HTTP server error.
    #[error(transparent)]
    Hyper(#[from] hyper::Error),
    /// Error in Http Provider (ethers client).
    #[error(transparent)]
    EthersProvider(#[from] ethers::providers::ProviderError),
    /// A call through a generic middleware stack failed.
    #[error("Middleware error: {0}")]
    Middleware(String),
    /// Ether wallet errors.
    #[error(transparent)]
    EtherWalletError(#[from] ethers::signers::WalletError),
    /// Reqwest error
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    /// Prometheus registry error.
    #[error(transparent)]
    PrometheusError(#[from] prometheus::Error),
    /// A relay step failed.
    #[error(transparent)]
    Relay(#[from] RelayError),
    /// Generic error.
    #[error("{}", _0)]
    Generic(&'static str),
    /// Error while parsing the config files.
    #[error("Config parse error: {}", _0)]
    ParseConfig(#[from] serde_path_to_error::Error<config::ConfigError>),
    /// Missing Secrets in the config, the private key of the relaying account.
    #[error("Missing required private-key in the config")]
    MissingSecrets,
    /// The configured chain id does not match the one reported by the node.
    #[error("Chain id mismatch: configured {expected} but the node reports {found}")]
    ChainIdMismatch {
        /// The chain id from the config.
        expected: u64,
        /// The chain id returned by `eth_chainId`.
        found: u64,
    },
    /// A background task stopped unexpectedly.
    #[error("Task Stopped Abnormally")]
    TaskStoppedAbnormally,
}

/// The failure taxonomy of a single relayed request.
///
/// `Decode` and `HttpTransport` are recovered by the request executor and turned into an error
/// response; `Submission` ends the processing of the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// The request body is not UTF-8 encoded JSON.
    #[error("{0}")]
    Decode(String),
    /// No usable response could be read from the remote endpoint.
    #[error("{message}")]
    HttpTransport {
        /// Status code of the response, if one was received before the failure.
        status: Option<u16>,
        /// Description of the failure.
        message: String,
    },
    /// The `handleResponse` transaction was not included.
    #[error("Failed to submit response for request {request_id}: {reason}")]
    Submission {
        /// The request the response belongs to.
        request_id: U256,
        /// Description of the failure.
        reason: String,
    },
}

impl RelayError {
    /// The status code to record on-chain for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::HttpTransport {
                status: Some(status),
                ..
            } => *status,
            _ => FALLBACK_STATUS_CODE,
        }
    }

    /// JSON object `{"error": "<description>"}` describing this failure.
    pub fn error_payload(&self) -> String {
        serde_json::json!({ "error": self.to_string() }).to_string()
    }

    /// Short tag used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Decode(_) => "decode",
            RelayError::HttpTransport { .. } => "http_transport",
            RelayError::Submission { .. } => "submission",
        }
    }
}

/// A type alias for the result for fusion relayer, that uses the `Error` enum.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_without_status_falls_back_to_500() {
        let err = RelayError::HttpTransport {
            status: None,
            message: "dns error".into(),
        };
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_payload(), r#"{"error":"dns error"}"#);
    }

    #[test]
    fn transport_error_keeps_remote_status() {
        let err = RelayError::HttpTransport {
            status: Some(502),
            message: "connection reset".into(),
        };
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn error_payload_escapes_quotes() {
        let err = RelayError::Decode(r#"expected value at "body""#.into());
        let payload: serde_json::Value =
            serde_json::from_str(&err.error_payload()).unwrap();
        assert_eq!(payload["error"], r#"expected value at "body""#);
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.kind(), "decode");
    }
}
