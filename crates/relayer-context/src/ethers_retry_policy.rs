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

use std::time::Duration;

use ethers::providers::{HttpClientError, JsonRpcError, RetryPolicy};

/// Implements [RetryPolicy] that will retry requests that errored with
/// status code 429 i.e. TOO_MANY_REQUESTS
///
/// Infura often fails with a `"header not found"` rpc error which is apparently linked to load
/// balancing, which are retried as well.
#[derive(Debug)]
pub struct FusionHttpRetryPolicy {
    err_regex: regex::Regex,
}

impl FusionHttpRetryPolicy {
    /// Creates the policy, fails only if the built-in pattern does not compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            err_regex: regex::Regex::new(
                r"(?mixU)\b(?:rate|limit|429|Too \s Many \s Requests)\b",
            )?,
        })
    }

    /// Boxed policy, the form `RetryClient` expects.
    pub fn boxed() -> Result<Box<Self>, regex::Error> {
        Self::new().map(Box::new)
    }
}

fn should_retry_json_rpc_error(err: &JsonRpcError) -> bool {
    let JsonRpcError { code, message, .. } = err;
    // alchemy throws it this way
    if *code == 429 {
        return true;
    }

    // exceeded project rate limit
    if *code == -32005 {
        return true;
    }

    if *code == -32016 && message.contains("rate limit") {
        return true;
    }

    matches!(
        message.as_str(),
        "header not found"
            | "daily request count exceeded, request rate limited"
    )
}

// check the raw body of a response that could not be decoded
fn should_retry_undecodable_response(
    err: &serde_json::Error,
    text: &str,
    err_regex: &regex::Regex,
) -> bool {
    // some providers send invalid JSON RPC in the error case (no `id:u64`), but the
    // text should be a `JsonRpcError`
    #[derive(serde::Deserialize)]
    struct Resp {
        error: JsonRpcError,
    }

    if let Ok(resp) = serde_json::from_str::<Resp>(text) {
        return should_retry_json_rpc_error(&resp.error);
    }

    let err_text = err.to_string().to_lowercase();
    let should_retry = err_regex.is_match(&text.to_lowercase())
        || matches!(err_text.as_str(), "expected value at line 1 column 1");

    tracing::event!(
        target: fusion_relayer_utils::probe::TARGET,
        tracing::Level::DEBUG,
        kind = %fusion_relayer_utils::probe::Kind::Retry,
        should_retry = should_retry,
        error = %err_text,
    );
    should_retry
}

impl RetryPolicy<HttpClientError> for FusionHttpRetryPolicy {
    fn should_retry(&self, error: &HttpClientError) -> bool {
        tracing::debug!("should_retry: {:?}", error);
        match error {
            HttpClientError::ReqwestError(err) => {
                err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS)
            }
            HttpClientError::JsonRpcError(err) => {
                should_retry_json_rpc_error(err)
            }
            HttpClientError::SerdeJson { err, text } => {
                should_retry_undecodable_response(err, text, &self.err_regex)
            }
        }
    }

    fn backoff_hint(&self, error: &HttpClientError) -> Option<Duration> {
        const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

        if let HttpClientError::JsonRpcError(JsonRpcError {
            data: Some(data),
            ..
        }) = error
        {
            // if daily rate limit exceeded, infura returns the requested backoff in the error
            // response
            let Some(backoff_seconds) =
                data.get("rate").and_then(|v| v.get("backoff_seconds"))
            else {
                return Some(DEFAULT_BACKOFF);
            };
            if let Some(seconds) = backoff_seconds.as_u64() {
                return Some(Duration::from_secs(seconds));
            }
            if let Some(seconds) = backoff_seconds.as_f64() {
                return Some(Duration::from_secs(seconds as u64 + 1));
            }
        }

        Some(DEFAULT_BACKOFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpc_error(code: i64, message: &str) -> JsonRpcError {
        JsonRpcError {
            code,
            message: message.to_string(),
            data: None,
        }
    }

    #[test]
    fn rate_limits_are_retried() {
        assert!(should_retry_json_rpc_error(&rpc_error(429, "slow down")));
        assert!(should_retry_json_rpc_error(&rpc_error(-32005, "limit")));
        assert!(should_retry_json_rpc_error(&rpc_error(
            -32000,
            "header not found"
        )));
    }

    #[test]
    fn reverts_are_not_retried() {
        let policy = FusionHttpRetryPolicy::new().unwrap();
        let err = HttpClientError::JsonRpcError(rpc_error(3, "execution reverted"));
        assert!(!policy.should_retry(&err));
        assert_eq!(policy.backoff_hint(&err), Some(Duration::from_secs(5)));
    }

    #[test]
    fn infura_backoff_hint_is_honored() {
        let policy = FusionHttpRetryPolicy::new().unwrap();
        let err = HttpClientError::JsonRpcError(JsonRpcError {
            code: -32005,
            message: "daily request count exceeded, request rate limited".into(),
            data: Some(serde_json::json!({ "rate": { "backoff_seconds": 30 } })),
        });
        assert!(policy.should_retry(&err));
        assert_eq!(policy.backoff_hint(&err), Some(Duration::from_secs(30)));
    }

    #[test]
    fn plain_text_rate_limit_bodies_are_retried() {
        let policy = FusionHttpRetryPolicy::new().unwrap();
        let text = "Too Many Requests".to_string();
        let err = serde_json::from_str::<serde_json::Value>(&text).unwrap_err();
        assert!(policy.should_retry(&HttpClientError::SerdeJson { err, text }));
    }
}
