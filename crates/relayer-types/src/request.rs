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

use ethers::types::{Address, Bytes, H256, U256, U64};
use fusion_relayer_utils::RelayError;

/// A request observed on the linker contract through an `ApiRequestInitiated` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEvent {
    /// Correlation token chosen by the contract.
    pub request_id: U256,
    /// The account or contract that asked for the call.
    pub initiator: Address,
    /// Target of the outbound call.
    pub url: String,
    /// UTF-8 JSON for a POST, empty (`0x`) for a GET.
    pub body: Bytes,
    /// Block that emitted the event.
    pub block_number: Option<U64>,
    /// Transaction that emitted the event.
    pub transaction_hash: Option<H256>,
}

impl RequestEvent {
    /// Creates a request that is not tied to a log yet.
    pub fn new(
        request_id: impl Into<U256>,
        initiator: Address,
        url: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            initiator,
            url: url.into(),
            body: body.into(),
            block_number: None,
            transaction_hash: None,
        }
    }

    /// Records where the event was emitted.
    pub fn with_origin(mut self, block_number: U64, transaction_hash: H256) -> Self {
        self.block_number = Some(block_number);
        self.transaction_hash = Some(transaction_hash);
        self
    }

    /// Whether the request carries a body, i.e. whether it is relayed as a POST.
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

/// The normalized result of one outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOutcome {
    /// Status code recorded on-chain.
    pub status_code: u16,
    /// JSON text recorded on-chain.
    pub payload: String,
}

impl HttpOutcome {
    /// Creates a new outcome.
    pub fn new(status_code: u16, payload: impl Into<String>) -> Self {
        Self {
            status_code,
            payload: payload.into(),
        }
    }

    /// The error response recorded when the call failed.
    pub fn from_error(error: &RelayError) -> Self {
        Self::new(error.status_code(), error.error_payload())
    }

    /// Whether the remote answered with a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl From<RelayError> for HttpOutcome {
    fn from(error: RelayError) -> Self {
        Self::from_error(&error)
    }
}

/// The `handleResponse` transaction of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    /// The request the response belongs to.
    pub request_id: U256,
    /// Hash of the `handleResponse` transaction.
    pub tx_hash: H256,
    /// Block that included the transaction.
    pub block_number: Option<U64>,
    /// Whether the transaction made it into a block.
    pub included: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_a_get() {
        let get = RequestEvent::new(1u64, Address::zero(), "https://api.example.com/data", Bytes::new());
        assert!(!get.has_body());
        let post = RequestEvent::new(
            2u64,
            Address::zero(),
            "https://api.example.com/create",
            Bytes::from_static(br#"{"x":1}"#),
        );
        assert!(post.has_body());
    }

    #[test]
    fn error_outcome_is_json() {
        let outcome = HttpOutcome::from(RelayError::HttpTransport {
            status: None,
            message: "connection refused".into(),
        });
        assert_eq!(outcome.status_code, 500);
        assert_eq!(outcome.payload, r#"{"error":"connection refused"}"#);
        assert!(!outcome.is_success());
        assert!(HttpOutcome::new(204, "\"\"").is_success());
    }
}
