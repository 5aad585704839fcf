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

//! Bindings of the FusionLinker contract.

#![allow(missing_docs)]

use ethers::contract::LogMeta;

use crate::RequestEvent;

ethers::contract::abigen!(
    FusionLinkerContract,
    r#"[
        event ApiRequestInitiated(uint256 indexed requestId, address indexed initiator, string url, bytes body)
        function handleResponse(uint256 requestId, uint256 statusCode, string responseBody)
    ]"#,
);

impl From<ApiRequestInitiatedFilter> for RequestEvent {
    fn from(event: ApiRequestInitiatedFilter) -> Self {
        RequestEvent::new(event.request_id, event.initiator, event.url, event.body)
    }
}

impl From<(ApiRequestInitiatedFilter, LogMeta)> for RequestEvent {
    fn from((event, log): (ApiRequestInitiatedFilter, LogMeta)) -> Self {
        RequestEvent::from(event).with_origin(log.block_number, log.transaction_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::{self, Token};
    use ethers::contract::EthEvent;
    use ethers::types::{Address, Bytes, H256, U256};

    fn raw_log(request_id: u64, initiator: Address, url: &str, body: &[u8]) -> abi::RawLog {
        abi::RawLog {
            topics: vec![
                ApiRequestInitiatedFilter::signature(),
                H256::from_low_u64_be(request_id),
                H256::from(initiator),
            ],
            data: abi::encode(&[
                Token::String(url.to_string()),
                Token::Bytes(body.to_vec()),
            ]),
        }
    }

    #[test]
    fn event_signature_matches_the_abi() {
        assert_eq!(
            ApiRequestInitiatedFilter::abi_signature(),
            "ApiRequestInitiated(uint256,address,string,bytes)"
        );
    }

    #[test]
    fn decodes_fields_in_positional_order() {
        let initiator = Address::repeat_byte(0xaa);
        let log = raw_log(42, initiator, "https://api.example.com/v1", br#"{"a":1}"#);
        let event = <ApiRequestInitiatedFilter as EthEvent>::decode_log(&log).unwrap();
        let request = RequestEvent::from(event);
        assert_eq!(request.request_id, U256::from(42));
        assert_eq!(request.initiator, initiator);
        assert_eq!(request.url, "https://api.example.com/v1");
        assert_eq!(request.body, Bytes::from_static(br#"{"a":1}"#));
        assert!(request.has_body());
    }

    #[test]
    fn empty_body_decodes_to_a_get() {
        let log = raw_log(7, Address::zero(), "https://api.example.com/data", &[]);
        let request = RequestEvent::from(<ApiRequestInitiatedFilter as EthEvent>::decode_log(&log).unwrap());
        assert!(!request.has_body());
    }
}
