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

use std::sync::{Arc, Mutex};

use ethers::abi::AbiDecode;
use ethers::providers::{MockProvider, PendingTransaction, Provider, ProviderError};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, BlockId, Transaction};
use fusion_relayer_types::linker::HandleResponseCall;

use super::*;

const TX_HASH: H256 = H256::repeat_byte(0x77);

/// Accepts every transaction without signing it, and keeps a copy of it.
#[derive(Debug)]
struct RecordingClient {
    inner: Provider<MockProvider>,
    sent: Mutex<Vec<TypedTransaction>>,
}

#[async_trait::async_trait]
impl Middleware for RecordingClient {
    type Error = ProviderError;
    type Provider = MockProvider;
    type Inner = Provider<MockProvider>;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn send_transaction<T: Into<TypedTransaction> + Send + Sync>(
        &self,
        tx: T,
        _block: Option<BlockId>,
    ) -> Result<PendingTransaction<'_, Self::Provider>, Self::Error> {
        self.sent.lock().unwrap().push(tx.into());
        Ok(PendingTransaction::new(TX_HASH, self.provider()))
    }
}

fn receipt(status: u64, block: u64) -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash: H256::repeat_byte(0x11),
        block_number: Some(U64::from(block)),
        status: Some(U64::from(status)),
        ..Default::default()
    }
}

#[test]
fn included_receipt_is_a_success() {
    let request_id = U256::from(9);
    let result =
        receipt_to_result(request_id, H256::repeat_byte(0x11), Some(receipt(1, 120)))
            .unwrap();
    assert_eq!(
        result,
        SubmissionResult {
            request_id,
            tx_hash: H256::repeat_byte(0x11),
            block_number: Some(U64::from(120)),
            included: true,
        }
    );
}

#[test]
fn reverted_receipt_is_a_submission_error() {
    let err = receipt_to_result(U256::from(9), H256::zero(), Some(receipt(0, 120)))
        .unwrap_err();
    match err {
        RelayError::Submission { request_id, reason } => {
            assert_eq!(request_id, U256::from(9));
            assert!(reason.contains("reverted in block 120"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn dropped_tx_is_a_submission_error() {
    let err = receipt_to_result(U256::one(), H256::zero(), None).unwrap_err();
    assert_eq!(err.kind(), "submission");
    assert!(err.to_string().contains("dropped"));
}

#[test]
fn pre_byzantium_receipt_without_status_counts_as_included() {
    let mut r = receipt(1, 3);
    r.status = None;
    assert!(receipt_to_result(U256::one(), H256::zero(), Some(r)).is_ok());
}

#[tokio::test]
#[tracing_test::traced_test]
async fn send_failure_is_surfaced_not_swallowed() {
    // a mock with no queued responses fails every call.
    let (provider, _mock) = Provider::<MockProvider>::mocked();
    let submitter = EvmResponseSubmitter::builder()
        .contract(FusionLinkerContract::new(
            Address::repeat_byte(0x42),
            Arc::new(provider),
        ))
        .confirmations(2)
        .receipt_poll_interval(Duration::from_millis(10))
        .build();
    let err = submitter
        .submit(U256::from(5), 200, r#"{"ok":true}"#)
        .await
        .unwrap_err();
    match err {
        RelayError::Submission { request_id, reason } => {
            assert_eq!(request_id, U256::from(5));
            assert!(reason.starts_with("failed to send"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(logs_contain("Error while sending the response tx"));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn included_response_carries_the_request_id() {
    let (provider, mock) = Provider::<MockProvider>::mocked();
    // answered last to first: the pending tx looks the tx up, then its receipt.
    mock.push::<TransactionReceipt, _>(TransactionReceipt {
        transaction_hash: TX_HASH,
        block_number: Some(U64::from(42)),
        status: Some(U64::one()),
        ..Default::default()
    })
    .unwrap();
    mock.push::<Transaction, _>(Transaction {
        hash: TX_HASH,
        // a transaction without a block is still pending, the receipt is never asked for.
        block_number: Some(U64::from(42)),
        ..Default::default()
    })
    .unwrap();
    let client = Arc::new(RecordingClient {
        inner: provider.interval(Duration::from_millis(10)),
        sent: Mutex::new(Vec::new()),
    });
    let linker = Address::repeat_byte(0x42);
    let submitter = EvmResponseSubmitter::builder()
        .contract(FusionLinkerContract::new(linker, client.clone()))
        .receipt_poll_interval(Duration::from_millis(10))
        .build();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        submitter.submit(U256::from(7), 404, r#"{"error":"not found"}"#),
    )
    .await
    .expect("the mocked tx should be mined right away")
    .unwrap();
    assert_eq!(
        result,
        SubmissionResult {
            request_id: U256::from(7),
            tx_hash: TX_HASH,
            block_number: Some(U64::from(42)),
            included: true,
        }
    );

    let sent = client.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_addr(), Some(&linker));
    let call = HandleResponseCall::decode(sent[0].data().unwrap()).unwrap();
    assert_eq!(call.request_id, U256::from(7));
    assert_eq!(call.status_code, U256::from(404));
    assert_eq!(call.response_body, r#"{"error":"not found"}"#);
    assert!(logs_contain("is finalized"));
}
