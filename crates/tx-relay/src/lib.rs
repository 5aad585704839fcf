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
//! # Fusion Transaction Relay 🕸️
//!
//! Records the outcome of a relayed request on-chain through `handleResponse`.

use std::time::Duration;

use ethers::providers::Middleware;
use ethers::types::{TransactionReceipt, H256, U256, U64};
use typed_builder::TypedBuilder;

use fusion_relayer_types::linker::FusionLinkerContract;
use fusion_relayer_types::SubmissionResult;
use fusion_relayer_utils::clickable_link::tx_link;
use fusion_relayer_utils::probe;
use fusion_relayer_utils::RelayError;

/// Something able to record a response on-chain.
#[async_trait::async_trait]
pub trait ResponseSubmitter: Send + Sync {
    /// Submits `handleResponse(request_id, status_code, payload)` and waits for its inclusion.
    async fn submit(
        &self,
        request_id: U256,
        status_code: u16,
        payload: &str,
    ) -> Result<SubmissionResult, RelayError>;
}

/// [`ResponseSubmitter`] calling the FusionLinker contract through an ethers middleware.
///
/// The middleware is expected to sign and to manage nonces, submissions of different
/// requests run concurrently through the same instance.
#[derive(TypedBuilder)]
pub struct EvmResponseSubmitter<M: Middleware> {
    /// The linker contract, bound to the signing client.
    contract: FusionLinkerContract<M>,
    /// Confirmations to wait for.
    #[builder(default = 1)]
    confirmations: usize,
    /// Receipt polling interval.
    #[builder(default = Duration::from_secs(1))]
    receipt_poll_interval: Duration,
    /// Block explorer used for printing clickable links.
    #[builder(default)]
    explorer: Option<url::Url>,
}

#[async_trait::async_trait]
impl<M: Middleware + 'static> ResponseSubmitter for EvmResponseSubmitter<M> {
    #[tracing::instrument(skip_all, fields(%request_id, status_code))]
    async fn submit(
        &self,
        request_id: U256,
        status_code: u16,
        payload: &str,
    ) -> Result<SubmissionResult, RelayError> {
        let call = self.contract.handle_response(
            request_id,
            U256::from(status_code),
            payload.to_owned(),
        );
        let pending = call.send().await.map_err(|e| {
            tracing::error!(%e, "Error while sending the response tx");
            tracing::event!(
                target: probe::TARGET,
                tracing::Level::DEBUG,
                kind = %probe::Kind::ResponseTx,
                %request_id,
                errored = true,
                error = %e,
            );
            submission_error(request_id, format!("failed to send: {e}"))
        })?;
        let tx_hash = *pending;
        let tx_hash_string = format!("0x{tx_hash:x}");
        tracing::info!(
            "Tx {} is submitted and pending!",
            tx_link(&tx_hash_string, self.explorer.as_ref()),
        );
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::ResponseTx,
            %request_id,
            pending = true,
            %tx_hash,
        );
        let receipt = pending
            .confirmations(self.confirmations)
            .interval(self.receipt_poll_interval)
            .await
            .map_err(|e| {
                submission_error(
                    request_id,
                    format!("failed to fetch the receipt of {tx_hash_string}: {e}"),
                )
            });
        let result = receipt.and_then(|r| receipt_to_result(request_id, tx_hash, r));
        match &result {
            Ok(submitted) => {
                tracing::info!(
                    block_number = ?submitted.block_number,
                    "Tx {} is finalized",
                    tx_link(&tx_hash_string, self.explorer.as_ref()),
                );
                tracing::event!(
                    target: probe::TARGET,
                    tracing::Level::DEBUG,
                    kind = %probe::Kind::ResponseTx,
                    %request_id,
                    finalized = true,
                    %tx_hash,
                );
            }
            Err(e) => {
                tracing::error!(
                    %e,
                    "Tx {} did not go through",
                    tx_link(&tx_hash_string, self.explorer.as_ref()),
                );
                tracing::event!(
                    target: probe::TARGET,
                    tracing::Level::DEBUG,
                    kind = %probe::Kind::ResponseTx,
                    %request_id,
                    errored = true,
                    %tx_hash,
                );
            }
        }
        result
    }
}

/// Maps the receipt of a `handleResponse` transaction to its result.
///
/// A missing receipt means the transaction was dropped, a receipt with status `0` means it
/// reverted, both are submission failures.
pub fn receipt_to_result(
    request_id: U256,
    tx_hash: H256,
    receipt: Option<TransactionReceipt>,
) -> Result<SubmissionResult, RelayError> {
    let tx_hash_string = format!("0x{tx_hash:x}");
    let Some(receipt) = receipt else {
        return Err(submission_error(
            request_id,
            format!("tx {tx_hash_string} was dropped from the mempool"),
        ));
    };
    if receipt.status == Some(U64::zero()) {
        return Err(submission_error(
            request_id,
            format!(
                "tx {tx_hash_string} reverted in block {}",
                receipt.block_number.unwrap_or_default()
            ),
        ));
    }
    Ok(SubmissionResult {
        request_id,
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        included: true,
    })
}

fn submission_error(request_id: U256, reason: String) -> RelayError {
    RelayError::Submission { request_id, reason }
}

#[cfg(test)]
mod tests;
