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

use std::sync::Arc;

use ethers::prelude::LogMeta;
use fusion_event_watcher_traits::EventHandler;
use fusion_relayer_types::linker::ApiRequestInitiatedFilter;
use fusion_relayer_types::{HttpOutcome, RequestEvent, SubmissionResult};
use fusion_relayer_utils::metric::Metrics;
use fusion_relayer_utils::{probe, RelayError};
use fusion_request_executor::RequestExecutor;
use fusion_tx_relay::ResponseSubmitter;

/// Relays requests of the FusionLinker contract. Each [`RelayCoordinator::relay`] call handles a
/// single request: one outbound call, then one `handleResponse`.
///
/// Nothing is shared between two requests besides the executor and the submitter, so one
/// coordinator serves every in-flight request concurrently.
#[derive(typed_builder::TypedBuilder)]
pub struct RelayCoordinator<E, S> {
    pub(crate) executor: E,
    pub(crate) submitter: S,
    #[builder(setter(into))]
    pub(crate) metrics: Arc<Metrics>,
}

impl<E, S> RelayCoordinator<E, S>
where
    E: RequestExecutor,
    S: ResponseSubmitter,
{
    /// Runs the outbound call of `event` and records its outcome on-chain.
    ///
    /// Failed calls still produce a response, only a failed submission is an error, and it
    /// is never retried.
    #[tracing::instrument(skip_all, fields(request_id = %event.request_id))]
    pub async fn relay(
        &self,
        event: &RequestEvent,
    ) -> Result<SubmissionResult, RelayError> {
        self.metrics.requests_observed.inc();
        tracing::info!(
            initiator = ?event.initiator,
            url = %event.url,
            body = %String::from_utf8_lossy(&event.body),
            block_number = ?event.block_number,
            tx_hash = ?event.transaction_hash,
            "Received API request",
        );
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::RequestObserved,
            request_id = %event.request_id,
            method = if event.has_body() { "POST" } else { "GET" },
        );

        let outcome = self
            .executor
            .try_execute(&event.url, &event.body)
            .await
            .unwrap_or_else(|e| {
                self.metrics.http_requests_failed.inc();
                tracing::warn!(
                    kind = e.kind(),
                    %e,
                    "Request failed, recording an error response"
                );
                HttpOutcome::from(e)
            });
        tracing::info!(
            status = outcome.status_code,
            payload = %outcome.payload,
            "Submitting response",
        );

        let submitted = self
            .submitter
            .submit(event.request_id, outcome.status_code, &outcome.payload)
            .await;
        match &submitted {
            Ok(result) => {
                self.metrics.responses_submitted.inc();
                tracing::info!(
                    tx_hash = ?result.tx_hash,
                    block_number = ?result.block_number,
                    "Response submitted",
                );
            }
            Err(_) => self.metrics.response_submissions_failed.inc(),
        }
        submitted
    }
}

#[async_trait::async_trait]
impl<E, S> EventHandler for RelayCoordinator<E, S>
where
    E: RequestExecutor,
    S: ResponseSubmitter,
{
    type Event = (ApiRequestInitiatedFilter, LogMeta);

    async fn handle_event(
        &self,
        event: Self::Event,
    ) -> fusion_relayer_utils::Result<()> {
        let event = RequestEvent::from(event);
        self.relay(&event).await?;
        Ok(())
    }
}
