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

use prometheus::core::{AtomicF64, GenericCounter};
use prometheus::{register_counter_with_registry, Encoder, Registry, TextEncoder};

/// A struct definition for collecting metrics in the relayer.
///
/// Every instance owns its registry, so more than one relayer context can live in a process.
#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Registry,
    /// `ApiRequestInitiated` events handed to the coordinator.
    pub requests_observed: GenericCounter<AtomicF64>,
    /// Outbound calls that ended in a decode or transport failure.
    pub http_requests_failed: GenericCounter<AtomicF64>,
    /// `handleResponse` transactions that were included.
    pub responses_submitted: GenericCounter<AtomicF64>,
    /// `handleResponse` transactions that failed to be sent or included.
    pub response_submissions_failed: GenericCounter<AtomicF64>,
}

impl Metrics {
    /// Instantiates the various metrics and their counters, also creates a registry for the counters and
    /// registers the counters
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_observed = register_counter_with_registry!(
            "fusion_requests_observed",
            "The total number of ApiRequestInitiated events observed",
            registry
        )?;

        let http_requests_failed = register_counter_with_registry!(
            "fusion_http_requests_failed",
            "The total number of outbound requests without a usable response",
            registry
        )?;

        let responses_submitted = register_counter_with_registry!(
            "fusion_responses_submitted",
            "The total number of handleResponse transactions included on chain",
            registry
        )?;

        let response_submissions_failed = register_counter_with_registry!(
            "fusion_response_submissions_failed",
            "The total number of handleResponse transactions that failed",
            registry
        )?;

        Ok(Self {
            registry,
            requests_observed,
            http_requests_failed,
            responses_submitted,
            response_submissions_failed,
        })
    }

    /// Gathers the whole relayer metrics in the prometheus text format.
    pub fn gather_metrics(&self) -> Result<String, GatherMetricsError> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }
}

/// Errors while rendering the gathered metrics.
#[derive(Debug, thiserror::Error)]
pub enum GatherMetricsError {
    /// Encoding failed.
    #[error(transparent)]
    PrometheusError(#[from] prometheus::Error),
    /// The encoder produced invalid UTF-8.
    #[error(transparent)]
    FromUtf8Error(#[from] std::string::FromUtf8Error),
}
