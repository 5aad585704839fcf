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

//! # Relayer Configuration Module 🕸️
//!
//! A module for configuring the relayer.
//!
//! ## Overview
//!
//! The configuration is read from every `.toml` and `.json` file found under the config
//! directory, then the `RPC_URL`, `PRIVATE_KEY` and `FUSION_LINKER_ADDRESS` environment
//! variables are applied on top.
//! Possible configuration include:
//! * `port`: The port the metrics endpoint will listen on. Defaults to 9955
//! * `evm`: The chain the relayer is connected to, see [`evm::EvmChainConfig`].
//! * `linker`: The FusionLinker contract being watched, see [`evm::LinkerContractConfig`].
//! * `http`: The outbound HTTP client, see [`HttpClientConfig`].
//! * `tx`: Response submission settings, see [`TxConfig`].

/// CLI configuration
#[cfg(feature = "cli")]
pub mod cli;
/// Default values of the optional settings.
pub mod defaults;
/// Event watcher configuration
pub mod event_watcher;
/// EVM configuration
pub mod evm;
/// Utils for processing configuration
pub mod utils;

use evm::{EvmChainConfig, LinkerContractConfig};
use serde::{Deserialize, Serialize};

/// FusionRelayerConfig is the configuration for the fusion relayer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FusionRelayerConfig {
    /// Metrics Server Port number
    ///
    /// default to 9955
    #[serde(default = "defaults::relayer_port", skip_serializing)]
    pub port: u16,
    /// The EVM network the FusionLinker contract is deployed on.
    pub evm: EvmChainConfig,
    /// The FusionLinker contract.
    pub linker: LinkerContractConfig,
    /// Outbound HTTP client configuration.
    #[serde(default)]
    pub http: HttpClientConfig,
    /// Response transaction configuration.
    #[serde(default)]
    pub tx: TxConfig,
}

impl FusionRelayerConfig {
    /// Makes sure that the config is valid, by going
    /// through the whole config and doing some basic checks.
    pub fn verify(&self) -> fusion_relayer_utils::Result<()> {
        // every relayed request ends with a signed transaction.
        if self.evm.private_key.is_none() {
            return Err(fusion_relayer_utils::Error::MissingSecrets);
        }
        Ok(())
    }
}

/// HttpClientConfig is the configuration of the client used to call the requested endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpClientConfig {
    /// Request timeout in milliseconds, `0` disables it.
    ///
    /// default to 30_000
    #[serde(default = "defaults::http_timeout")]
    pub timeout: u64,
    /// The `User-Agent` header sent with every request.
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: defaults::http_timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

impl HttpClientConfig {
    /// The request timeout, if any.
    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.timeout > 0).then(|| std::time::Duration::from_millis(self.timeout))
    }
}

/// TxConfig controls how `handleResponse` transactions are awaited.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TxConfig {
    /// Number of confirmations to wait for before a response counts as submitted.
    ///
    /// default to 1
    #[serde(default = "defaults::confirmations")]
    pub confirmations: usize,
    /// How often the receipt is polled, in milliseconds.
    ///
    /// default to 1_000
    #[serde(default = "defaults::receipt_poll_interval")]
    pub receipt_poll_interval: u64,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            confirmations: defaults::confirmations(),
            receipt_poll_interval: defaults::receipt_poll_interval(),
        }
    }
}
