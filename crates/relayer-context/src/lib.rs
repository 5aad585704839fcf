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
//! # Relayer Context Module 🕸️
//!
//! A module for managing the context of the relayer.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use ethers::prelude::*;

use fusion_relayer_config::FusionRelayerConfig;
use fusion_relayer_types::{EthersClient, EthersSignerClient};
use fusion_relayer_utils::metric::Metrics;

/// Retry policy of the JSON-RPC client.
pub mod ethers_retry_policy;

use ethers_retry_policy::FusionHttpRetryPolicy;

/// RelayerContext contains Relayer's configuration and shutdown signal.
#[derive(Clone)]
pub struct RelayerContext {
    /// The configuration of the relayer.
    pub config: FusionRelayerConfig,
    /// Broadcasts a shutdown signal to all active tasks.
    ///
    /// When a task is spawned, it is passed a broadcast receiver handle.
    /// When a graceful shutdown is initiated, a `()` value is sent via
    /// the broadcast::Sender. Each active task receives it, reaches a
    /// safe terminal state, and completes.
    notify_shutdown: broadcast::Sender<()>,
    /// Represents the metrics for the relayer
    pub metrics: Arc<Metrics>,
    /// Client used to call the requested endpoints.
    http_client: reqwest::Client,
}

impl RelayerContext {
    /// Creates a new RelayerContext.
    pub fn new(
        config: FusionRelayerConfig,
    ) -> fusion_relayer_utils::Result<Self> {
        let (notify_shutdown, _) = broadcast::channel(2);
        let metrics = Arc::new(Metrics::new()?);
        let mut http_client = reqwest::Client::builder()
            .user_agent(config.http.user_agent.as_str());
        if let Some(timeout) = config.http.timeout() {
            http_client = http_client.timeout(timeout);
        }
        let http_client = http_client.build()?;
        Ok(Self {
            config,
            notify_shutdown,
            metrics,
            http_client,
        })
    }
    /// Returns a broadcast receiver handle for the shutdown signal.
    pub fn shutdown_signal(&self) -> Shutdown {
        Shutdown::new(self.notify_shutdown.subscribe())
    }
    /// Sends a shutdown signal to all subscribed tasks/connections.
    pub fn shutdown(&self) {
        let _ = self.notify_shutdown.send(());
    }
    /// Returns the HTTP client used for outbound requests.
    pub fn http_client(&self) -> reqwest::Client {
        self.http_client.clone()
    }
    /// Returns a new `EthereumProvider` for the configured chain.
    pub fn evm_provider(&self) -> fusion_relayer_utils::Result<Arc<EthersClient>> {
        let chain_config = &self.config.evm;
        let transport = Http::new(chain_config.http_endpoint.as_url().clone());
        let client = RetryClientBuilder::default()
            .timeout_retries(3)
            .rate_limit_retries(10)
            .initial_backoff(Duration::from_millis(500))
            .build(transport, FusionHttpRetryPolicy::boxed()?);
        let polling_interval =
            self.config.linker.events_watcher.polling_interval.max(5);
        let provider = Provider::new(client)
            .interval(Duration::from_millis(polling_interval));
        Ok(Arc::new(provider))
    }
    /// Sets up and returns an EVM wallet for the relayer.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The chain id transactions are signed for.
    pub fn evm_wallet(
        &self,
        chain_id: u64,
    ) -> fusion_relayer_utils::Result<LocalWallet> {
        let private_key = self
            .config
            .evm
            .private_key
            .as_ref()
            .ok_or(fusion_relayer_utils::Error::MissingSecrets)?;
        let wallet =
            LocalWallet::from_bytes(private_key.as_bytes())?.with_chain_id(chain_id);
        Ok(wallet)
    }
    /// Connects to the node and returns the signing client used to submit responses.
    ///
    /// Fails if `evm.chain-id` is set and the node reports a different one.
    pub async fn signer_client(
        &self,
    ) -> fusion_relayer_utils::Result<Arc<EthersSignerClient>> {
        let provider = self.evm_provider()?;
        let chain_id = provider.get_chainid().await?.as_u64();
        if let Some(expected) = self.config.evm.chain_id {
            if expected != chain_id {
                return Err(fusion_relayer_utils::Error::ChainIdMismatch {
                    expected,
                    found: chain_id,
                });
            }
        }
        let wallet = self.evm_wallet(chain_id)?;
        let address = wallet.address();
        tracing::debug!(%chain_id, ?address, "Signing client ready");
        let signer = SignerMiddleware::new(provider, wallet);
        Ok(Arc::new(NonceManagerMiddleware::new(signer, address)))
    }
}

/// Listens for the server shutdown signal.
///
/// Shutdown is signalled using a `broadcast::Receiver`. Only a single value is
/// ever sent. Once a value has been sent via the broadcast channel, the server
/// should shutdown.
///
/// The `Shutdown` struct listens for the signal and tracks that the signal has
/// been received. Callers may query for whether the shutdown signal has been
/// received or not.
#[derive(Debug)]
pub struct Shutdown {
    /// `true` if the shutdown signal has been received
    shutdown: bool,

    /// The receive half of the channel used to listen for shutdown.
    notify: broadcast::Receiver<()>,
}

impl Shutdown {
    /// Create a new `Shutdown` backed by the given `broadcast::Receiver`.
    pub fn new(notify: broadcast::Receiver<()>) -> Shutdown {
        Shutdown {
            shutdown: false,
            notify,
        }
    }

    /// Returns `true` if the shutdown signal has been received.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Receive the shutdown notice, waiting if necessary.
    pub async fn recv(&mut self) {
        if self.shutdown {
            return;
        }

        // Cannot receive a "lag error" as only one value is ever sent.
        let _ = self.notify.recv().await;

        self.shutdown = true;
    }
}
