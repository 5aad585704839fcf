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

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ethers::types::Address;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use fusion_event_watcher_traits::{dispatch_events, EVMEventWatcher};
use fusion_ew_evm::{
    FusionLinkerContractWatcher, FusionLinkerContractWrapper,
    RelayCoordinator,
};
use fusion_relayer_context::RelayerContext;
use fusion_relayer_types::linker::FusionLinkerContract;
use fusion_relayer_types::{EthersClient, EthersSignerClient};
use fusion_request_executor::HttpRequestExecutor;
use fusion_tx_relay::EvmResponseSubmitter;

/// Type alias for the coordinator wired to the real HTTP client and the signing client.
pub type LinkerRelayCoordinator =
    RelayCoordinator<HttpRequestExecutor, EvmResponseSubmitter<EthersSignerClient>>;

/// How long the in-flight requests are given to finish once the watcher stopped.
pub const DRAIN_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Capacity of the channel between the event watcher and the dispatcher.
const EVENTS_CHANNEL_CAPACITY: usize = 1024;

/// Builds the coordinator of the relay: the HTTP executor and the response submitter, sharing the
/// relayer's metrics.
pub async fn build_relay_coordinator(
    ctx: &RelayerContext,
) -> crate::Result<LinkerRelayCoordinator> {
    let signer = ctx.signer_client().await?;
    let tx_config = &ctx.config.tx;
    let submitter = EvmResponseSubmitter::builder()
        .contract(FusionLinkerContract::new(ctx.config.linker.address, signer))
        .confirmations(tx_config.confirmations)
        .receipt_poll_interval(Duration::from_millis(
            tx_config.receipt_poll_interval,
        ))
        .explorer(ctx.config.evm.explorer.clone())
        .build();
    let executor = HttpRequestExecutor::new(ctx.http_client());
    Ok(RelayCoordinator::builder()
        .executor(executor)
        .submitter(submitter)
        .metrics(ctx.metrics.clone())
        .build())
}

/// Starts the FusionLinker relay: the events watcher feeding the dispatcher, which relays every
/// request on its own task.
///
/// Returns the handle of the watcher task. It resolves with `Ok(())` after a shutdown, once the
/// requests already observed have been relayed, or with the error that stopped the watcher.
///
/// # Arguments
///
/// * `ctx` - RelayContext reference that holds the configuration
pub async fn start_linker_relay(
    ctx: &RelayerContext,
) -> crate::Result<JoinHandle<crate::Result<()>>> {
    let client = ctx.evm_provider()?;
    let coordinator = build_relay_coordinator(ctx).await?;
    let wrapper =
        FusionLinkerContractWrapper::new(ctx.config.linker.clone(), client.clone());
    let contract_address = ctx.config.linker.address;
    let shutdown_signal = ctx.shutdown_signal();
    let (sink, source) = mpsc::channel(EVENTS_CHANNEL_CAPACITY);
    let dispatcher =
        tokio::spawn(dispatch_events(Arc::new(coordinator), source));
    let watcher = async move {
        tracing::debug!(
            "FusionLinker events watcher for ({}) Started.",
            contract_address,
        );
        let contract_watcher =
            FusionLinkerContractWatcher::<EthersClient>::default();
        contract_watcher
            .run(client, wrapper, sink, shutdown_signal)
            .await
    };
    Ok(tokio::spawn(supervise(
        contract_address,
        watcher,
        dispatcher,
        DRAIN_GRACE_PERIOD,
    )))
}

/// Waits for the watcher to stop, then for the dispatcher to relay the requests it already
/// received.
///
/// After a watcher failure the dispatcher only gets `grace` to drain, then it is aborted and
/// the failure is returned.
pub(crate) async fn supervise<W>(
    contract_address: Address,
    watcher: W,
    mut dispatcher: JoinHandle<()>,
    grace: Duration,
) -> crate::Result<()>
where
    W: Future<Output = crate::Result<()>>,
{
    let result = watcher.await;
    // the sink is gone, the dispatcher finishes the in-flight requests and returns.
    let drained = match &result {
        Ok(()) => {
            tracing::trace!(
                "Stopping FusionLinker watcher for ({})",
                contract_address,
            );
            Ok((&mut dispatcher).await)
        }
        Err(e) => {
            tracing::error!(
                %e,
                "FusionLinker watcher task stopped for ({})",
                contract_address,
            );
            tokio::time::timeout(grace, &mut dispatcher).await
        }
    };
    match drained {
        Ok(Ok(())) => result,
        Ok(Err(_)) => {
            tracing::error!("Dispatcher task stopped abnormally");
            result.and(Err(crate::Error::TaskStoppedAbnormally))
        }
        Err(_) => {
            tracing::warn!(
                "In-flight requests did not finish within {:?}, dropping them",
                grace
            );
            dispatcher.abort();
            result
        }
    }
}
