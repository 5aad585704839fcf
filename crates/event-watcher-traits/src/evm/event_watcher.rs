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

use super::*;

/// A watchable contract is a contract used in the [EventWatcher]
pub trait WatchableContract: Send + Sync {
    /// The first block to scan, `None` means only blocks mined after startup.
    fn start_block(&self) -> Option<types::U64>;

    /// How often this contract should be polled for events.
    fn polling_interval(&self) -> Duration;

    /// How many blocks to scan at one request.
    fn max_blocks_per_step(&self) -> types::U64;

    /// The frequency of printing the sync progress.
    fn print_progress_interval(&self) -> Duration;

    /// How many times a failing RPC call is retried before the watcher stops.
    fn max_rpc_retries(&self) -> usize;

    /// The pause between two attempts of a failing RPC call.
    fn rpc_retry_interval(&self) -> Duration {
        Duration::from_secs(1)
    }
}

/// The inclusive block range of the next step, starting at `next`.
///
/// Returns `None` once `next` is past `head`, meaning the watcher has caught up.
pub fn next_block_range(next: u64, head: u64, step: u64) -> Option<(u64, u64)> {
    if next > head {
        return None;
    }
    let to = next.saturating_add(step.max(1) - 1).min(head);
    Some((next, to))
}

/// Runs `op` until it succeeds, at most `1 + max_retries` times.
async fn with_rpc_retry<T, E, F, Fut>(
    max_retries: usize,
    interval: Duration,
    call: &'static str,
    mut op: F,
) -> fusion_relayer_utils::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let backoff = retry::ConstantWithMaxRetryCount::new(interval, max_retries);
    backoff::future::retry_notify(
        backoff,
        || {
            op().map_err(|e| {
                backoff::Error::transient(
                    fusion_relayer_utils::Error::Middleware(e.to_string()),
                )
            })
        },
        |e: fusion_relayer_utils::Error, after: Duration| {
            tracing::warn!(%e, ?after, "{call} failed, retrying");
            tracing::event!(
                target: fusion_relayer_utils::probe::TARGET,
                tracing::Level::DEBUG,
                kind = %fusion_relayer_utils::probe::Kind::Retry,
                call,
                error = %e,
            );
        },
    )
    .await
}

/// A trait for watching events from a watchable contract.
/// EventWatcher trait exists for deployments that are smart-contract / EVM based
#[async_trait::async_trait]
pub trait EventWatcher: Send + Sync {
    /// A Helper tag used to identify the event watcher during the logs.
    const TAG: &'static str;
    /// The client the contract is bound to.
    type Middleware: Middleware + 'static;
    /// The contract that this event watcher is watching.
    type Contract: Deref<Target = contract::Contract<Self::Middleware>>
        + WatchableContract;
    /// The Event that this event watcher is interested in.
    type Events: contract::EthEvent + Clone + Send + Sync + 'static;

    /// Scans the chain for `Self::Events` and sends each of them, with its log metadata,
    /// into `sink` in chain order.
    ///
    /// Returns `Ok(())` when `sink` is closed or `shutdown` fires, and an error once an RPC
    /// call failed more than [`WatchableContract::max_rpc_retries`] times in a row.
    #[tracing::instrument(
        skip_all,
        fields(
            address = %contract.address(),
            tag = %Self::TAG,
        ),
    )]
    async fn run(
        &self,
        client: Arc<Self::Middleware>,
        contract: Self::Contract,
        sink: mpsc::Sender<(Self::Events, contract::LogMeta)>,
        mut shutdown: Shutdown,
    ) -> fusion_relayer_utils::Result<()> {
        let retries = contract.max_rpc_retries();
        let retry_interval = contract.rpc_retry_interval();
        let step = contract.max_blocks_per_step().as_u64();
        let filter = types::Filter::new()
            .topic0(<Self::Events as contract::EthEvent>::signature());

        let mut target_block_number =
            with_rpc_retry(retries, retry_interval, "eth_blockNumber", || {
                client.get_block_number()
            })
            .await?
            .as_u64();
        let mut next_block = match contract.start_block() {
            Some(block) => block.as_u64(),
            None => target_block_number.saturating_add(1),
        };
        tracing::info!(
            from_block = next_block,
            target_block = target_block_number,
            "Watching for events"
        );
        // saves the last time we printed sync progress.
        let mut instant = std::time::Instant::now();

        loop {
            match next_block_range(next_block, target_block_number, step) {
                Some((from, to)) => {
                    let mut found_events = with_rpc_retry(
                        retries,
                        retry_interval,
                        "eth_getLogs",
                        || {
                            let events = contract
                                .event_with_filter::<Self::Events>(
                                    filter.clone(),
                                )
                                .from_block(from)
                                .to_block(to);
                            async move { events.query_with_meta().await }
                        },
                    )
                    .await?;
                    found_events.sort_by_key(|(_, log)| {
                        (log.block_number, log.log_index)
                    });
                    tracing::trace!(
                        from,
                        to,
                        "Found #{} events",
                        found_events.len()
                    );
                    for (event, log) in found_events {
                        if sink.send((event, log)).await.is_err() {
                            tracing::info!(
                                "Event receiver dropped, stopping the watcher"
                            );
                            return Ok(());
                        }
                    }
                    next_block = to + 1;
                }
                None => {
                    let duration = contract.polling_interval();
                    tracing::trace!(
                        "Cooldown a bit for {}ms",
                        duration.as_millis()
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(duration) => {}
                        _ = shutdown.recv() => {
                            tracing::info!("Shutdown signal received, stopping the watcher");
                            return Ok(());
                        }
                    }
                    // update the latest block number
                    target_block_number = with_rpc_retry(
                        retries,
                        retry_interval,
                        "eth_blockNumber",
                        || client.get_block_number(),
                    )
                    .await?
                    .as_u64();
                }
            }

            if contract.print_progress_interval() != Duration::from_millis(0)
                && instant.elapsed() > contract.print_progress_interval()
            {
                let currently_at = next_block.saturating_sub(1);
                let progress = if target_block_number == 0 {
                    100.0
                } else {
                    currently_at as f64 / target_block_number as f64 * 100.0
                };
                let is_syncing = progress < 99.99;
                tracing::info!(
                    target_block = target_block_number,
                    currently_at,
                    is_syncing,
                    progress,
                );
                tracing::event!(
                    target: fusion_relayer_utils::probe::TARGET,
                    tracing::Level::TRACE,
                    kind = %fusion_relayer_utils::probe::Kind::Sync,
                    currently_at,
                    target_block = target_block_number,
                );
                instant = std::time::Instant::now();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_capped_by_step_and_head() {
        assert_eq!(next_block_range(1, 250, 100), Some((1, 100)));
        assert_eq!(next_block_range(101, 250, 100), Some((101, 200)));
        assert_eq!(next_block_range(201, 250, 100), Some((201, 250)));
        assert_eq!(next_block_range(251, 250, 100), None);
    }

    #[test]
    fn single_block_steps() {
        assert_eq!(next_block_range(7, 7, 1), Some((7, 7)));
        // a zero step still makes progress.
        assert_eq!(next_block_range(7, 9, 0), Some((7, 7)));
        assert_eq!(next_block_range(u64::MAX, u64::MAX, 100), Some((u64::MAX, u64::MAX)));
    }

    #[tokio::test]
    async fn rpc_calls_give_up_after_max_retries() {
        let mut attempts = 0;
        let result: fusion_relayer_utils::Result<()> =
            with_rpc_retry(2, Duration::from_millis(1), "eth_test", || {
                attempts += 1;
                future::ready(Err::<(), _>("node unavailable"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn rpc_calls_recover_from_transient_failures() {
        let mut attempts = 0;
        let result = with_rpc_retry(3, Duration::from_millis(1), "eth_test", || {
            attempts += 1;
            future::ready(if attempts < 3 { Err("timeout") } else { Ok(attempts) })
        })
        .await
        .unwrap();
        assert_eq!(result, 3);
    }
}
