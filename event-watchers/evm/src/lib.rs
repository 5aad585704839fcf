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

use std::marker::PhantomData;
use std::ops;
use std::sync::Arc;
use std::time::Duration;

use ethers::contract::Contract;
use ethers::prelude::Middleware;
use ethers::types;

use fusion_event_watcher_traits::evm::{EventWatcher, WatchableContract};
use fusion_relayer_config::evm::LinkerContractConfig;
use fusion_relayer_types::linker::{
    ApiRequestInitiatedFilter, FusionLinkerContract,
};

/// A module for relaying the requests of the FusionLinker contract.
pub mod linker;

pub use linker::RelayCoordinator;


/// FusionLinkerContractWrapper contains the FusionLinker contract along with its configuration.
#[derive(Clone, Debug)]
pub struct FusionLinkerContractWrapper<M>
where
    M: Middleware,
{
    pub config: LinkerContractConfig,
    pub contract: FusionLinkerContract<M>,
}

impl<M> FusionLinkerContractWrapper<M>
where
    M: Middleware,
{
    /// Creates a new FusionLinkerContractWrapper.
    pub fn new(config: LinkerContractConfig, client: Arc<M>) -> Self {
        Self {
            contract: FusionLinkerContract::new(config.address, client),
            config,
        }
    }
}

impl<M> ops::Deref for FusionLinkerContractWrapper<M>
where
    M: Middleware,
{
    type Target = Contract<M>;

    fn deref(&self) -> &Self::Target {
        &self.contract
    }
}

impl<M> WatchableContract for FusionLinkerContractWrapper<M>
where
    M: Middleware,
{
    fn start_block(&self) -> Option<types::U64> {
        self.config.start_block.map(Into::into)
    }

    fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.config.events_watcher.polling_interval)
    }

    fn max_blocks_per_step(&self) -> types::U64 {
        self.config.events_watcher.max_blocks_per_step.into()
    }

    fn print_progress_interval(&self) -> Duration {
        Duration::from_millis(
            self.config.events_watcher.print_progress_interval,
        )
    }

    fn max_rpc_retries(&self) -> usize {
        self.config.events_watcher.max_rpc_retries
    }
}

/// A FusionLinker Contract Watcher that watches for `ApiRequestInitiated` events.
#[derive(Debug)]
pub struct FusionLinkerContractWatcher<M>(PhantomData<M>);

impl<M> Default for FusionLinkerContractWatcher<M> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[async_trait::async_trait]
impl<M> EventWatcher for FusionLinkerContractWatcher<M>
where
    M: Middleware + 'static,
{
    const TAG: &'static str = "FusionLinker Contract Watcher";

    type Middleware = M;

    type Contract = FusionLinkerContractWrapper<M>;

    type Events = ApiRequestInitiatedFilter;
}
