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

use ethers::types::Address;
use fusion_relayer_types::{private_key::PrivateKey, rpc_url::RpcUrl};
use serde::{Deserialize, Serialize};

use crate::event_watcher::EventsWatcherConfig;

/// EvmChainConfig is the configuration for the EVM based network.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EvmChainConfig {
    /// Http(s) Endpoint of the JSON-RPC node.
    #[serde(skip_serializing)]
    pub http_endpoint: RpcUrl,
    /// Block Explorer for this chain.
    ///
    /// Optional, and only used for printing a clickable links
    /// for transactions and contracts.
    #[serde(skip_serializing)]
    pub explorer: Option<url::Url>,
    /// Expected chain id, checked against `eth_chainId` on startup when set.
    #[serde(rename(serialize = "chainId"))]
    pub chain_id: Option<u64>,
    /// The Private Key of the account that submits responses.
    /// the format is more dynamic here:
    /// 1. if it starts with '0x' then this would be raw (32 bytes) hex encoded
    ///    private key.
    ///    Example: 0x8917174396171783496173419137618235192359106130478137647163400318
    ///
    /// 2. if it starts with '$' then it would be considered as an Enviroment variable
    ///    of a hex-encoded private key.
    ///   Example: $FUSION_PRIVATE_KEY
    #[serde(skip_serializing)]
    pub private_key: Option<PrivateKey>,
}

/// LinkerContractConfig describes the FusionLinker deployment to watch.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinkerContractConfig {
    /// The address of the contract.
    pub address: Address,
    /// The block to start scanning from, defaults to the chain head at startup.
    #[serde(rename(serialize = "startBlock"))]
    pub start_block: Option<u64>,
    /// Controls the events watcher
    #[serde(default, rename(serialize = "eventsWatcher"))]
    pub events_watcher: EventsWatcherConfig,
}
