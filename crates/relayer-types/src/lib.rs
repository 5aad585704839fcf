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
//! # Fusion Relayer Types 🕸️
//!
//! Types shared between the relayer crates.

use std::sync::Arc;

use ethers::middleware::{NonceManagerMiddleware, SignerMiddleware};
use ethers::providers::{self, Http, RetryClient};
use ethers::signers::LocalWallet;

/// FusionLinker contract bindings.
pub mod linker;
/// Config wrapper for the signing key of the relaying account.
pub mod private_key;
/// The request / outcome / submission data model of the relay loop.
pub mod request;
/// Config wrapper for RPC endpoints.
pub mod rpc_url;

pub use request::{HttpOutcome, RequestEvent, SubmissionResult};

/// Ethereum client using Ethers, that includes a retry strategy.
pub type EthersClient = providers::Provider<RetryClient<Http>>;

/// The signing client shared by every in-flight response submission.
///
/// The nonce manager hands out nonces locally, so concurrent submissions from the same
/// account never race on `eth_getTransactionCount`.
pub type EthersSignerClient =
    NonceManagerMiddleware<SignerMiddleware<Arc<EthersClient>, LocalWallet>>;
