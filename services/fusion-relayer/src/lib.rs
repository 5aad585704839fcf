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

#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # Fusion Relayer Crate 🕸️
//!
//! An off-chain relay for the FusionLinker contract.
//!
//! ## Overview
//!
//! Contracts cannot reach the outside world, so the FusionLinker contract emits an
//! `ApiRequestInitiated(requestId, initiator, url, body)` event whenever one of its users
//! needs an HTTP call. The relayer watches for these events, performs the call and writes
//! the result back with `handleResponse(requestId, statusCode, responseBody)`.
//!
//! Every request ends with exactly one response transaction, even when the call fails: a
//! malformed body or an unreachable endpoint is recorded as a `500` with an
//! `{"error": ..}` body. Requests are independent of each other and run concurrently.
//!
//! # Features
//!
//! * `integration-tests`: Logs as JSON instead of pretty printing. By default, this is disabled.

/// A module for starting long-running tasks for event watching.
pub mod service;

pub use fusion_relayer_utils::{Error, Result};
