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
//! # Relayer Events Watcher Module 🕸️
//!
//! A module that listens for events on a given chain.
//!
//! ## Overview
//!
//! Event watcher traits handle the syncing and listening of events for a given network.
//! The run implementation of an event watcher polls for blocks and pushes every decoded
//! event, in chain order, into a channel. On the other side of the channel
//! [`dispatch_events`] hands each event to an [`EventHandler`] in its own task, so a slow
//! event never holds back the ones behind it.

/// EVM event watching.
pub mod evm;
pub use evm::{EventWatcher as EVMEventWatcher, WatchableContract};

mod dispatcher;
pub use dispatcher::{dispatch_events, EventHandler};
