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

/// The default port the relayer will listen on. Defaults to 9955.
pub const fn relayer_port() -> u16 {
    9955
}
/// The polling interval is set to `4_000` milliseconds by default.
pub const fn polling_interval() -> u64 {
    4_000
}
/// The maximum blocks per step is set to `100` by default.
pub const fn max_blocks_per_step() -> u64 {
    100
}
/// The print progress interval is set to `7_000` by default.
pub const fn print_progress_interval() -> u64 {
    7_000
}
/// Transient RPC failures are retried `5` times by default.
pub const fn max_rpc_retries() -> usize {
    5
}
/// Outbound requests time out after `30_000` milliseconds by default.
pub const fn http_timeout() -> u64 {
    30_000
}
/// The default `User-Agent` of outbound requests.
pub fn user_agent() -> String {
    format!("fusion-relayer/{}", env!("CARGO_PKG_VERSION"))
}
/// A single confirmation by default.
pub const fn confirmations() -> usize {
    1
}
/// Receipts are polled every second by default.
pub const fn receipt_poll_interval() -> u64 {
    1_000
}
