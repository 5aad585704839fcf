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

//! Fusion Relayer Binary.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use tokio::signal::unix;

use fusion_relayer::service::evm::DRAIN_GRACE_PERIOD;
use fusion_relayer::service::{build_web_services, ignite};
use fusion_relayer_config::cli::{load_config, setup_logger, Opts};
use fusion_relayer_context::RelayerContext;
use fusion_relayer_utils::probe;

/// The main entry point for the relayer.
///
/// # Arguments
///
/// * `args` - The command line arguments.
#[paw::main]
#[tokio::main]
async fn main(args: Opts) -> anyhow::Result<()> {
    setup_logger(args.verbose, "fusion_relayer")?;
    match dotenv::dotenv() {
        Ok(_) => {
            tracing::trace!("Loaded .env file");
        }
        Err(e) => {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }

    // The configuration is validated and configured from the given directory
    let config = load_config(args.config_dir.clone())?;

    // The RelayerContext takes a configuration, and populates objects that are needed
    // throughout the lifetime of the relayer, like the metrics and the HTTP client.
    let ctx = RelayerContext::new(config)?;

    let server_handle = tokio::spawn(build_web_services(ctx.clone()));
    // start the relay pipeline.
    // this does not block, the watcher and the dispatcher run on background tasks.
    let mut relay_handle = ignite(&ctx).await?;
    tracing::event!(
        target: probe::TARGET,
        tracing::Level::DEBUG,
        kind = %probe::Kind::Lifecycle,
        started = true
    );
    // watch for signals
    let mut ctrlc_signal = unix::signal(unix::SignalKind::interrupt())?;
    let mut termination_signal = unix::signal(unix::SignalKind::terminate())?;
    let mut quit_signal = unix::signal(unix::SignalKind::quit())?;
    let shutdown = || {
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Lifecycle,
            shutdown = true
        );
        tracing::warn!("Shutting down...");
        // send shutdown signal to all of the application.
        ctx.shutdown();
        // also abort the server task
        server_handle.abort();
    };
    let outcome = tokio::select! {
        _ = ctrlc_signal.recv() => {
            tracing::warn!("Interrupted (Ctrl+C) ...");
            shutdown();
            None
        },
        _ = termination_signal.recv() => {
            tracing::warn!("Got Terminate signal ...");
            shutdown();
            None
        },
        _ = quit_signal.recv() => {
            tracing::warn!("Quitting ...");
            shutdown();
            None
        },
        res = &mut relay_handle => {
            shutdown();
            Some(res)
        },
    };
    let outcome = match outcome {
        Some(res) => res,
        None => {
            match tokio::time::timeout(DRAIN_GRACE_PERIOD, relay_handle).await {
                Ok(res) => res,
                Err(_) => {
                    tracing::warn!(
                        "In-flight requests did not finish within {:?}",
                        DRAIN_GRACE_PERIOD
                    );
                    Ok(Ok(()))
                }
            }
        }
    };
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("Clean Exit ..");
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!(%e, "Relayer stopped");
            Err(e.into())
        }
        Err(e) => {
            tracing::error!(%e, "Relay task panicked");
            Err(fusion_relayer_utils::Error::TaskStoppedAbnormally.into())
        }
    }
}
