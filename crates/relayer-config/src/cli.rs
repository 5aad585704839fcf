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

use crate::FusionRelayerConfig;
use anyhow::Context;
use directories_next::ProjectDirs;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

/// Package identifier, where the default configuration is defined.
/// If the user does not start the relayer with the `--config-dir`
/// it will default to read from the default location depending on the OS.
pub const PACKAGE_ID: [&str; 3] = ["tools", "fusion", "fusion-relayer"];

/// The Fusion Relayer Command-line tool
///
/// Start the relayer from a config directory:
///
/// $ fusion-relayer -vvv -c <CONFIG_DIR_PATH>
///
/// or only from the environment:
///
/// $ RPC_URL=.. PRIVATE_KEY=.. FUSION_LINKER_ADDRESS=.. fusion-relayer
#[derive(StructOpt)]
#[structopt(name = "Fusion Relayer")]
pub struct Opts {
    /// A level of verbosity, and can be used multiple times
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: i32,
    /// Directory that contains configration files.
    #[structopt(
        short = "c",
        long = "config-dir",
        value_name = "PATH",
        parse(from_os_str)
    )]
    pub config_dir: Option<PathBuf>,
}

/// Loads the configuration from the given directory.
///
/// An explicit `config_dir` must exist. The default directory is optional, when it is
/// missing the whole configuration is taken from the environment.
pub fn load_config<P>(
    config_dir: Option<P>,
) -> Result<FusionRelayerConfig, anyhow::Error>
where
    P: AsRef<Path>,
{
    let path = match config_dir {
        Some(p) => {
            let path = p.as_ref().to_path_buf();
            // return an error if the path is not a directory.
            if !path.is_dir() {
                return Err(anyhow::anyhow!(
                    "{} is not a directory",
                    path.display()
                ));
            }
            Some(path)
        }
        None => {
            tracing::debug!("Getting default dirs for fusion relayer");
            let dirs = ProjectDirs::from(
                PACKAGE_ID[0],
                PACKAGE_ID[1],
                PACKAGE_ID[2],
            )
            .context("failed to get config")?;
            let path = dirs.config_dir().to_path_buf();
            path.is_dir().then_some(path)
        }
    };
    let v = match path {
        Some(path) => {
            tracing::trace!("Loading Config from {} ..", path.display());
            crate::utils::load(path)?
        }
        None => {
            tracing::trace!("No config directory, loading Config from env ..");
            crate::utils::parse_from_files(&[])?
        }
    };
    tracing::trace!("Config loaded..");
    Ok(v)
}

/// Targets of the workspace crates that log on their own, besides the binary.
pub const RELAYER_LOG_TARGETS: [&str; 5] = [
    "fusion_event_watcher_traits",
    "fusion_ew_evm",
    "fusion_request_executor",
    "fusion_tx_relay",
    fusion_relayer_utils::probe::TARGET,
];

/// Sets up the logger for the relayer, based on the verbosity level passed in.
///
/// # Arguments
///
/// * `verbosity` - An i32 integer representing the verbosity level.
/// * `filter` - The target (crate name) the verbosity applies to.
pub fn setup_logger(verbosity: i32, filter: &str) -> anyhow::Result<()> {
    let log_level = log_level(verbosity);
    let env_filter = with_relayer_directives(
        tracing_subscriber::EnvFilter::from_default_env(),
        filter,
        log_level,
    )?;
    let logger = tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(log_level)
        .with_env_filter(env_filter);
    // if we are not compiling for integration tests, we should use pretty logs
    #[cfg(not(feature = "integration-tests"))]
    let logger = logger.pretty();
    // otherwise, we should use json, which is easy to parse.
    #[cfg(feature = "integration-tests")]
    let logger = logger.json().flatten_event(true).with_current_span(false);

    logger.init();
    Ok(())
}

fn log_level(verbosity: i32) -> tracing::Level {
    use tracing::Level;
    match verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Enables `level` for `filter` and every target in [`RELAYER_LOG_TARGETS`].
fn with_relayer_directives(
    mut env_filter: tracing_subscriber::EnvFilter,
    filter: &str,
    level: tracing::Level,
) -> anyhow::Result<tracing_subscriber::EnvFilter> {
    let targets = std::iter::once(filter).chain(RELAYER_LOG_TARGETS);
    for target in targets {
        env_filter = env_filter.add_directive(format!("{target}={level}").parse()?);
    }
    Ok(env_filter)
}
