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

use config::{Config, File};
use std::path::{Path, PathBuf};

use crate::FusionRelayerConfig;

/// Environment variables that override single config keys, as `(variable, key)`.
pub const ENV_OVERRIDES: [(&str, &str); 3] = [
    ("RPC_URL", "evm.http-endpoint"),
    ("PRIVATE_KEY", "evm.private-key"),
    ("FUSION_LINKER_ADDRESS", "linker.address"),
];

/// A helper function that will search for all config files in the given directory and return them as a vec
/// of the paths.
///
/// Supported file extensions are:
/// - `.toml`.
/// - `.json`.
pub fn search_config_files<P: AsRef<Path>>(
    base_dir: P,
) -> fusion_relayer_utils::Result<Vec<PathBuf>> {
    // A pattern that covers all toml or json files in the config directory and subdirectories.
    let toml_pattern = format!("{}/**/*.toml", base_dir.as_ref().display());
    let json_pattern = format!("{}/**/*.json", base_dir.as_ref().display());
    tracing::trace!(
        "Loading config files from {} and {}",
        toml_pattern,
        json_pattern
    );
    let toml_files = glob::glob(&toml_pattern)?;
    let json_files = glob::glob(&json_pattern)?;
    toml_files
        .chain(json_files)
        .map(|v| v.map_err(fusion_relayer_utils::Error::from))
        .collect()
}

/// Reads the [`ENV_OVERRIDES`] variables from the process environment.
pub fn env_overrides() -> Vec<(&'static str, Option<String>)> {
    ENV_OVERRIDES
        .iter()
        .map(|(var, key)| (*key, std::env::var(var).ok()))
        .collect()
}

/// Try to parse the [`FusionRelayerConfig`] from the given config file(s) and the environment.
pub fn parse_from_files(
    files: &[PathBuf],
) -> fusion_relayer_utils::Result<FusionRelayerConfig> {
    parse_with_overrides(files, env_overrides())
}

/// Parse the [`FusionRelayerConfig`] from the given config file(s), then apply `overrides`
/// (a list of `(config key, value)`) on top of them.
pub fn parse_with_overrides<I>(
    files: &[PathBuf],
    overrides: I,
) -> fusion_relayer_utils::Result<FusionRelayerConfig>
where
    I: IntoIterator<Item = (&'static str, Option<String>)>,
{
    let mut builder = Config::builder();
    for config_file in files {
        tracing::trace!("Loading config file: {}", config_file.display());
        // get file extension
        let ext = config_file
            .extension()
            .map(|e| e.to_str().unwrap_or(""))
            .unwrap_or("");
        let format = match ext {
            "toml" => config::FileFormat::Toml,
            "json" => config::FileFormat::Json,
            _ => {
                tracing::warn!("Unknown file extension: {}", ext);
                continue;
            }
        };
        builder = builder
            .add_source(File::from(config_file.as_path()).format(format));
    }

    for (key, value) in overrides {
        if value.is_some() {
            tracing::trace!("Overriding {} from the environment", key);
        }
        builder = builder.set_override_option(key, value)?;
    }
    let cfg = builder.build()?;
    // and finally deserialize the config and post-process it
    let config: Result<
        FusionRelayerConfig,
        serde_path_to_error::Error<config::ConfigError>,
    > = serde_path_to_error::deserialize(cfg);
    match config {
        Ok(c) => postloading_process(c),
        Err(e) => {
            tracing::error!("{}", e);
            Err(e.into())
        }
    }
}

/// Load the configuration files and
///
/// Returns `Ok(FusionRelayerConfig)` on success, or `Err(Error)` on failure.
///
/// # Arguments
///
/// * `path` - The path to the configuration directory
///
/// # Example
///
/// ```no_run
/// use fusion_relayer_config::utils::load;
///
/// let path = "/path/to/config";
/// let _ = load(path);
/// ```
///
/// it is the same as using the [`search_config_files`] and [`parse_from_files`] functions combined.
pub fn load<P: AsRef<Path>>(
    path: P,
) -> fusion_relayer_utils::Result<FusionRelayerConfig> {
    parse_from_files(&search_config_files(path)?)
}

/// The postloading_process exists to validate configuration and standardize
/// the format of the configuration
pub fn postloading_process(
    mut config: FusionRelayerConfig,
) -> fusion_relayer_utils::Result<FusionRelayerConfig> {
    tracing::trace!("Checking configration sanity ...");
    config.verify()?;

    let watcher = &mut config.linker.events_watcher;
    if watcher.max_blocks_per_step == 0 {
        tracing::warn!(
            "!!WARNING!!: max-blocks-per-step of the events watcher is 0, using 1 instead"
        );
        watcher.max_blocks_per_step = 1;
    }
    if watcher.polling_interval == 0 {
        tracing::warn!(
            "!!WARNING!!: polling-interval of the events watcher is 0, the node will be polled without pause"
        );
    }
    if config.tx.confirmations == 0 {
        tracing::warn!(
            "!!WARNING!!: tx.confirmations is 0, waiting for 1 confirmation instead"
        );
        config.tx.confirmations = 1;
    }

    tracing::trace!(
        "postloaded config: {}",
        serde_json::to_string_pretty(&config)?
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY: &str =
        "0x000000000000000000000000000000000000000000000000000000000000beef";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "main.toml",
            &format!(
                r#"
                [evm]
                http-endpoint = "http://localhost:8545"
                private-key = "{KEY}"

                [linker]
                address = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
                "#
            ),
        );
        let files = search_config_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        let config = parse_with_overrides(&files, vec![]).unwrap();
        assert_eq!(config.port, 9955);
        assert_eq!(config.evm.http_endpoint.as_str(), "http://localhost:8545/");
        assert_eq!(config.linker.start_block, None);
        assert_eq!(config.linker.events_watcher.max_blocks_per_step, 100);
        assert_eq!(config.linker.events_watcher.max_rpc_retries, 5);
        assert_eq!(config.http.timeout, 30_000);
        assert_eq!(config.tx.confirmations, 1);
    }

    #[test]
    fn overrides_take_precedence_over_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "main.json",
            r#"{
                "evm": { "http-endpoint": "http://localhost:8545" },
                "linker": {
                    "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                    "start-block": 12,
                    "events-watcher": { "max-blocks-per-step": 0 }
                },
                "http": { "timeout": 0 }
            }"#,
        );
        let files = search_config_files(dir.path()).unwrap();
        let config = parse_with_overrides(
            &files,
            vec![
                ("evm.http-endpoint", Some("http://10.0.0.1:8545".to_string())),
                ("evm.private-key", Some(KEY.to_string())),
                ("linker.address", None),
            ],
        )
        .unwrap();
        assert_eq!(config.evm.http_endpoint.as_str(), "http://10.0.0.1:8545/");
        assert!(config.evm.private_key.is_some());
        assert_eq!(config.linker.start_block, Some(12));
        assert_eq!(config.linker.events_watcher.max_blocks_per_step, 1);
        assert_eq!(config.http.timeout(), None);
    }

    #[test]
    fn missing_private_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "main.toml",
            r#"
            [evm]
            http-endpoint = "http://localhost:8545"

            [linker]
            address = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
            "#,
        );
        let files = search_config_files(dir.path()).unwrap();
        let err = parse_with_overrides(&files, vec![]).unwrap_err();
        assert!(matches!(err, fusion_relayer_utils::Error::MissingSecrets));
    }

    #[test]
    fn config_can_come_from_overrides_only() {
        let config = parse_with_overrides(
            &[],
            vec![
                ("evm.http-endpoint", Some("http://localhost:8545".to_string())),
                ("evm.private-key", Some(KEY.to_string())),
                (
                    "linker.address",
                    Some("0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string()),
                ),
            ],
        )
        .unwrap();
        assert_eq!(
            format!("{:?}", config.linker.address),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
    }

    #[test]
    fn missing_contract_address_names_the_field() {
        let err = parse_with_overrides(
            &[],
            vec![
                ("evm.http-endpoint", Some("http://localhost:8545".to_string())),
                ("evm.private-key", Some(KEY.to_string())),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("linker"), "{err}");
    }
}
