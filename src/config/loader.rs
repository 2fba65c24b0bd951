// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure for the matching engine runtime.
///
/// This struct selects the protocol store backend, points at the protocol
/// library to load, and tunes engine behaviour. It is typically loaded
/// from a YAML configuration file.
///
/// # Fields
/// * `store` - Which protocol store backend to use
/// * `endpoint` - Remote endpoint for the server backend (optional)
/// * `protocol_library` - Path to a JSON protocol library for the memory backend (optional)
/// * `engine_options` - Engine-specific options (optional)
///
/// # Example
/// ```yaml
/// store: memory
/// protocol_library: "protocols.json"
/// engine_options:
///   coalesce_triggers: true
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    pub store: StoreBackend,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub protocol_library: Option<String>,
    #[serde(default)]
    pub engine_options: EngineOptions,
}

/// Protocol store backend type.
///
/// # Variants
/// * `Memory` - Local-only in-memory store, ready immediately, seeds the
///   default protocol on first use
/// * `Server` - Server-synchronized store that mirrors a remote library
///   and degrades to its cache on transport failure
#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    Server,
}

/// Engine-specific configuration options.
///
/// # Fields
/// * `coalesce_triggers` - Cancel an in-flight pass when a newer trigger
///   arrives (optional, defaults to true)
#[derive(Debug, Deserialize)]
pub struct EngineOptions {
    pub coalesce_triggers: Option<bool>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            coalesce_triggers: None,
        }
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a config from a YAML file
///
/// Beyond parsing, this checks that the selected backend has what it
/// needs: the server backend requires an endpoint.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
) -> Result<Config, Box<dyn std::error::Error>> {
    let cfg = load_config(path)?;

    if cfg.store == StoreBackend::Server && cfg.endpoint.is_none() {
        return Err("Configuration validation failed: server store backend requires an endpoint".into());
    }

    Ok(cfg)
}
