// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::sync::Arc;

use crate::backends::{MemoryProtocolStore, ServerProtocolStore, StubTransport};
use crate::comparators::ComparatorRegistry;
use crate::config::validation::validate_protocol_library;
use crate::config::{Config, StoreBackend};
use crate::engine::ProtocolEngine;
use crate::protocol::Protocol;
use crate::traits::ProtocolStore;

/// Matching runtime builder - orchestrates store and engine creation from
/// configuration.
///
/// The `RuntimeBuilder` provides a clean interface for creating a complete
/// matching runtime from configuration. It coordinates the creation of the
/// protocol store backend and the matching engine, validating any protocol
/// library loaded along the way.
///
/// # Examples
///
/// ## Building runtime from configuration
/// ```
/// use the_lightbox::config::{Config, EngineOptions, RuntimeBuilder, StoreBackend};
/// use the_lightbox::traits::ProtocolStore;
///
/// let config = Config {
///     store: StoreBackend::Memory,
///     endpoint: None,
///     protocol_library: None,
///     engine_options: EngineOptions::default(),
/// };
///
/// let (store, engine) = RuntimeBuilder::from_config(&config).unwrap();
///
/// // The memory backend seeds the default protocol
/// assert_eq!(store.all_protocols().len(), 1);
/// # let _ = engine;
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build a complete matching runtime from configuration.
    ///
    /// Creates and returns:
    /// - `Arc<dyn ProtocolStore>`: The configured protocol store backend
    /// - `ProtocolEngine`: Engine wired to that store with the builtin
    ///   comparator registry
    ///
    /// # Arguments
    /// * `cfg` - Configuration selecting the backend and protocol library
    ///
    /// # Returns
    /// A tuple of (ProtocolStore, ProtocolEngine) ready to run matching passes
    pub fn from_config(cfg: &Config) -> Result<(Arc<dyn ProtocolStore>, ProtocolEngine), String> {
        let registry = ComparatorRegistry::builtin();

        let store: Arc<dyn ProtocolStore> = match cfg.store {
            StoreBackend::Memory => match &cfg.protocol_library {
                Some(path) => {
                    let library = load_protocol_library(path, &registry)?;
                    Arc::new(MemoryProtocolStore::with_protocols(library))
                }
                None => Arc::new(MemoryProtocolStore::new()),
            },
            StoreBackend::Server => {
                // TODO: wire an HTTP transport against cfg.endpoint once the
                // remote protocol service is deployed; the stub serves an
                // empty library until then.
                let transport = Arc::new(StubTransport::with_protocols(Vec::new()));
                Arc::new(ServerProtocolStore::new(transport))
            }
        };

        let engine = ProtocolEngine::with_registry(Arc::clone(&store), registry);
        Ok((store, engine))
    }
}

fn load_protocol_library(
    path: &str,
    registry: &ComparatorRegistry,
) -> Result<Vec<Protocol>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read protocol library '{}': {}", path, e))?;
    let library: Vec<Protocol> = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse protocol library '{}': {}", path, e))?;

    // Findings are logged, not fatal; offending rules are skipped at match time
    validate_protocol_library(&library, registry);

    Ok(library)
}
