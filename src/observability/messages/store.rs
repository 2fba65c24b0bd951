// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for protocol store synchronization and persistence events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A protocol store finished synchronizing and is queryable.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_lightbox::observability::messages::store::StoreReady;
/// use the_lightbox::observability::messages::StructuredLog;
///
/// let msg = StoreReady {
///     backend: "memory",
///     protocol_count: 3,
/// };
///
/// msg.log();
/// ```
pub struct StoreReady<'a> {
    pub backend: &'a str,
    pub protocol_count: usize,
}

impl Display for StoreReady<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Protocol store ready: backend={}, {} protocols",
            self.backend, self.protocol_count
        )
    }
}

impl StructuredLog for StoreReady<'_> {
    fn log(&self) {
        tracing::info!(
            backend = self.backend,
            protocol_count = self.protocol_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "store_ready",
            name = name,
            backend = self.backend,
            protocol_count = self.protocol_count,
        )
    }
}

/// A store synchronization attempt failed; cached protocols remain in use.
///
/// # Log Level
/// `warn!` - Degraded but recoverable condition
pub struct StoreSyncFailed<'a> {
    pub backend: &'a str,
    pub cached_protocols: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for StoreSyncFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Protocol store sync failed for backend {}; continuing with {} cached protocols: {}",
            self.backend, self.cached_protocols, self.error
        )
    }
}

impl StructuredLog for StoreSyncFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            backend = self.backend,
            cached_protocols = self.cached_protocols,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "store_sync_failed",
            name = name,
            backend = self.backend,
            cached_protocols = self.cached_protocols,
        )
    }
}

/// A user-authored protocol was persisted.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProtocolPersisted<'a> {
    pub protocol_id: &'a str,
    pub backend: &'a str,
}

impl Display for ProtocolPersisted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Persisted protocol '{}' via {} backend",
            self.protocol_id, self.backend
        )
    }
}

impl StructuredLog for ProtocolPersisted<'_> {
    fn log(&self) {
        tracing::info!(
            protocol_id = self.protocol_id,
            backend = self.backend,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "protocol_persisted",
            name = name,
            protocol_id = self.protocol_id,
            backend = self.backend,
        )
    }
}

/// A protocol was removed from the library.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProtocolRemoved<'a> {
    pub protocol_id: &'a str,
    pub backend: &'a str,
}

impl Display for ProtocolRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Removed protocol '{}' via {} backend",
            self.protocol_id, self.backend
        )
    }
}

impl StructuredLog for ProtocolRemoved<'_> {
    fn log(&self) {
        tracing::info!(
            protocol_id = self.protocol_id,
            backend = self.backend,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "protocol_removed",
            name = name,
            protocol_id = self.protocol_id,
            backend = self.backend,
        )
    }
}
