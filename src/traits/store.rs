// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::protocol::Protocol;

/// Persistence abstraction for the protocol library.
///
/// Two interchangeable backends exist: a local in-memory store that is
/// ready immediately and seeds defaults on first use, and a server-synced
/// store that becomes ready once its transport has been queried. Reads are
/// synchronous snapshots of the in-memory cache so a matching pass never
/// blocks mid-scoring; `ready` is the single awaitable gate.
#[async_trait]
pub trait ProtocolStore: Send + Sync {
    /// Resolves once the store is queryable. A server-synced store may
    /// degrade to its cached library on transport failure; it only errors
    /// when it has nothing cached at all.
    async fn ready(&self) -> Result<(), StoreError>;

    /// Snapshot of a single protocol by id.
    fn get_protocol(&self, id: &str) -> Option<Protocol>;

    /// Snapshot of the whole library, in registration order.
    fn all_protocols(&self) -> Vec<Protocol>;

    /// Persist a newly authored protocol.
    async fn add_protocol(&self, protocol: Protocol) -> Result<(), StoreError>;

    /// Persist an edit to an existing, unlocked protocol.
    async fn update_protocol(&self, protocol: Protocol) -> Result<(), StoreError>;

    /// Remove an existing, unlocked protocol.
    async fn remove_protocol(&self, id: &str) -> Result<(), StoreError>;
}

/// Wire access used by the server-synced store. The actual transport
/// (REST, database) lives outside this crate; tests use the stub
/// transports in `backends::stub`.
#[async_trait]
pub trait ProtocolTransport: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Protocol>, StoreError>;
    async fn persist(&self, protocol: &Protocol) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
