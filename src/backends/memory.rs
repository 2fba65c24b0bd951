// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Local-only protocol store.
//!
//! Ready immediately, holds everything in memory, and seeds the catch-all
//! default protocol on first use so a fresh install always has something
//! to hang.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::observability::messages::store::{ProtocolPersisted, ProtocolRemoved, StoreReady};
use crate::observability::messages::StructuredLog;
use crate::protocol::{default_protocol, Protocol};
use crate::traits::ProtocolStore;

pub struct MemoryProtocolStore {
    protocols: RwLock<Vec<Protocol>>,
}

impl MemoryProtocolStore {
    /// Create a store seeded with the default protocol.
    pub fn new() -> Self {
        Self {
            protocols: RwLock::new(vec![default_protocol()]),
        }
    }

    /// Create a store holding exactly the given library, unseeded.
    pub fn with_protocols(protocols: Vec<Protocol>) -> Self {
        Self {
            protocols: RwLock::new(protocols),
        }
    }

    pub fn len(&self) -> usize {
        self.protocols.read().expect("protocol lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryProtocolStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProtocolStore for MemoryProtocolStore {
    async fn ready(&self) -> Result<(), StoreError> {
        StoreReady {
            backend: "memory",
            protocol_count: self.len(),
        }
        .log();
        Ok(())
    }

    fn get_protocol(&self, id: &str) -> Option<Protocol> {
        self.protocols
            .read()
            .expect("protocol lock poisoned")
            .iter()
            .find(|protocol| protocol.id == id)
            .cloned()
    }

    fn all_protocols(&self) -> Vec<Protocol> {
        self.protocols.read().expect("protocol lock poisoned").clone()
    }

    async fn add_protocol(&self, protocol: Protocol) -> Result<(), StoreError> {
        let mut protocols = self.protocols.write().expect("protocol lock poisoned");
        if protocols.iter().any(|existing| existing.id == protocol.id) {
            return Err(StoreError::Duplicate(protocol.id));
        }
        ProtocolPersisted {
            protocol_id: &protocol.id,
            backend: "memory",
        }
        .log();
        protocols.push(protocol);
        Ok(())
    }

    async fn update_protocol(&self, protocol: Protocol) -> Result<(), StoreError> {
        let mut protocols = self.protocols.write().expect("protocol lock poisoned");
        let Some(index) = protocols.iter().position(|existing| existing.id == protocol.id) else {
            return Err(StoreError::NotFound(protocol.id));
        };
        if protocols[index].locked {
            return Err(StoreError::Locked(protocol.id));
        }
        ProtocolPersisted {
            protocol_id: &protocol.id,
            backend: "memory",
        }
        .log();
        protocols[index] = protocol;
        Ok(())
    }

    async fn remove_protocol(&self, id: &str) -> Result<(), StoreError> {
        let mut protocols = self.protocols.write().expect("protocol lock poisoned");
        let Some(index) = protocols.iter().position(|existing| existing.id == id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        if protocols[index].locked {
            return Err(StoreError::Locked(id.to_string()));
        }
        protocols.remove(index);
        ProtocolRemoved {
            protocol_id: id,
            backend: "memory",
        }
        .log();
        Ok(())
    }
}
