// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Server-synchronized protocol store.
//!
//! Wraps a [`ProtocolTransport`] and mirrors the remote library into an
//! in-memory cache. Reads always come from the cache; `ready` performs the
//! initial synchronization. A failed refresh degrades to whatever the cache
//! already holds rather than failing the matching pass — the store only
//! errors when it has nothing cached at all.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::observability::messages::store::{
    ProtocolPersisted, ProtocolRemoved, StoreReady, StoreSyncFailed,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::Protocol;
use crate::traits::{ProtocolStore, ProtocolTransport};

pub struct ServerProtocolStore {
    transport: Arc<dyn ProtocolTransport>,
    cache: RwLock<Vec<Protocol>>,
}

impl ServerProtocolStore {
    pub fn new(transport: Arc<dyn ProtocolTransport>) -> Self {
        Self {
            transport,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Re-fetch the remote library into the cache. Returns the number of
    /// protocols cached. The cache is left untouched on failure.
    pub async fn refresh(&self) -> Result<usize, StoreError> {
        let fetched = self.transport.fetch_all().await?;
        let count = fetched.len();
        *self.cache.write().expect("protocol cache poisoned") = fetched;
        Ok(count)
    }

    fn cached(&self) -> Vec<Protocol> {
        self.cache.read().expect("protocol cache poisoned").clone()
    }
}

#[async_trait]
impl ProtocolStore for ServerProtocolStore {
    async fn ready(&self) -> Result<(), StoreError> {
        match self.refresh().await {
            Ok(count) => {
                StoreReady {
                    backend: "server",
                    protocol_count: count,
                }
                .log();
                Ok(())
            }
            Err(error) => {
                let cached = self.cache.read().expect("protocol cache poisoned").len();
                if cached > 0 {
                    StoreSyncFailed {
                        backend: "server",
                        cached_protocols: cached,
                        error: &error,
                    }
                    .log();
                    Ok(())
                } else {
                    Err(error)
                }
            }
        }
    }

    fn get_protocol(&self, id: &str) -> Option<Protocol> {
        self.cache
            .read()
            .expect("protocol cache poisoned")
            .iter()
            .find(|protocol| protocol.id == id)
            .cloned()
    }

    fn all_protocols(&self) -> Vec<Protocol> {
        self.cached()
    }

    async fn add_protocol(&self, protocol: Protocol) -> Result<(), StoreError> {
        {
            let cache = self.cache.read().expect("protocol cache poisoned");
            if cache.iter().any(|existing| existing.id == protocol.id) {
                return Err(StoreError::Duplicate(protocol.id));
            }
        }
        self.transport.persist(&protocol).await?;
        ProtocolPersisted {
            protocol_id: &protocol.id,
            backend: "server",
        }
        .log();
        self.cache.write().expect("protocol cache poisoned").push(protocol);
        Ok(())
    }

    async fn update_protocol(&self, protocol: Protocol) -> Result<(), StoreError> {
        let index = {
            let cache = self.cache.read().expect("protocol cache poisoned");
            let Some(index) = cache.iter().position(|existing| existing.id == protocol.id) else {
                return Err(StoreError::NotFound(protocol.id));
            };
            if cache[index].locked {
                return Err(StoreError::Locked(protocol.id));
            }
            index
        };
        self.transport.persist(&protocol).await?;
        ProtocolPersisted {
            protocol_id: &protocol.id,
            backend: "server",
        }
        .log();
        self.cache.write().expect("protocol cache poisoned")[index] = protocol;
        Ok(())
    }

    async fn remove_protocol(&self, id: &str) -> Result<(), StoreError> {
        {
            let cache = self.cache.read().expect("protocol cache poisoned");
            let Some(index) = cache.iter().position(|existing| existing.id == id) else {
                return Err(StoreError::NotFound(id.to_string()));
            };
            if cache[index].locked {
                return Err(StoreError::Locked(id.to_string()));
            }
        }
        self.transport.delete(id).await?;
        ProtocolRemoved {
            protocol_id: id,
            backend: "server",
        }
        .log();
        let mut cache = self.cache.write().expect("protocol cache poisoned");
        cache.retain(|protocol| protocol.id != id);
        Ok(())
    }
}
