// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::protocol::Protocol;
use crate::traits::ProtocolTransport;

/// A stub transport implementation for testing and placeholder purposes.
///
/// Serves a fixed library, counts write traffic, and can be switched into
/// failure mode mid-test to exercise degrade-to-cache behaviour.
pub struct StubTransport {
    protocols: RwLock<Vec<Protocol>>,
    failing: AtomicBool,
    persisted: AtomicUsize,
    deleted: AtomicUsize,
}

impl StubTransport {
    pub fn with_protocols(protocols: Vec<Protocol>) -> Self {
        Self {
            protocols: RwLock::new(protocols),
            failing: AtomicBool::new(false),
            persisted: AtomicUsize::new(0),
            deleted: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent transport call fail.
    pub fn fail_from_now_on(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn persisted_count(&self) -> usize {
        self.persisted.load(Ordering::SeqCst)
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Transport("simulated transport failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProtocolTransport for StubTransport {
    async fn fetch_all(&self) -> Result<Vec<Protocol>, StoreError> {
        self.check()?;
        Ok(self.protocols.read().expect("stub lock poisoned").clone())
    }

    async fn persist(&self, protocol: &Protocol) -> Result<(), StoreError> {
        self.check()?;
        self.persisted.fetch_add(1, Ordering::SeqCst);
        let mut protocols = self.protocols.write().expect("stub lock poisoned");
        protocols.retain(|existing| existing.id != protocol.id);
        protocols.push(protocol.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.check()?;
        self.deleted.fetch_add(1, Ordering::SeqCst);
        self.protocols
            .write()
            .expect("stub lock poisoned")
            .retain(|existing| existing.id != id);
        Ok(())
    }
}

/// A transport that always fails, for testing cold-start failure scenarios.
pub struct FailingTransport;

#[async_trait]
impl ProtocolTransport for FailingTransport {
    async fn fetch_all(&self) -> Result<Vec<Protocol>, StoreError> {
        Err(StoreError::Transport("simulated transport failure".to_string()))
    }

    async fn persist(&self, _protocol: &Protocol) -> Result<(), StoreError> {
        Err(StoreError::Transport("simulated transport failure".to_string()))
    }

    async fn delete(&self, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Transport("simulated transport failure".to_string()))
    }
}
