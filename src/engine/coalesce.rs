// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Trigger coalescing for matching passes.
//!
//! Study arrival events can burst (one per prior as a worklist loads). Each
//! trigger cancels the in-flight pass before starting its own, so only the
//! pass for the newest snapshot ever completes and stale layouts are never
//! applied over fresh ones.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::engine::context::MatchContext;
use crate::engine::pass::{MatchResult, ProtocolEngine};
use crate::errors::MatchError;
use crate::observability::messages::engine::PassSuperseded;
use crate::observability::messages::StructuredLog;

pub struct PassScheduler {
    engine: Arc<ProtocolEngine>,
    current: Mutex<CancellationToken>,
}

impl PassScheduler {
    pub fn new(engine: Arc<ProtocolEngine>) -> Self {
        Self {
            engine,
            current: Mutex::new(CancellationToken::new()),
        }
    }

    /// Run a pass for this context, cancelling any pass still in flight.
    ///
    /// Returns `Ok(None)` when this pass was itself superseded by a newer
    /// trigger before it could finish.
    pub async fn trigger(
        &self,
        context: &MatchContext,
    ) -> Result<Option<MatchResult>, MatchError> {
        let token = CancellationToken::new();
        {
            let mut current = self.current.lock().await;
            current.cancel();
            *current = token.clone();
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                PassSuperseded.log();
                Ok(None)
            }
            result = self.engine.run(context) => result.map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryProtocolStore;
    use crate::config::consts::DEFAULT_PROTOCOL_ID;
    use crate::engine::context::{SeriesRecord, StudyRecord};
    use crate::errors::StoreError;
    use crate::protocol::Protocol;
    use crate::traits::{AttributeMap, ProtocolStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    /// A store whose first `ready` call parks until released, so a test can
    /// hold a pass in flight while a newer trigger arrives.
    struct GatedStore {
        inner: MemoryProtocolStore,
        gate: Notify,
        armed: AtomicBool,
    }

    impl GatedStore {
        fn new() -> Self {
            Self {
                inner: MemoryProtocolStore::new(),
                gate: Notify::new(),
                armed: AtomicBool::new(true),
            }
        }
    }

    #[async_trait]
    impl ProtocolStore for GatedStore {
        async fn ready(&self) -> Result<(), StoreError> {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.gate.notified().await;
            }
            self.inner.ready().await
        }

        fn get_protocol(&self, id: &str) -> Option<Protocol> {
            self.inner.get_protocol(id)
        }

        fn all_protocols(&self) -> Vec<Protocol> {
            self.inner.all_protocols()
        }

        async fn add_protocol(&self, protocol: Protocol) -> Result<(), StoreError> {
            self.inner.add_protocol(protocol).await
        }

        async fn update_protocol(&self, protocol: Protocol) -> Result<(), StoreError> {
            self.inner.update_protocol(protocol).await
        }

        async fn remove_protocol(&self, id: &str) -> Result<(), StoreError> {
            self.inner.remove_protocol(id).await
        }
    }

    fn context() -> MatchContext {
        let study = StudyRecord {
            id: "study-1".to_string(),
            attributes: AttributeMap::new(),
            series: vec![SeriesRecord {
                id: "series-1".to_string(),
                attributes: AttributeMap::new(),
                images: Vec::new(),
            }],
        };
        MatchContext::new(study, Vec::new())
    }

    #[tokio::test]
    async fn test_uncontested_trigger_completes() {
        let engine = Arc::new(ProtocolEngine::new(Arc::new(MemoryProtocolStore::new())));
        let scheduler = PassScheduler::new(engine);

        let result = scheduler.trigger(&context()).await.unwrap();
        assert_eq!(result.unwrap().protocol_id, DEFAULT_PROTOCOL_ID);
    }

    #[tokio::test]
    async fn test_newer_trigger_supersedes_the_pass_in_flight() {
        let store = Arc::new(GatedStore::new());
        let engine = Arc::new(ProtocolEngine::new(store));
        let scheduler = Arc::new(PassScheduler::new(engine));

        let first = {
            let scheduler = Arc::clone(&scheduler);
            let context = context();
            tokio::spawn(async move { scheduler.trigger(&context).await })
        };
        // Let the first pass park on the store gate
        tokio::task::yield_now().await;

        // The second trigger bypasses the (now disarmed) gate and completes
        let second = scheduler.trigger(&context()).await.unwrap();
        assert!(second.is_some());

        // The first pass was cancelled without ever finishing
        let first = first.await.unwrap().unwrap();
        assert!(first.is_none());
    }
}
