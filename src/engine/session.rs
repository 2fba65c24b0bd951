// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A hung session: the outcome of a pass plus stage navigation.
//!
//! The pass picks the best stage automatically; a reader can then step
//! through the protocol's other stages manually. Navigation re-runs
//! viewport assignment for the target stage against the same context, so
//! stepping back and forth always lands on the same layout.

use std::sync::Arc;

use crate::engine::context::MatchContext;
use crate::engine::pass::{MatchResult, ProtocolEngine};
use crate::errors::MatchError;
use crate::protocol::Protocol;

pub struct MatchSession {
    engine: Arc<ProtocolEngine>,
    context: MatchContext,
    protocol: Protocol,
    result: MatchResult,
}

impl MatchSession {
    /// Run a matching pass and open a session on its outcome.
    pub async fn start(
        engine: Arc<ProtocolEngine>,
        context: MatchContext,
    ) -> Result<Self, MatchError> {
        let result = engine.run(&context).await?;
        let protocol = engine.resolve_protocol(&result.protocol_id);
        Ok(Self {
            engine,
            context,
            protocol,
            result,
        })
    }

    pub fn result(&self) -> &MatchResult {
        &self.result
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn stage_index(&self) -> usize {
        self.result.stage_index
    }

    pub fn is_next_stage_available(&self) -> bool {
        self.result.stage_index + 1 < self.protocol.stages.len()
    }

    pub fn is_previous_stage_available(&self) -> bool {
        self.result.stage_index > 0
    }

    /// Hang the next stage. `None` when already on the last stage.
    pub fn next_stage(&mut self) -> Option<&MatchResult> {
        if !self.is_next_stage_available() {
            return None;
        }
        self.go_to(self.result.stage_index + 1)
    }

    /// Hang the previous stage. `None` when already on the first stage.
    pub fn previous_stage(&mut self) -> Option<&MatchResult> {
        if !self.is_previous_stage_available() {
            return None;
        }
        self.go_to(self.result.stage_index - 1)
    }

    fn go_to(&mut self, stage_index: usize) -> Option<&MatchResult> {
        let result = self
            .engine
            .hang_stage(&self.protocol, stage_index, &self.context)?;
        self.result = result;
        Some(&self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryProtocolStore;
    use crate::engine::context::{SeriesRecord, StudyRecord};
    use crate::protocol::{Rule, Stage, ViewportDefinition, ViewportStructure};
    use crate::traits::AttributeMap;
    use serde_json::json;

    fn two_stage_protocol() -> Protocol {
        let mut overview = Stage::new("overview", ViewportStructure::grid(1, 1));
        overview.viewports.push(ViewportDefinition::new());

        let mut side_by_side = Stage::new("sideBySide", ViewportStructure::grid(1, 2));
        side_by_side.viewports.push(ViewportDefinition::new());
        side_by_side.viewports.push(ViewportDefinition::new());

        let mut protocol = Protocol::new("CT CHEST");
        protocol.add_protocol_matching_rule(Rule::with_operand(
            "Modality",
            "equals",
            json!("CT"),
            false,
            1.0,
        ));
        protocol.add_stage(overview);
        protocol.add_stage(side_by_side);
        protocol
    }

    fn context() -> MatchContext {
        let mut attributes = AttributeMap::new();
        attributes.insert("Modality", json!("CT"));
        let study = StudyRecord {
            id: "study-1".to_string(),
            attributes,
            series: vec![
                SeriesRecord {
                    id: "series-1".to_string(),
                    attributes: AttributeMap::new(),
                    images: Vec::new(),
                },
                SeriesRecord {
                    id: "series-2".to_string(),
                    attributes: AttributeMap::new(),
                    images: Vec::new(),
                },
            ],
        };
        MatchContext::new(study, Vec::new())
    }

    #[tokio::test]
    async fn test_session_navigates_between_stages() {
        let protocol = two_stage_protocol();
        let protocol_id = protocol.id.clone();
        let store = Arc::new(MemoryProtocolStore::with_protocols(vec![protocol]));
        let engine = Arc::new(ProtocolEngine::new(store));

        let mut session = MatchSession::start(engine, context()).await.unwrap();
        assert_eq!(session.result().protocol_id, protocol_id);
        assert_eq!(session.stage_index(), 0);
        assert!(session.is_next_stage_available());
        assert!(!session.is_previous_stage_available());

        let result = session.next_stage().unwrap();
        assert_eq!(result.stage_index, 1);
        assert_eq!(result.viewport_assignments.len(), 2);
        assert!(session.next_stage().is_none());

        let result = session.previous_stage().unwrap();
        assert_eq!(result.stage_index, 0);
        assert!(session.previous_stage().is_none());
    }

    #[tokio::test]
    async fn test_navigation_is_stable_across_round_trips() {
        let store = Arc::new(MemoryProtocolStore::with_protocols(vec![two_stage_protocol()]));
        let engine = Arc::new(ProtocolEngine::new(store));

        let mut session = MatchSession::start(engine, context()).await.unwrap();
        let initial = session.result().clone();
        session.next_stage();
        let back = session.previous_stage().unwrap().clone();
        assert_eq!(initial.stage_id, back.stage_id);
        assert_eq!(initial.viewport_assignments, back.viewport_assignments);
    }
}
