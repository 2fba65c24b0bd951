// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::protocol::{Rule, Stage};

/// The top-level matchable unit: identity, protocol-level eligibility rules
/// and an ordered list of stages. Stage order is the preference order among
/// otherwise-tied stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    #[serde(default = "crate::protocol::fresh_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Locked protocols (the shipped defaults) reject edits and removal.
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub protocol_matching_rules: Vec<Rule>,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
}

impl Protocol {
    pub fn new(name: &str) -> Self {
        Self {
            id: crate::protocol::fresh_id(),
            name: name.to_string(),
            description: None,
            locked: false,
            protocol_matching_rules: Vec::new(),
            stages: Vec::new(),
            created_date: Some(epoch_seconds()),
            modified_date: None,
        }
    }

    /// Deep-copy this protocol under a fresh id, optionally renaming it.
    /// Clones are always unlocked so a user can edit their fork of a
    /// shipped protocol.
    pub fn create_clone(&self, name: Option<&str>) -> Self {
        Self {
            id: crate::protocol::fresh_id(),
            name: name.unwrap_or(&self.name).to_string(),
            description: self.description.clone(),
            locked: false,
            protocol_matching_rules: self
                .protocol_matching_rules
                .iter()
                .map(Rule::create_clone)
                .collect(),
            stages: self.stages.iter().map(|stage| stage.create_clone(None)).collect(),
            created_date: Some(epoch_seconds()),
            modified_date: None,
        }
    }

    pub fn add_stage(&mut self, stage: Stage) {
        self.stages.push(stage);
        self.protocol_was_modified();
    }

    pub fn add_protocol_matching_rule(&mut self, rule: Rule) {
        self.protocol_matching_rules.push(rule);
        self.protocol_was_modified();
    }

    /// Remove a protocol-level rule by id. Returns whether it was found.
    pub fn remove_protocol_matching_rule(&mut self, rule_id: &str) -> bool {
        let Some(index) = self
            .protocol_matching_rules
            .iter()
            .position(|rule| rule.id == rule_id)
        else {
            return false;
        };
        self.protocol_matching_rules.remove(index);
        self.protocol_was_modified();
        true
    }

    /// The deepest prior study this protocol reaches back to, across its
    /// protocol-level rules and every viewport's study-level rules.
    ///
    /// A protocol is only a candidate when the match context holds at least
    /// this many priors.
    pub fn number_of_priors_referenced(&self) -> i64 {
        let protocol_level = self
            .protocol_matching_rules
            .iter()
            .map(Rule::count_referenced_priors);

        let viewport_level = self
            .stages
            .iter()
            .flat_map(|stage| stage.viewports.iter())
            .flat_map(|viewport| viewport.study_matching_rules.iter())
            .map(Rule::count_referenced_priors);

        protocol_level.chain(viewport_level).max().unwrap_or(-1).max(0)
    }

    fn protocol_was_modified(&mut self) {
        self.modified_date = Some(epoch_seconds());
    }
}

fn epoch_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs().to_string())
        .unwrap_or_default()
}
