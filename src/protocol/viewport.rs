// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::Rule;

/// A single slot inside a stage layout: display settings plus the three
/// ordered rule lists that decide what content fills the slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportDefinition {
    #[serde(default)]
    pub viewport_settings: BTreeMap<String, Value>,
    #[serde(default)]
    pub study_matching_rules: Vec<Rule>,
    #[serde(default)]
    pub series_matching_rules: Vec<Rule>,
    #[serde(default)]
    pub image_matching_rules: Vec<Rule>,
}

impl ViewportDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a rule by id, whichever of the three lists it lives in.
    ///
    /// Callers do not know (and must not need to know) whether the rule is
    /// study-, series- or image-scoped. Returns whether a rule was removed.
    pub fn remove_rule(&mut self, rule_id: &str) -> bool {
        for rules in [
            &mut self.study_matching_rules,
            &mut self.series_matching_rules,
            &mut self.image_matching_rules,
        ] {
            if let Some(index) = rules.iter().position(|rule| rule.id == rule_id) {
                rules.remove(index);
                return true;
            }
        }
        false
    }

    /// Deep-copy this viewport definition with fresh ids on every rule.
    pub fn create_clone(&self) -> Self {
        Self {
            viewport_settings: self.viewport_settings.clone(),
            study_matching_rules: self.study_matching_rules.iter().map(Rule::create_clone).collect(),
            series_matching_rules: self.series_matching_rules.iter().map(Rule::create_clone).collect(),
            image_matching_rules: self.image_matching_rules.iter().map(Rule::create_clone).collect(),
        }
    }

    /// All rules across the three lists, in study/series/image order.
    pub fn all_rules(&self) -> impl Iterator<Item = &Rule> {
        self.study_matching_rules
            .iter()
            .chain(self.series_matching_rules.iter())
            .chain(self.image_matching_rules.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn viewport_with_rules() -> ViewportDefinition {
        let mut viewport = ViewportDefinition::new();
        viewport
            .study_matching_rules
            .push(Rule::with_operand("StudyDescription", "contains", json!("CHEST"), false, 1.0));
        viewport
            .series_matching_rules
            .push(Rule::with_operand("Modality", "equals", json!("CT"), true, 1.0));
        viewport
            .image_matching_rules
            .push(Rule::with_operand("InstanceNumber", "equals", json!(1), false, 1.0));
        viewport
    }

    #[test]
    fn test_remove_rule_searches_all_three_lists() {
        let mut viewport = viewport_with_rules();
        let series_rule_id = viewport.series_matching_rules[0].id.clone();
        let image_rule_id = viewport.image_matching_rules[0].id.clone();

        assert!(viewport.remove_rule(&series_rule_id));
        assert!(viewport.series_matching_rules.is_empty());

        assert!(viewport.remove_rule(&image_rule_id));
        assert!(viewport.image_matching_rules.is_empty());

        assert!(!viewport.remove_rule("no-such-rule"));
        assert_eq!(viewport.study_matching_rules.len(), 1);
    }

    #[test]
    fn test_create_clone_mints_fresh_rule_ids() {
        let viewport = viewport_with_rules();
        let clone = viewport.create_clone();

        assert_eq!(clone.series_matching_rules.len(), 1);
        assert_ne!(
            clone.series_matching_rules[0].id,
            viewport.series_matching_rules[0].id
        );
        assert_eq!(
            clone.series_matching_rules[0].constraint,
            viewport.series_matching_rules[0].constraint
        );
    }
}
