// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Weighted rule-list evaluation.
//!
//! A rule list is scored against one entity's attribute map: each passing
//! rule adds its weight, each failing required rule vetoes the whole
//! candidate. Malformed rules and rules naming unknown comparators never
//! abort the pass; they are skipped or treated as non-matches and reported
//! as issues on the returned details.

use crate::comparators::ComparatorRegistry;
use crate::errors::MatchIssue;
use crate::observability::messages::matcher::{ComparatorUnresolved, RuleSkipped};
use crate::observability::messages::StructuredLog;
use crate::protocol::Rule;
use crate::traits::AttributeMap;

/// The outcome of evaluating one rule against one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub attribute: String,
    pub required: bool,
    pub weight: f64,
}

/// The aggregate outcome of evaluating a rule list against one entity.
///
/// A candidate with `required_failed` set is disqualified outright and its
/// score is forced to zero; `passed` and `failed` record the per-rule
/// outcomes for diagnostic display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchDetails {
    pub score: f64,
    pub required_failed: bool,
    pub passed: Vec<RuleOutcome>,
    pub failed: Vec<RuleOutcome>,
    pub issues: Vec<MatchIssue>,
}

impl MatchDetails {
    /// Fold another rule list's details into this one, combining scores and
    /// outcome lists. Used to merge study-level and series-level results
    /// into a single candidate score.
    pub fn merge(mut self, other: MatchDetails) -> MatchDetails {
        self.required_failed = self.required_failed || other.required_failed;
        self.passed.extend(other.passed);
        self.failed.extend(other.failed);
        self.issues.extend(other.issues);
        self.score = if self.required_failed {
            0.0
        } else {
            self.score + other.score
        };
        self
    }
}

/// Evaluate a rule list against an entity's attributes.
pub fn match_rules(
    rules: &[Rule],
    attributes: &AttributeMap,
    registry: &ComparatorRegistry,
) -> MatchDetails {
    let mut details = MatchDetails::default();

    for rule in rules {
        let Some(info) = rule.constraint_info() else {
            RuleSkipped {
                rule_id: &rule.id,
                attribute: &rule.attribute,
            }
            .log();
            details.issues.push(MatchIssue::MalformedRule {
                rule_id: rule.id.clone(),
            });
            continue;
        };

        if !registry.knows(&info.validator, &info.validator_option) {
            ComparatorUnresolved {
                rule_id: &rule.id,
                validator: &info.validator,
                validator_option: &info.validator_option,
            }
            .log();
            details.issues.push(MatchIssue::UnresolvedComparator {
                rule_id: rule.id.clone(),
                validator: info.validator.clone(),
                validator_option: info.validator_option.clone(),
            });
        }

        let outcome = RuleOutcome {
            rule_id: rule.id.clone(),
            attribute: rule.attribute.clone(),
            required: rule.required,
            weight: rule.weight,
        };

        if rule.evaluate(attributes.get(&rule.attribute), registry) {
            details.score += rule.weight;
            details.passed.push(outcome);
        } else {
            if rule.required {
                details.required_failed = true;
            }
            details.failed.push(outcome);
        }
    }

    if details.required_failed {
        details.score = 0.0;
    }

    details
}
