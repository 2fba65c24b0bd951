// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for rule evaluation events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A rule with an empty or malformed constraint was skipped.
///
/// # Log Level
/// `warn!` - The rule contributes nothing until its constraint is fixed
///
/// # Example
/// ```
/// use the_lightbox::observability::messages::matcher::RuleSkipped;
/// use the_lightbox::observability::messages::StructuredLog;
///
/// let msg = RuleSkipped {
///     rule_id: "rule-17",
///     attribute: "Modality",
/// };
///
/// msg.log();
/// ```
pub struct RuleSkipped<'a> {
    pub rule_id: &'a str,
    pub attribute: &'a str,
}

impl Display for RuleSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipped rule '{}' on attribute '{}': empty or malformed constraint",
            self.rule_id, self.attribute
        )
    }
}

impl StructuredLog for RuleSkipped<'_> {
    fn log(&self) {
        tracing::warn!(
            rule_id = self.rule_id,
            attribute = self.attribute,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "rule_skipped",
            name = name,
            rule_id = self.rule_id,
            attribute = self.attribute,
        )
    }
}

/// A rule referenced a comparator the registry does not know.
///
/// # Log Level
/// `warn!` - The rule is treated as a non-match until registered
pub struct ComparatorUnresolved<'a> {
    pub rule_id: &'a str,
    pub validator: &'a str,
    pub validator_option: &'a str,
}

impl Display for ComparatorUnresolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rule '{}' references unknown comparator '{}::{}'",
            self.rule_id, self.validator, self.validator_option
        )
    }
}

impl StructuredLog for ComparatorUnresolved<'_> {
    fn log(&self) {
        tracing::warn!(
            rule_id = self.rule_id,
            validator = self.validator,
            validator_option = self.validator_option,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "comparator_unresolved",
            name = name,
            rule_id = self.rule_id,
            validator = self.validator,
        )
    }
}
