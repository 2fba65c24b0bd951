// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The atomic matchable unit: an attribute, a constraint, a required flag
//! and a relative weight.
//!
//! A constraint is a single-entry nested map naming a validator and a
//! validator option, e.g. `{ "equals": { "value": "CT" } }`. Constraint
//! introspection is memoized lazily and invalidated whenever the rule is
//! mutated, so repeated evaluation during a pass never re-derives it.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::comparators::ComparatorRegistry;
use crate::config::consts::{ABSTRACT_PRIOR_ATTRIBUTE, DEFAULT_RULE_WEIGHT};

/// A rule constraint: exactly one validator key holding exactly one
/// validator-option key whose value is the comparison operand.
pub type Constraint = BTreeMap<String, BTreeMap<String, Value>>;

/// The validator/option pair extracted from a well-formed constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintInfo {
    pub validator: String,
    pub validator_option: String,
}

/// The validator id and operand extracted from a well-formed constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorAndValue {
    pub validator: String,
    pub value: Value,
}

/// A single testable condition against one attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default = "crate::protocol::fresh_id")]
    pub id: String,
    pub attribute: String,
    #[serde(default)]
    pub constraint: Constraint,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,

    #[serde(skip)]
    constraint_info: OnceLock<Option<ConstraintInfo>>,
    #[serde(skip)]
    validator_and_value: OnceLock<Option<ValidatorAndValue>>,
}

fn default_weight() -> f64 {
    DEFAULT_RULE_WEIGHT
}

impl Rule {
    pub fn new(attribute: &str, constraint: Constraint, required: bool, weight: f64) -> Self {
        Self {
            id: crate::protocol::fresh_id(),
            attribute: attribute.to_string(),
            constraint,
            required,
            weight,
            constraint_info: OnceLock::new(),
            validator_and_value: OnceLock::new(),
        }
    }

    /// Convenience constructor for the common single-operand shape,
    /// e.g. `Rule::with_operand("Modality", "equals", json!("CT"), true, 1.0)`.
    pub fn with_operand(
        attribute: &str,
        validator: &str,
        operand: Value,
        required: bool,
        weight: f64,
    ) -> Self {
        let mut options = BTreeMap::new();
        options.insert("value".to_string(), operand);
        let mut constraint = Constraint::new();
        constraint.insert(validator.to_string(), options);
        Self::new(attribute, constraint, required, weight)
    }

    /// Refill this rule from a plain JSON object, e.g. one edited by the
    /// authoring UI. Missing ids get a fresh one; the memoized constraint
    /// introspection is invalidated.
    pub fn from_object(&mut self, input: &Value) {
        self.id = input
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(crate::protocol::fresh_id);
        self.attribute = input
            .get("attribute")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.required = input.get("required").and_then(Value::as_bool).unwrap_or(false);
        self.weight = input
            .get("weight")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_RULE_WEIGHT);
        self.constraint = input
            .get("constraint")
            .and_then(|c| serde_json::from_value(c.clone()).ok())
            .unwrap_or_default();
        self.invalidate();
    }

    /// Replace the constraint, invalidating memoized introspection.
    pub fn set_constraint(&mut self, constraint: Constraint) {
        self.constraint = constraint;
        self.invalidate();
    }

    /// Replace the attribute name, invalidating memoized introspection.
    pub fn set_attribute(&mut self, attribute: &str) {
        self.attribute = attribute.to_string();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.constraint_info = OnceLock::new();
        self.validator_and_value = OnceLock::new();
    }

    /// The single `(validator, validator_option)` pair of this rule's
    /// constraint, memoized. `None` when the constraint is empty or does
    /// not hold exactly one pair.
    pub fn constraint_info(&self) -> Option<&ConstraintInfo> {
        self.constraint_info
            .get_or_init(|| {
                if self.constraint.len() != 1 {
                    return None;
                }
                let (validator, options) = self.constraint.iter().next()?;
                if options.len() != 1 {
                    return None;
                }
                let validator_option = options.keys().next()?;
                Some(ConstraintInfo {
                    validator: validator.clone(),
                    validator_option: validator_option.clone(),
                })
            })
            .as_ref()
    }

    /// The validator id and operand of this rule's constraint, memoized.
    /// `None` on malformed constraints, never an error.
    pub fn validator_and_value(&self) -> Option<&ValidatorAndValue> {
        self.validator_and_value
            .get_or_init(|| {
                let info = self.constraint_info()?.clone();
                let operand = self
                    .constraint
                    .get(&info.validator)?
                    .get(&info.validator_option)?
                    .clone();
                Some(ValidatorAndValue {
                    validator: info.validator,
                    value: operand,
                })
            })
            .as_ref()
    }

    /// Whether this rule references the abstract-prior pseudo attribute.
    pub fn is_prior_reference(&self) -> bool {
        self.attribute == ABSTRACT_PRIOR_ATTRIBUTE
    }

    /// How many prior studies this rule reaches back to.
    ///
    /// Returns `-1` for rules that are not prior references. For equality
    /// constraints the operand bounds the reach statically: a negative
    /// operand means "at least the oldest prior" (one prior suffices), a
    /// non-negative operand is the 1-based prior index itself. For any
    /// other comparator the reach cannot be bounded without evaluating
    /// against each candidate prior, so the count stays at the
    /// conservative `0`.
    pub fn count_referenced_priors(&self) -> i64 {
        if !self.is_prior_reference() {
            return -1;
        }

        let Some(vv) = self.validator_and_value() else {
            return 0;
        };

        if !ComparatorRegistry::is_equality(&vv.validator) {
            return 0;
        }

        let operand = parse_int(&vv.value).unwrap_or(0);
        if operand < 0 {
            1
        } else {
            operand
        }
    }

    /// Evaluate this rule against an actual attribute value.
    ///
    /// Missing attributes, malformed constraints and unresolved comparators
    /// all evaluate to `false`; a comparator that cannot be resolved never
    /// counts as a pass.
    pub fn evaluate(&self, actual: Option<&Value>, registry: &ComparatorRegistry) -> bool {
        let Some(info) = self.constraint_info() else {
            return false;
        };
        let Some(comparator) = registry.resolve(&info.validator, &info.validator_option) else {
            return false;
        };
        let Some(vv) = self.validator_and_value() else {
            return false;
        };
        match actual {
            Some(actual) => comparator(actual, &vv.value),
            None => false,
        }
    }

    /// Deep-copy this rule under a fresh id.
    pub fn create_clone(&self) -> Self {
        let mut clone = self.clone();
        clone.id = crate::protocol::fresh_id();
        clone.invalidate();
        clone
    }
}

pub(crate) fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
