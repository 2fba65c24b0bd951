// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed catalog of named comparison operators.
//!
//! A rule's constraint names a validator and a validator option, e.g.
//! `{ "equals": { "value": "CT" } }`. The registry maps each
//! `(validator, validator_option)` pair to a [`ComparatorFn`], validated at
//! registration time and looked up at evaluation time. Unknown pairs resolve
//! to `None`; callers must treat that as "rule cannot be evaluated", never
//! as a pass.
//!
//! Comparators are pure functions over JSON attribute values. DICOM numeric
//! attributes frequently arrive as strings (IS/DS value representations), so
//! numeric comparators coerce numeric strings before comparing.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// A comparison operator: `(actual_value, operand) -> bool`.
pub type ComparatorFn = fn(&Value, &Value) -> bool;

/// The validator-option id used by every built-in comparator.
const OPTION_VALUE: &str = "value";

/// Errors that can occur while registering a comparator
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationError {
    /// The validator or validator-option id was empty
    EmptyId,
    /// A comparator is already registered under this pair
    DuplicateComparator {
        validator: String,
        validator_option: String,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::EmptyId => {
                write!(f, "Comparator ids must be non-empty")
            }
            RegistrationError::DuplicateComparator {
                validator,
                validator_option,
            } => {
                write!(
                    f,
                    "A comparator is already registered for '{}::{}'",
                    validator, validator_option
                )
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Registry mapping `(validator, validator_option)` pairs to comparator
/// functions.
#[derive(Clone)]
pub struct ComparatorRegistry {
    table: HashMap<(String, String), ComparatorFn>,
}

impl ComparatorRegistry {
    /// Create an empty registry with no comparators.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Create a registry populated with the built-in comparators:
    /// `equals`, `doesNotEqual`, `contains`, `doesNotContain`,
    /// `startsWith`, `endsWith`, `greaterThan`, `greaterThanOrEquals`,
    /// `lessThan`, `lessThanOrEquals`, `range` and `anyOf`, all under the
    /// `value` option.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        let builtins: [(&str, ComparatorFn); 12] = [
            ("equals", equals),
            ("doesNotEqual", does_not_equal),
            ("contains", contains),
            ("doesNotContain", does_not_contain),
            ("startsWith", starts_with),
            ("endsWith", ends_with),
            ("greaterThan", greater_than),
            ("greaterThanOrEquals", greater_than_or_equals),
            ("lessThan", less_than),
            ("lessThanOrEquals", less_than_or_equals),
            ("range", range),
            ("anyOf", any_of),
        ];

        for (validator, comparator) in builtins {
            registry
                .register(validator, OPTION_VALUE, comparator)
                .expect("built-in comparator table is statically well-formed");
        }

        registry
    }

    /// Register a comparator under a `(validator, validator_option)` pair.
    ///
    /// Ids are validated here so that evaluation-time lookups can stay
    /// infallible: an id that never registered simply resolves to `None`.
    pub fn register(
        &mut self,
        validator: &str,
        validator_option: &str,
        comparator: ComparatorFn,
    ) -> Result<(), RegistrationError> {
        if validator.is_empty() || validator_option.is_empty() {
            return Err(RegistrationError::EmptyId);
        }

        let key = (validator.to_string(), validator_option.to_string());
        if self.table.contains_key(&key) {
            return Err(RegistrationError::DuplicateComparator {
                validator: validator.to_string(),
                validator_option: validator_option.to_string(),
            });
        }

        self.table.insert(key, comparator);
        Ok(())
    }

    /// Look up the comparator for a `(validator, validator_option)` pair.
    pub fn resolve(&self, validator: &str, validator_option: &str) -> Option<ComparatorFn> {
        self.table
            .get(&(validator.to_string(), validator_option.to_string()))
            .copied()
    }

    /// Whether the pair is known to this registry.
    pub fn knows(&self, validator: &str, validator_option: &str) -> bool {
        self.resolve(validator, validator_option).is_some()
    }

    /// Whether a validator id denotes the exact-equality comparator.
    ///
    /// The abstract-prior counting logic treats equality constraints
    /// specially (the operand statically bounds how many priors a rule
    /// reaches back), so the distinction lives here next to the catalog.
    pub fn is_equality(validator: &str) -> bool {
        validator == "equals"
    }
}

impl fmt::Debug for ComparatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparatorRegistry")
            .field("comparator_count", &self.table.len())
            .finish()
    }
}

/// Coerce a JSON value to a float, accepting numeric strings.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn equals(actual: &Value, operand: &Value) -> bool {
    // Numeric equality first: "2" and 2 are the same DICOM value
    if let (Some(a), Some(b)) = (numeric(actual), numeric(operand)) {
        return a == b;
    }
    actual == operand
}

fn does_not_equal(actual: &Value, operand: &Value) -> bool {
    !equals(actual, operand)
}

fn contains(actual: &Value, operand: &Value) -> bool {
    match actual {
        Value::String(haystack) => match as_text(operand) {
            Some(needle) => haystack.contains(&needle),
            None => false,
        },
        Value::Array(items) => items.iter().any(|item| equals(item, operand)),
        _ => false,
    }
}

fn does_not_contain(actual: &Value, operand: &Value) -> bool {
    !contains(actual, operand)
}

fn starts_with(actual: &Value, operand: &Value) -> bool {
    match (as_text(actual), as_text(operand)) {
        (Some(haystack), Some(prefix)) => haystack.starts_with(&prefix),
        _ => false,
    }
}

fn ends_with(actual: &Value, operand: &Value) -> bool {
    match (as_text(actual), as_text(operand)) {
        (Some(haystack), Some(suffix)) => haystack.ends_with(&suffix),
        _ => false,
    }
}

fn greater_than(actual: &Value, operand: &Value) -> bool {
    matches!((numeric(actual), numeric(operand)), (Some(a), Some(b)) if a > b)
}

fn greater_than_or_equals(actual: &Value, operand: &Value) -> bool {
    matches!((numeric(actual), numeric(operand)), (Some(a), Some(b)) if a >= b)
}

fn less_than(actual: &Value, operand: &Value) -> bool {
    matches!((numeric(actual), numeric(operand)), (Some(a), Some(b)) if a < b)
}

fn less_than_or_equals(actual: &Value, operand: &Value) -> bool {
    matches!((numeric(actual), numeric(operand)), (Some(a), Some(b)) if a <= b)
}

/// Inclusive numeric range; the operand is a two-element `[min, max]` array.
fn range(actual: &Value, operand: &Value) -> bool {
    let Value::Array(bounds) = operand else {
        return false;
    };
    if bounds.len() != 2 {
        return false;
    }
    match (numeric(actual), numeric(&bounds[0]), numeric(&bounds[1])) {
        (Some(a), Some(min), Some(max)) => a >= min && a <= max,
        _ => false,
    }
}

/// Set membership; the operand is an array of admissible values.
fn any_of(actual: &Value, operand: &Value) -> bool {
    match operand {
        Value::Array(options) => options.iter().any(|option| equals(actual, option)),
        _ => false,
    }
}
