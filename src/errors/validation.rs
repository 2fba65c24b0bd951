// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors that can occur during protocol library validation
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolValidationError {
    /// Two protocols in the library share the same id
    DuplicateProtocolId {
        /// The duplicate protocol id
        protocol_id: String,
    },
    /// A protocol declares no stages
    NoStages {
        /// The protocol without stages
        protocol_id: String,
    },
    /// A stage's viewport list is inconsistent with its declared structure
    ViewportCountMismatch {
        /// The protocol owning the stage
        protocol_id: String,
        /// The stage with the mismatch
        stage_id: String,
        /// Viewports required by the structure (rows x columns)
        expected: usize,
        /// Viewports actually declared
        actual: usize,
    },
    /// A rule's constraint is empty or does not hold exactly one
    /// validator/option pair; the rule will be skipped at match time
    MalformedConstraint {
        /// The protocol owning the rule
        protocol_id: String,
        /// The malformed rule
        rule_id: String,
    },
    /// A rule references a validator/option pair the comparator registry
    /// does not provide; the rule will never match
    UnknownComparator {
        /// The protocol owning the rule
        protocol_id: String,
        /// The affected rule
        rule_id: String,
        /// The unknown validator id
        validator: String,
        /// The unknown validator-option id
        validator_option: String,
    },
}

impl fmt::Display for ProtocolValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolValidationError::DuplicateProtocolId { protocol_id } => {
                write!(f, "Duplicate protocol id: '{}'", protocol_id)
            }
            ProtocolValidationError::NoStages { protocol_id } => {
                write!(f, "Protocol '{}' declares no stages", protocol_id)
            }
            ProtocolValidationError::ViewportCountMismatch {
                protocol_id,
                stage_id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Stage '{}' of protocol '{}' declares {} viewports but its structure requires {}",
                    stage_id, protocol_id, actual, expected
                )
            }
            ProtocolValidationError::MalformedConstraint {
                protocol_id,
                rule_id,
            } => {
                write!(
                    f,
                    "Rule '{}' of protocol '{}' has an empty or malformed constraint",
                    rule_id, protocol_id
                )
            }
            ProtocolValidationError::UnknownComparator {
                protocol_id,
                rule_id,
                validator,
                validator_option,
            } => {
                write!(
                    f,
                    "Rule '{}' of protocol '{}' references unknown comparator '{}::{}'",
                    rule_id, protocol_id, validator, validator_option
                )
            }
        }
    }
}

impl std::error::Error for ProtocolValidationError {}
