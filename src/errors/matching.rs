// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors and recoverable issues raised during a matching pass.
//!
//! Almost everything that goes wrong while matching is recovered locally:
//! malformed rules are skipped, unknown comparators count as non-matches,
//! and an empty or fully-disqualified protocol library falls back to the
//! synthesized default protocol. Those recoveries are reported as
//! [`MatchIssue`] values on the match result. Only the total absence of a
//! usable protocol is surfaced as a hard [`MatchError`].

use std::fmt;

/// A recoverable problem encountered during a matching pass.
///
/// Issues never abort the pass; they are collected on the match result so
/// callers can inspect why a fallback was taken or why a rule contributed
/// no score.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchIssue {
    /// A rule's constraint was empty or did not contain exactly one
    /// validator/option pair. The rule was skipped.
    MalformedRule {
        /// The id of the skipped rule
        rule_id: String,
    },
    /// A rule referenced a validator/option pair the comparator registry
    /// does not know. The rule was treated as a non-match.
    UnresolvedComparator {
        /// The id of the affected rule
        rule_id: String,
        /// The unknown validator id
        validator: String,
        /// The unknown validator-option id
        validator_option: String,
    },
    /// Every stored protocol was disqualified by a required-rule veto (or
    /// the library was empty). The synthesized default protocol was used.
    NoEligibleProtocol,
    /// No stage of the selected protocol could fill all of its viewports.
    /// The first stage was used with partial/empty assignments.
    UnsatisfiableStage {
        /// The protocol whose stages were all unsatisfiable
        protocol_id: String,
    },
    /// The metadata provider reported an entity's attributes as
    /// unavailable. Rules depending on them were treated as non-matching.
    MetadataUnavailable {
        /// The metadata level ("study", "series" or "image")
        level: &'static str,
        /// The id of the entity whose attributes were unavailable
        id: String,
    },
}

impl fmt::Display for MatchIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchIssue::MalformedRule { rule_id } => {
                write!(f, "Rule '{}' has an empty or malformed constraint and was skipped", rule_id)
            }
            MatchIssue::UnresolvedComparator {
                rule_id,
                validator,
                validator_option,
            } => {
                write!(
                    f,
                    "Rule '{}' references unknown comparator '{}::{}' and was treated as a non-match",
                    rule_id, validator, validator_option
                )
            }
            MatchIssue::NoEligibleProtocol => {
                write!(f, "No stored protocol was eligible; the default protocol was used")
            }
            MatchIssue::UnsatisfiableStage { protocol_id } => {
                write!(
                    f,
                    "No stage of protocol '{}' was fully satisfiable; using its first stage with partial assignment",
                    protocol_id
                )
            }
            MatchIssue::MetadataUnavailable { level, id } => {
                write!(f, "Metadata for {} '{}' is unavailable", level, id)
            }
        }
    }
}

/// Hard failures of a matching pass.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    /// Not even the synthesized default protocol could produce a layout.
    /// This is the only caller-visible failure of the engine.
    NoUsableProtocol,
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::NoUsableProtocol => {
                write!(f, "No usable protocol is available, including the default")
            }
        }
    }
}

impl std::error::Error for MatchError {}
