// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Protocol library validation.
//!
//! Validation is advisory: a library with findings stays usable, because
//! the matching pass skips malformed rules and tolerates unsatisfiable
//! stages. Surfacing the findings up front gives protocol authors a
//! chance to fix what would otherwise silently contribute no score.
//!
//! # Validation Pipeline
//!
//! 1. **Uniqueness**: protocol ids must be unique across the library
//! 2. **Structure**: every protocol needs at least one stage, and each
//!    stage's viewport list must match its declared structure
//! 3. **Rules**: every rule needs a well-formed constraint naming a
//!    comparator the registry can resolve

use crate::comparators::ComparatorRegistry;
use crate::errors::ProtocolValidationError;
use crate::observability::messages::validation::LibraryValidationFindings;
use crate::observability::messages::StructuredLog;
use crate::protocol::{Protocol, Rule};
use std::collections::HashSet;

/// Validate a protocol library against a comparator registry.
///
/// Returns every finding rather than stopping at the first, so authors
/// can fix a library in one round trip.
pub fn validate_protocol_library(
    protocols: &[Protocol],
    registry: &ComparatorRegistry,
) -> Vec<ProtocolValidationError> {
    let mut findings = Vec::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for protocol in protocols {
        if !seen_ids.insert(&protocol.id) {
            findings.push(ProtocolValidationError::DuplicateProtocolId {
                protocol_id: protocol.id.clone(),
            });
        }

        if protocol.stages.is_empty() {
            findings.push(ProtocolValidationError::NoStages {
                protocol_id: protocol.id.clone(),
            });
        }

        for stage in &protocol.stages {
            let expected = stage.viewport_structure.num_viewports();
            if stage.viewports.len() != expected {
                findings.push(ProtocolValidationError::ViewportCountMismatch {
                    protocol_id: protocol.id.clone(),
                    stage_id: stage.id.clone(),
                    expected,
                    actual: stage.viewports.len(),
                });
            }
        }

        let viewport_rules = protocol
            .stages
            .iter()
            .flat_map(|stage| stage.viewports.iter())
            .flat_map(|viewport| viewport.all_rules());
        for rule in protocol.protocol_matching_rules.iter().chain(viewport_rules) {
            validate_rule(protocol, rule, registry, &mut findings);
        }
    }

    LibraryValidationFindings {
        protocol_count: protocols.len(),
        findings: &findings,
    }
    .log();

    findings
}

fn validate_rule(
    protocol: &Protocol,
    rule: &Rule,
    registry: &ComparatorRegistry,
    findings: &mut Vec<ProtocolValidationError>,
) {
    let Some(info) = rule.constraint_info() else {
        findings.push(ProtocolValidationError::MalformedConstraint {
            protocol_id: protocol.id.clone(),
            rule_id: rule.id.clone(),
        });
        return;
    };

    if !registry.knows(&info.validator, &info.validator_option) {
        findings.push(ProtocolValidationError::UnknownComparator {
            protocol_id: protocol.id.clone(),
            rule_id: rule.id.clone(),
            validator: info.validator.clone(),
            validator_option: info.validator_option.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Constraint, Stage, ViewportDefinition, ViewportStructure};
    use serde_json::json;

    fn valid_protocol(id: &str) -> Protocol {
        let mut stage = Stage::new("single", ViewportStructure::grid(1, 1));
        stage.viewports.push(ViewportDefinition::new());
        let mut protocol = Protocol::new(id);
        protocol.id = id.to_string();
        protocol.stages.push(stage);
        protocol
    }

    #[test]
    fn test_valid_library_has_no_findings() {
        let registry = ComparatorRegistry::builtin();
        let mut protocol = valid_protocol("ct-chest");
        protocol.add_protocol_matching_rule(Rule::with_operand(
            "Modality",
            "equals",
            json!("CT"),
            true,
            1.0,
        ));

        let findings = validate_protocol_library(&[protocol], &registry);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_findings_table_driven() {
        struct TestCase {
            name: &'static str,
            protocols: Vec<Protocol>,
            expected: fn(&[ProtocolValidationError]) -> bool,
        }

        let test_cases = vec![
            TestCase {
                name: "duplicate protocol ids",
                protocols: vec![valid_protocol("dup"), valid_protocol("dup")],
                expected: |findings| {
                    matches!(
                        findings,
                        [ProtocolValidationError::DuplicateProtocolId { protocol_id }]
                            if protocol_id == "dup"
                    )
                },
            },
            TestCase {
                name: "protocol without stages",
                protocols: vec![{
                    let mut protocol = Protocol::new("empty");
                    protocol.id = "empty".to_string();
                    protocol
                }],
                expected: |findings| {
                    matches!(findings, [ProtocolValidationError::NoStages { protocol_id }]
                        if protocol_id == "empty")
                },
            },
            TestCase {
                name: "viewport count mismatch",
                protocols: vec![{
                    let mut protocol = Protocol::new("mismatch");
                    protocol.id = "mismatch".to_string();
                    let stage = Stage::new("twoByTwo", ViewportStructure::grid(2, 2));
                    // No viewports declared for a 4-slot grid
                    protocol.stages.push(stage);
                    protocol
                }],
                expected: |findings| {
                    matches!(
                        findings,
                        [ProtocolValidationError::ViewportCountMismatch {
                            expected: 4,
                            actual: 0,
                            ..
                        }]
                    )
                },
            },
            TestCase {
                name: "malformed constraint",
                protocols: vec![{
                    let mut protocol = valid_protocol("malformed");
                    protocol.add_protocol_matching_rule(Rule::new(
                        "Modality",
                        Constraint::new(),
                        false,
                        1.0,
                    ));
                    protocol
                }],
                expected: |findings| {
                    matches!(findings, [ProtocolValidationError::MalformedConstraint { .. }])
                },
            },
            TestCase {
                name: "unknown comparator",
                protocols: vec![{
                    let mut protocol = valid_protocol("unknown");
                    protocol.add_protocol_matching_rule(Rule::with_operand(
                        "Modality",
                        "approximately",
                        json!("CT"),
                        false,
                        1.0,
                    ));
                    protocol
                }],
                expected: |findings| {
                    matches!(
                        findings,
                        [ProtocolValidationError::UnknownComparator { validator, .. }]
                            if validator == "approximately"
                    )
                },
            },
        ];

        let registry = ComparatorRegistry::builtin();
        for test_case in test_cases {
            let findings = validate_protocol_library(&test_case.protocols, &registry);
            assert!(
                (test_case.expected)(&findings),
                "Test case '{}' failed: {:?}",
                test_case.name,
                findings
            );
        }
    }
}
