// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end matching scenarios over realistic study sets.

use std::sync::Arc;

use serde_json::json;

use crate::backends::{MemoryProtocolStore, ServerProtocolStore};
use crate::config::consts::{ABSTRACT_PRIOR_ATTRIBUTE, DEFAULT_PROTOCOL_ID};
use crate::engine::context::{ImageRecord, MatchContext, SeriesRecord, StudyRecord};
use crate::engine::pass::ProtocolEngine;
use crate::errors::MatchIssue;
use crate::protocol::{Protocol, Rule, Stage, ViewportDefinition, ViewportStructure};
use crate::traits::AttributeMap;

fn attributes(pairs: &[(&str, serde_json::Value)]) -> AttributeMap {
    let mut map = AttributeMap::new();
    for (name, value) in pairs {
        map.insert(name, value.clone());
    }
    map
}

fn series(id: &str, pairs: &[(&str, serde_json::Value)]) -> SeriesRecord {
    SeriesRecord {
        id: id.to_string(),
        attributes: attributes(pairs),
        images: Vec::new(),
    }
}

fn chest_study(id: &str, date: &str, series: Vec<SeriesRecord>) -> StudyRecord {
    StudyRecord {
        id: id.to_string(),
        attributes: attributes(&[
            ("Modality", json!("CT")),
            ("StudyDescription", json!("CT CHEST W/O CONTRAST")),
            ("StudyDate", json!(date)),
        ]),
        series,
    }
}

/// A CT chest study with a scout, an axial and a coronal series.
fn ct_chest(id: &str, date: &str) -> StudyRecord {
    chest_study(
        id,
        date,
        vec![
            series(
                &format!("{}-scout", id),
                &[
                    ("Modality", json!("CT")),
                    ("SeriesDescription", json!("SCOUT")),
                    ("SeriesNumber", json!(1)),
                ],
            ),
            series(
                &format!("{}-axial", id),
                &[
                    ("Modality", json!("CT")),
                    ("SeriesDescription", json!("AXIAL 5MM")),
                    ("SeriesNumber", json!(2)),
                ],
            ),
            series(
                &format!("{}-coronal", id),
                &[
                    ("Modality", json!("CT")),
                    ("SeriesDescription", json!("CORONAL 3MM")),
                    ("SeriesNumber", json!(3)),
                ],
            ),
        ],
    )
}

fn series_rule(description_fragment: &str, required: bool, weight: f64) -> Rule {
    Rule::with_operand(
        "SeriesDescription",
        "contains",
        json!(description_fragment),
        required,
        weight,
    )
}

fn viewport_matching(description_fragment: &str, required: bool) -> ViewportDefinition {
    let mut viewport = ViewportDefinition::new();
    viewport
        .series_matching_rules
        .push(series_rule(description_fragment, required, 1.0));
    viewport
}

fn engine_over(protocols: Vec<Protocol>) -> ProtocolEngine {
    ProtocolEngine::new(Arc::new(MemoryProtocolStore::with_protocols(protocols)))
}

#[test]
fn test_series_rules_route_content_to_the_right_viewports() {
    let mut stage = Stage::new("axialAndCoronal", ViewportStructure::grid(1, 2));
    stage.viewports.push(viewport_matching("AXIAL", true));
    stage.viewports.push(viewport_matching("CORONAL", true));

    let mut protocol = Protocol::new("CT CHEST");
    protocol.add_protocol_matching_rule(Rule::with_operand(
        "Modality",
        "equals",
        json!("CT"),
        true,
        1.0,
    ));
    protocol.add_stage(stage);

    let context = MatchContext::new(ct_chest("active", "20250801"), Vec::new());
    let result = engine_over(vec![])
        .run_with_library(&[protocol], &context)
        .unwrap();

    assert_eq!(result.viewport_assignments.len(), 2);
    let first = result.viewport_assignments[0].display_set.as_ref().unwrap();
    let second = result.viewport_assignments[1].display_set.as_ref().unwrap();
    assert_eq!(first.series_id, "active-axial");
    assert_eq!(second.series_id, "active-coronal");
    assert!(result.issues.is_empty());
}

#[test]
fn test_unfillable_required_viewport_stays_empty_instead_of_mishanging() {
    // One viewport demands MR content the study does not have. The stage
    // cannot be fully satisfied, so it hangs partially: the CT viewport
    // fills, the MR viewport stays empty rather than showing CT.
    let mut stage = Stage::new("ctAndMr", ViewportStructure::grid(1, 2));
    stage.viewports.push({
        let mut viewport = ViewportDefinition::new();
        viewport.series_matching_rules.push(Rule::with_operand(
            "Modality",
            "equals",
            json!("CT"),
            true,
            1.0,
        ));
        viewport
    });
    stage.viewports.push({
        let mut viewport = ViewportDefinition::new();
        viewport.series_matching_rules.push(Rule::with_operand(
            "Modality",
            "equals",
            json!("MR"),
            true,
            1.0,
        ));
        viewport
    });

    let mut protocol = Protocol::new("CT+MR FUSION");
    let protocol_id = protocol.id.clone();
    protocol.add_stage(stage);

    let context = MatchContext::new(ct_chest("active", "20250801"), Vec::new());
    let result = engine_over(vec![])
        .run_with_library(&[protocol], &context)
        .unwrap();

    assert!(result
        .issues
        .contains(&MatchIssue::UnsatisfiableStage { protocol_id }));
    assert!(result.viewport_assignments[0].display_set.is_some());
    assert!(result.viewport_assignments[1].display_set.is_none());
    assert_eq!(result.filled_viewports(), 1);
}

#[test]
fn test_unsatisfiable_first_stage_falls_through_to_a_later_stage() {
    // The comparison stage needs a prior; without one the pass moves on to
    // the single-study stage.
    let mut comparison = Stage::new("comparison", ViewportStructure::grid(1, 2));
    comparison.viewports.push({
        let mut viewport = ViewportDefinition::new();
        viewport.study_matching_rules.push(Rule::with_operand(
            ABSTRACT_PRIOR_ATTRIBUTE,
            "equals",
            json!(0),
            true,
            1.0,
        ));
        viewport
    });
    comparison.viewports.push({
        let mut viewport = ViewportDefinition::new();
        viewport.study_matching_rules.push(Rule::with_operand(
            ABSTRACT_PRIOR_ATTRIBUTE,
            "greaterThanOrEquals",
            json!(1),
            true,
            1.0,
        ));
        viewport
    });

    let mut single = Stage::new("single", ViewportStructure::grid(1, 1));
    single.viewports.push(ViewportDefinition::new());

    let mut protocol = Protocol::new("CT CHEST COMPARE");
    protocol.add_stage(comparison);
    protocol.add_stage(single);

    let context = MatchContext::new(ct_chest("active", "20250801"), Vec::new());
    let result = engine_over(vec![])
        .run_with_library(&[protocol.clone()], &context)
        .unwrap();
    assert_eq!(result.stage_index, 1);
    assert_eq!(result.stage_id, protocol.stages[1].id);
    assert!(result.issues.is_empty());

    // With a prior available the comparison stage is preferred again
    let context = MatchContext::new(
        ct_chest("active", "20250801"),
        vec![ct_chest("prior", "20240101")],
    );
    let result = engine_over(vec![])
        .run_with_library(&[protocol], &context)
        .unwrap();
    assert_eq!(result.stage_index, 0);
    let current = result.viewport_assignments[0].display_set.as_ref().unwrap();
    let prior = result.viewport_assignments[1].display_set.as_ref().unwrap();
    assert_eq!(current.study_id, "active");
    assert_eq!(prior.study_id, "prior");
}

#[test]
fn test_oldest_prior_reference_picks_the_oldest_study() {
    let mut stage = Stage::new("baseline", ViewportStructure::grid(1, 2));
    stage.viewports.push({
        let mut viewport = ViewportDefinition::new();
        viewport.study_matching_rules.push(Rule::with_operand(
            ABSTRACT_PRIOR_ATTRIBUTE,
            "equals",
            json!(0),
            true,
            1.0,
        ));
        viewport
    });
    stage.viewports.push({
        let mut viewport = ViewportDefinition::new();
        viewport.study_matching_rules.push(Rule::with_operand(
            ABSTRACT_PRIOR_ATTRIBUTE,
            "equals",
            json!(-1),
            true,
            1.0,
        ));
        viewport
    });

    let mut protocol = Protocol::new("VS BASELINE");
    protocol.add_stage(stage);

    let context = MatchContext::new(
        ct_chest("active", "20250801"),
        vec![
            ct_chest("recent-prior", "20250101"),
            ct_chest("baseline", "20230101"),
        ],
    );
    let result = engine_over(vec![])
        .run_with_library(&[protocol], &context)
        .unwrap();

    let baseline = result.viewport_assignments[1].display_set.as_ref().unwrap();
    assert_eq!(baseline.study_id, "baseline");
}

#[test]
fn test_at_least_one_prior_reference_needs_exactly_one_prior() {
    let mut stage = Stage::new("withBaseline", ViewportStructure::grid(1, 1));
    stage.viewports.push({
        let mut viewport = ViewportDefinition::new();
        viewport.study_matching_rules.push(Rule::with_operand(
            ABSTRACT_PRIOR_ATTRIBUTE,
            "equals",
            json!(-1),
            true,
            1.0,
        ));
        viewport
    });
    let mut protocol = Protocol::new("NEEDS PRIOR");
    let protocol_id = protocol.id.clone();
    protocol.add_stage(stage);

    // Zero priors: the protocol is skipped entirely and the pass falls
    // back to the default
    let context = MatchContext::new(ct_chest("active", "20250801"), Vec::new());
    let result = engine_over(vec![])
        .run_with_library(&[protocol.clone()], &context)
        .unwrap();
    assert_eq!(result.protocol_id, DEFAULT_PROTOCOL_ID);

    // One prior: the protocol applies and the viewport hangs that prior
    let context = MatchContext::new(
        ct_chest("active", "20250801"),
        vec![ct_chest("only-prior", "20240101")],
    );
    let result = engine_over(vec![])
        .run_with_library(&[protocol], &context)
        .unwrap();
    assert_eq!(result.protocol_id, protocol_id);
    let display_set = result.viewport_assignments[0].display_set.as_ref().unwrap();
    assert_eq!(display_set.study_id, "only-prior");
}

#[test]
fn test_identical_viewports_avoid_hanging_the_same_series_twice() {
    let mut stage = Stage::new("twoUp", ViewportStructure::grid(1, 2));
    stage.viewports.push(viewport_matching("MM", false));
    stage.viewports.push(viewport_matching("MM", false));

    let mut protocol = Protocol::new("CT CHEST TWO-UP");
    protocol.add_stage(stage);

    let context = MatchContext::new(ct_chest("active", "20250801"), Vec::new());
    let result = engine_over(vec![])
        .run_with_library(&[protocol], &context)
        .unwrap();

    let first = result.viewport_assignments[0].display_set.as_ref().unwrap();
    let second = result.viewport_assignments[1].display_set.as_ref().unwrap();
    // Both viewports prefer the axial series (equal score, lower series
    // number); the second takes the next-best instead of repeating it
    assert_eq!(first.series_id, "active-axial");
    assert_eq!(second.series_id, "active-coronal");
}

#[test]
fn test_image_rules_narrow_the_series_to_a_representative_image() {
    let mut axial = series(
        "active-axial",
        &[
            ("Modality", json!("CT")),
            ("SeriesDescription", json!("AXIAL 5MM")),
            ("SeriesNumber", json!(2)),
        ],
    );
    axial.images = vec![
        ImageRecord {
            id: "image-1".to_string(),
            attributes: attributes(&[("InstanceNumber", json!(1)), ("SliceLocation", json!(-10.0))]),
        },
        ImageRecord {
            id: "image-2".to_string(),
            attributes: attributes(&[("InstanceNumber", json!(2)), ("SliceLocation", json!(0.0))]),
        },
        ImageRecord {
            id: "image-3".to_string(),
            attributes: attributes(&[("InstanceNumber", json!(3)), ("SliceLocation", json!(10.0))]),
        },
    ];
    let study = chest_study("active", "20250801", vec![axial]);

    let mut viewport = viewport_matching("AXIAL", true);
    viewport.image_matching_rules.push(Rule::with_operand(
        "SliceLocation",
        "greaterThanOrEquals",
        json!(0.0),
        false,
        1.0,
    ));
    let mut stage = Stage::new("single", ViewportStructure::grid(1, 1));
    stage.viewports.push(viewport);
    let mut protocol = Protocol::new("CT CHEST");
    protocol.add_stage(stage);

    let context = MatchContext::new(study, Vec::new());
    let result = engine_over(vec![])
        .run_with_library(&[protocol], &context)
        .unwrap();

    let display_set = result.viewport_assignments[0].display_set.as_ref().unwrap();
    // image-2 and image-3 tie on score; the lower instance number wins
    assert_eq!(display_set.image_id.as_deref(), Some("image-2"));
    assert_eq!(display_set.image_index, Some(1));
}

#[test]
fn test_fully_vetoed_image_list_falls_back_to_the_first_image() {
    let mut axial = series(
        "active-axial",
        &[("SeriesDescription", json!("AXIAL 5MM"))],
    );
    axial.images = vec![
        ImageRecord {
            id: "image-1".to_string(),
            attributes: attributes(&[("InstanceNumber", json!(1))]),
        },
        ImageRecord {
            id: "image-2".to_string(),
            attributes: attributes(&[("InstanceNumber", json!(2))]),
        },
    ];
    let study = chest_study("active", "20250801", vec![axial]);

    let mut viewport = ViewportDefinition::new();
    viewport.image_matching_rules.push(Rule::with_operand(
        "InstanceNumber",
        "greaterThan",
        json!(100),
        true,
        1.0,
    ));
    let mut stage = Stage::new("single", ViewportStructure::grid(1, 1));
    stage.viewports.push(viewport);
    let mut protocol = Protocol::new("CT CHEST");
    protocol.add_stage(stage);

    let context = MatchContext::new(study, Vec::new());
    let result = engine_over(vec![])
        .run_with_library(&[protocol], &context)
        .unwrap();

    let display_set = result.viewport_assignments[0].display_set.as_ref().unwrap();
    assert_eq!(display_set.image_id.as_deref(), Some("image-1"));
    assert_eq!(display_set.image_index, Some(0));
}

#[tokio::test]
async fn test_run_uses_the_seeded_memory_store() {
    let engine = ProtocolEngine::new(Arc::new(MemoryProtocolStore::new()));
    let context = MatchContext::new(ct_chest("active", "20250801"), Vec::new());

    let result = engine.run(&context).await.unwrap();
    assert_eq!(result.protocol_id, DEFAULT_PROTOCOL_ID);
    assert_eq!(result.filled_viewports(), 1);
}

#[tokio::test]
async fn test_run_degrades_to_the_default_when_the_store_is_unreachable() {
    use crate::backends::stub::FailingTransport;

    let store = Arc::new(ServerProtocolStore::new(Arc::new(FailingTransport)));
    let engine = ProtocolEngine::new(store);
    let context = MatchContext::new(ct_chest("active", "20250801"), Vec::new());

    let result = engine.run(&context).await.unwrap();
    assert_eq!(result.protocol_id, DEFAULT_PROTOCOL_ID);
    assert!(result.issues.contains(&MatchIssue::NoEligibleProtocol));
    assert!(result.viewport_assignments[0].display_set.is_some());
}
