// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The matching pass: protocol scoring, stage selection and viewport
//! assignment.
//!
//! A pass runs over an immutable [`MatchContext`] and a snapshot of the
//! protocol library:
//!
//! 1. **Protocol scoring** - every stored protocol whose prior requirement
//!    the context can satisfy is scored against the active study; required
//!    rule failures veto, ties keep the earlier protocol. With no eligible
//!    protocol the synthesized default is used, so a layout always exists.
//! 2. **Stage selection** - the first stage whose every viewport has at
//!    least one content candidate wins; when none does, the first stage is
//!    hung with partial assignments.
//! 3. **Viewport assignment** - each viewport ranks (study, series)
//!    candidates by score, then study recency, then series number, avoiding
//!    content already hung in an earlier viewport, and narrows the winning
//!    series to a representative image.

use std::collections::HashSet;
use std::sync::Arc;

use crate::comparators::ComparatorRegistry;
use crate::config::consts::{INSTANCE_NUMBER_ATTRIBUTE, SERIES_NUMBER_ATTRIBUTE};
use crate::engine::context::{MatchContext, SeriesRecord, StudyRecord};
use crate::engine::matcher::{match_rules, MatchDetails};
use crate::errors::{MatchError, MatchIssue};
use crate::observability::messages::engine::{
    DefaultProtocolFallback, PassCompleted, PassStarted, ProtocolSelected, StageSelected,
};
use crate::observability::messages::StructuredLog;
use crate::protocol::{default_protocol, Protocol, ViewportDefinition};
use crate::traits::ProtocolStore;

/// The content hung in one viewport: a series within a study, narrowed to
/// a representative image when the series has images.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySetRef {
    pub study_id: String,
    pub series_id: String,
    pub image_id: Option<String>,
    pub image_index: Option<usize>,
}

/// One viewport's assignment: the chosen content (if any candidate
/// survived) and the match details that ranked it first.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportAssignment {
    pub viewport_index: usize,
    pub display_set: Option<DisplaySetRef>,
    pub details: MatchDetails,
}

/// The outcome of a matching pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub protocol_id: String,
    pub score: f64,
    pub stage_id: String,
    pub stage_index: usize,
    pub viewport_assignments: Vec<ViewportAssignment>,
    pub issues: Vec<MatchIssue>,
}

impl MatchResult {
    pub fn filled_viewports(&self) -> usize {
        self.viewport_assignments
            .iter()
            .filter(|assignment| assignment.display_set.is_some())
            .count()
    }
}

/// The matching engine: a comparator registry plus the protocol store the
/// library snapshot is taken from.
pub struct ProtocolEngine {
    registry: ComparatorRegistry,
    store: Arc<dyn ProtocolStore>,
}

impl ProtocolEngine {
    /// Create an engine over a store with the builtin comparator registry.
    pub fn new(store: Arc<dyn ProtocolStore>) -> Self {
        Self::with_registry(store, ComparatorRegistry::builtin())
    }

    /// Create an engine with a caller-extended comparator registry.
    pub fn with_registry(store: Arc<dyn ProtocolStore>, registry: ComparatorRegistry) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &ComparatorRegistry {
        &self.registry
    }

    /// Run a matching pass against the store's current library.
    ///
    /// An unready store is not fatal: the pass runs over whatever the store
    /// can snapshot (possibly nothing), falling back to the default
    /// protocol rather than leaving the viewer blank.
    pub async fn run(&self, context: &MatchContext) -> Result<MatchResult, MatchError> {
        if let Err(error) = self.store.ready().await {
            let reason = format!("protocol store unavailable: {}", error);
            DefaultProtocolFallback { reason: &reason }.log();
        }
        self.run_with_library(&self.store.all_protocols(), context)
    }

    /// Run a matching pass against an explicit library snapshot.
    pub fn run_with_library(
        &self,
        protocols: &[Protocol],
        context: &MatchContext,
    ) -> Result<MatchResult, MatchError> {
        PassStarted {
            protocol_count: protocols.len(),
            prior_count: context.available_priors(),
        }
        .log();

        let mut issues = Vec::new();
        let (protocol, score) = self.select_protocol(protocols, context, &mut issues);

        let protocol = if protocol.stages.is_empty() {
            absorb(
                &mut issues,
                vec![MatchIssue::UnsatisfiableStage {
                    protocol_id: protocol.id.clone(),
                }],
            );
            DefaultProtocolFallback {
                reason: "selected protocol has no stages",
            }
            .log();
            default_protocol()
        } else {
            protocol
        };
        if protocol.stages.is_empty() {
            return Err(MatchError::NoUsableProtocol);
        }

        ProtocolSelected {
            protocol_id: &protocol.id,
            score,
        }
        .log();

        let (stage_index, fully_satisfiable) = self.select_stage(&protocol, context);
        if !fully_satisfiable {
            absorb(
                &mut issues,
                vec![MatchIssue::UnsatisfiableStage {
                    protocol_id: protocol.id.clone(),
                }],
            );
        }
        let stage = &protocol.stages[stage_index];
        StageSelected {
            stage_id: &stage.id,
            stage_index,
            fully_satisfiable,
        }
        .log();

        let viewport_assignments = self.assign_stage(&protocol, stage_index, context, &mut issues);

        let result = MatchResult {
            protocol_id: protocol.id.clone(),
            score,
            stage_id: stage.id.clone(),
            stage_index,
            viewport_assignments,
            issues,
        };

        PassCompleted {
            protocol_id: &result.protocol_id,
            stage_id: &result.stage_id,
            filled_viewports: result.filled_viewports(),
            total_viewports: result.viewport_assignments.len(),
        }
        .log();

        Ok(result)
    }

    /// Re-hang an explicit stage of a protocol, e.g. for stage navigation.
    /// Returns `None` when the stage index is out of bounds.
    pub fn hang_stage(
        &self,
        protocol: &Protocol,
        stage_index: usize,
        context: &MatchContext,
    ) -> Option<MatchResult> {
        let stage = protocol.stages.get(stage_index)?;
        let mut issues = Vec::new();
        let rules = context.resolve_prior_rules(&protocol.protocol_matching_rules);
        let details = match_rules(&rules, &context.active().attributes, &self.registry);
        absorb(&mut issues, details.issues);
        let viewport_assignments = self.assign_stage(protocol, stage_index, context, &mut issues);

        Some(MatchResult {
            protocol_id: protocol.id.clone(),
            score: details.score,
            stage_id: stage.id.clone(),
            stage_index,
            viewport_assignments,
            issues,
        })
    }

    /// Fetch a protocol from the store by id, or the synthesized default
    /// when the store does not hold it (the default protocol a pass fell
    /// back to is never stored).
    pub fn resolve_protocol(&self, id: &str) -> Protocol {
        self.store.get_protocol(id).unwrap_or_else(default_protocol)
    }

    /// Score every eligible protocol and keep the best. A strict greater-
    /// than keeps the earliest declared protocol on ties.
    fn select_protocol(
        &self,
        protocols: &[Protocol],
        context: &MatchContext,
        issues: &mut Vec<MatchIssue>,
    ) -> (Protocol, f64) {
        let mut best: Option<(usize, f64)> = None;

        for (index, protocol) in protocols.iter().enumerate() {
            if protocol.number_of_priors_referenced() as usize > context.available_priors() {
                continue;
            }

            let rules = context.resolve_prior_rules(&protocol.protocol_matching_rules);
            let details = match_rules(&rules, &context.active().attributes, &self.registry);
            absorb(issues, details.issues);
            if details.required_failed {
                continue;
            }
            if best.map(|(_, score)| details.score > score).unwrap_or(true) {
                best = Some((index, details.score));
            }
        }

        match best {
            Some((index, score)) => (protocols[index].clone(), score),
            None => {
                absorb(issues, vec![MatchIssue::NoEligibleProtocol]);
                DefaultProtocolFallback {
                    reason: "no stored protocol was eligible for this study",
                }
                .log();
                (default_protocol(), 0.0)
            }
        }
    }

    /// The first stage whose every viewport has at least one candidate, or
    /// the first stage with `false` when none is fully satisfiable.
    fn select_stage(&self, protocol: &Protocol, context: &MatchContext) -> (usize, bool) {
        for (index, stage) in protocol.stages.iter().enumerate() {
            let satisfiable = stage.viewports.iter().all(|viewport| {
                !self.viewport_candidates(viewport, context).is_empty()
            });
            if satisfiable {
                return (index, true);
            }
        }
        (0, false)
    }

    fn assign_stage(
        &self,
        protocol: &Protocol,
        stage_index: usize,
        context: &MatchContext,
        issues: &mut Vec<MatchIssue>,
    ) -> Vec<ViewportAssignment> {
        let stage = &protocol.stages[stage_index];
        // Content already hung in an earlier viewport of this stage
        let mut used: HashSet<(&str, &str)> = HashSet::new();
        let mut assignments = Vec::with_capacity(stage.viewports.len());

        for (viewport_index, viewport) in stage.viewports.iter().enumerate() {
            let candidates = self.viewport_candidates(viewport, context);
            for candidate in &candidates {
                absorb(issues, candidate.details.issues.clone());
            }

            let chosen = candidates
                .iter()
                .find(|candidate| {
                    !used.contains(&(candidate.study.id.as_str(), candidate.series.id.as_str()))
                })
                // Every candidate is already hung; repeating the best one
                // beats an empty viewport
                .or_else(|| candidates.first());

            let assignment = match chosen {
                Some(candidate) => {
                    used.insert((candidate.study.id.as_str(), candidate.series.id.as_str()));
                    let (image_id, image_index) =
                        self.select_image(viewport, candidate.series, context, issues);
                    ViewportAssignment {
                        viewport_index,
                        display_set: Some(DisplaySetRef {
                            study_id: candidate.study.id.clone(),
                            series_id: candidate.series.id.clone(),
                            image_id,
                            image_index,
                        }),
                        details: candidate.details.clone(),
                    }
                }
                None => ViewportAssignment {
                    viewport_index,
                    display_set: None,
                    details: MatchDetails::default(),
                },
            };
            assignments.push(assignment);
        }

        assignments
    }

    /// Rank every (study, series) pair for a viewport.
    ///
    /// Candidates vetoed by a required study or series rule are dropped;
    /// the rest sort by score descending, study recency descending, series
    /// number ascending. The sort is stable, so full ties keep the study
    /// enumeration order (active study first).
    fn viewport_candidates<'a>(
        &self,
        viewport: &ViewportDefinition,
        context: &'a MatchContext,
    ) -> Vec<Candidate<'a>> {
        let study_rules = context.resolve_prior_rules(&viewport.study_matching_rules);
        let series_rules = context.resolve_prior_rules(&viewport.series_matching_rules);
        let mut candidates = Vec::new();

        for study in context.studies() {
            let study_details = match_rules(&study_rules, &study.attributes, &self.registry);
            if study_details.required_failed {
                continue;
            }
            for series in &study.series {
                let series_details =
                    match_rules(&series_rules, &series.attributes, &self.registry);
                if series_details.required_failed {
                    continue;
                }
                candidates.push(Candidate {
                    study,
                    series,
                    chronology: study.chronology_key(),
                    series_number: series
                        .attributes
                        .get_int(SERIES_NUMBER_ATTRIBUTE)
                        .unwrap_or(i64::MAX),
                    details: study_details.clone().merge(series_details),
                });
            }
        }

        candidates.sort_by(|a, b| {
            b.details
                .score
                .total_cmp(&a.details.score)
                .then_with(|| b.chronology.cmp(&a.chronology))
                .then_with(|| a.series_number.cmp(&b.series_number))
        });
        candidates
    }

    /// Narrow the winning series to a representative image.
    ///
    /// Image rules only rank images inside the already-chosen series; they
    /// never reopen the series choice. Images vetoed by a required rule
    /// are excluded, ties break on `InstanceNumber` ascending, and when
    /// every image is vetoed the series' first image stands in.
    fn select_image(
        &self,
        viewport: &ViewportDefinition,
        series: &SeriesRecord,
        context: &MatchContext,
        issues: &mut Vec<MatchIssue>,
    ) -> (Option<String>, Option<usize>) {
        if series.images.is_empty() {
            return (None, None);
        }

        let rules = context.resolve_prior_rules(&viewport.image_matching_rules);
        let mut ranked: Vec<(usize, f64, i64)> = Vec::new();
        for (index, image) in series.images.iter().enumerate() {
            let details = match_rules(&rules, &image.attributes, &self.registry);
            absorb(issues, details.issues);
            if details.required_failed {
                continue;
            }
            ranked.push((
                index,
                details.score,
                image
                    .attributes
                    .get_int(INSTANCE_NUMBER_ATTRIBUTE)
                    .unwrap_or(i64::MAX),
            ));
        }
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.2.cmp(&b.2)));

        let index = ranked.first().map(|&(index, ..)| index).unwrap_or(0);
        (Some(series.images[index].id.clone()), Some(index))
    }
}

struct Candidate<'a> {
    study: &'a StudyRecord,
    series: &'a SeriesRecord,
    chronology: String,
    series_number: i64,
    details: MatchDetails,
}

/// Collect issues without repeating ones already reported; the same
/// malformed rule surfaces once per pass, not once per candidate.
fn absorb(issues: &mut Vec<MatchIssue>, new: Vec<MatchIssue>) {
    for issue in new {
        if !issues.contains(&issue) {
            issues.push(issue);
        }
    }
}
