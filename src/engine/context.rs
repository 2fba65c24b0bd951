// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The immutable input snapshot of one matching pass.
//!
//! A [`MatchContext`] holds the active study and its prior studies with all
//! attribute maps fully resolved, so scoring never awaits mid-pass. Priors
//! are ordered most-recent-first by DICOM `StudyDate`/`StudyTime` (both are
//! zero-padded strings, so lexicographic order is chronological order), and
//! every entity is stamped with the abstract-prior pseudo attribute: `0`
//! for the active study, `1` for the most recent prior, and so on. Rules
//! against that attribute then evaluate like any other rule.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::consts::{
    ABSTRACT_PRIOR_ATTRIBUTE, STUDY_DATE_ATTRIBUTE, STUDY_TIME_ATTRIBUTE,
};
use crate::errors::MatchIssue;
use crate::protocol::{parse_int, Rule};
use crate::traits::{AttributeMap, MetadataLevel, MetadataProvider};

/// One image and its resolved attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    #[serde(default)]
    pub attributes: AttributeMap,
}

/// One series, its resolved attributes and its images in acquisition order.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesRecord {
    pub id: String,
    #[serde(default)]
    pub attributes: AttributeMap,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

/// One study, its resolved attributes and its series.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyRecord {
    pub id: String,
    #[serde(default)]
    pub attributes: AttributeMap,
    #[serde(default)]
    pub series: Vec<SeriesRecord>,
}

impl StudyRecord {
    /// Lexicographic chronology key from `StudyDate` + `StudyTime`.
    /// Studies without a date sort oldest.
    pub fn chronology_key(&self) -> String {
        let date = self.attributes.get_text(STUDY_DATE_ATTRIBUTE).unwrap_or_default();
        let time = self.attributes.get_text(STUDY_TIME_ATTRIBUTE).unwrap_or_default();
        format!("{}{}", date, time)
    }

    fn stamp_prior_value(&mut self, prior_value: i64) {
        self.attributes.insert(ABSTRACT_PRIOR_ATTRIBUTE, json!(prior_value));
        for series in &mut self.series {
            series.attributes.insert(ABSTRACT_PRIOR_ATTRIBUTE, json!(prior_value));
            for image in &mut series.images {
                image.attributes.insert(ABSTRACT_PRIOR_ATTRIBUTE, json!(prior_value));
            }
        }
    }
}

/// The identifier skeleton of a study, used to drive metadata collection.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyManifest {
    pub id: String,
    #[serde(default)]
    pub series: Vec<SeriesManifest>,
}

/// The identifier skeleton of a series.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesManifest {
    pub id: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// The fully-resolved input of one matching pass.
#[derive(Debug, Clone)]
pub struct MatchContext {
    active: StudyRecord,
    priors: Vec<StudyRecord>,
}

impl MatchContext {
    /// Build a context from the active study and any other known studies.
    ///
    /// A duplicate of the active study among the others is dropped. The
    /// remaining studies become the prior list, sorted most-recent-first,
    /// and every entity is stamped with its abstract-prior value.
    pub fn new(mut active: StudyRecord, others: Vec<StudyRecord>) -> Self {
        let mut priors: Vec<StudyRecord> = others
            .into_iter()
            .filter(|study| study.id != active.id)
            .collect();
        priors.sort_by(|a, b| b.chronology_key().cmp(&a.chronology_key()));

        active.stamp_prior_value(0);
        for (index, prior) in priors.iter_mut().enumerate() {
            prior.stamp_prior_value(index as i64 + 1);
        }

        Self { active, priors }
    }

    /// Resolve every study's attributes through a metadata provider.
    ///
    /// Entities whose attributes the provider reports unavailable keep an
    /// empty attribute map (their rules evaluate as non-matches) and are
    /// reported as issues alongside the context.
    pub async fn collect(
        provider: &dyn MetadataProvider,
        active: &StudyManifest,
        priors: &[StudyManifest],
    ) -> (Self, Vec<MatchIssue>) {
        let mut issues = Vec::new();
        let active = collect_study(provider, active, &mut issues).await;
        let mut others = Vec::with_capacity(priors.len());
        for manifest in priors {
            others.push(collect_study(provider, manifest, &mut issues).await);
        }
        (Self::new(active, others), issues)
    }

    pub fn active(&self) -> &StudyRecord {
        &self.active
    }

    pub fn priors(&self) -> &[StudyRecord] {
        &self.priors
    }

    pub fn available_priors(&self) -> usize {
        self.priors.len()
    }

    /// All studies in matching order: the active study first, then priors
    /// most-recent-first.
    pub fn studies(&self) -> impl Iterator<Item = &StudyRecord> {
        std::iter::once(&self.active).chain(self.priors.iter())
    }

    /// Rewrite abstract-prior equality rules with a negative operand into
    /// the concrete index of the oldest prior. An operand of `-1` means
    /// "the oldest available prior", which only has a concrete index once
    /// the prior list is known. Without priors the rule is left negative
    /// and can never match a stamped index.
    pub fn resolve_prior_rules(&self, rules: &[Rule]) -> Vec<Rule> {
        rules
            .iter()
            .map(|rule| self.resolve_prior_rule(rule))
            .collect()
    }

    fn resolve_prior_rule(&self, rule: &Rule) -> Rule {
        if !rule.is_prior_reference() || self.priors.is_empty() {
            return rule.clone();
        }
        // Operands arrive as numbers or numeric strings; coerce the same way
        // count_referenced_priors does so gating and resolution agree.
        let negative_equality = rule.validator_and_value().is_some_and(|vv| {
            crate::comparators::ComparatorRegistry::is_equality(&vv.validator)
                && parse_int(&vv.value).is_some_and(|operand| operand < 0)
        });
        if !negative_equality {
            return rule.clone();
        }

        let mut resolved = rule.clone();
        let mut options = std::collections::BTreeMap::new();
        options.insert("value".to_string(), json!(self.priors.len()));
        let mut constraint = crate::protocol::Constraint::new();
        constraint.insert("equals".to_string(), options);
        resolved.set_constraint(constraint);
        resolved
    }
}

async fn collect_study(
    provider: &dyn MetadataProvider,
    manifest: &StudyManifest,
    issues: &mut Vec<MatchIssue>,
) -> StudyRecord {
    let attributes = fetch(provider, MetadataLevel::Study, &manifest.id, issues).await;
    let mut series = Vec::with_capacity(manifest.series.len());
    for series_manifest in &manifest.series {
        let series_attributes =
            fetch(provider, MetadataLevel::Series, &series_manifest.id, issues).await;
        let mut images = Vec::with_capacity(series_manifest.images.len());
        for image_id in &series_manifest.images {
            let image_attributes = fetch(provider, MetadataLevel::Image, image_id, issues).await;
            images.push(ImageRecord {
                id: image_id.clone(),
                attributes: image_attributes,
            });
        }
        series.push(SeriesRecord {
            id: series_manifest.id.clone(),
            attributes: series_attributes,
            images,
        });
    }
    StudyRecord {
        id: manifest.id.clone(),
        attributes,
        series,
    }
}

async fn fetch(
    provider: &dyn MetadataProvider,
    level: MetadataLevel,
    id: &str,
    issues: &mut Vec<MatchIssue>,
) -> AttributeMap {
    match provider.get(level, id).await {
        Some(attributes) => attributes,
        None => {
            issues.push(MatchIssue::MetadataUnavailable {
                level: level.as_str(),
                id: id.to_string(),
            });
            AttributeMap::new()
        }
    }
}

/// A [`MetadataProvider`] backed by in-process maps.
///
/// Used by the demo binary and by tests; a deployment would put a DICOMweb
/// client behind the same trait.
#[derive(Debug, Default)]
pub struct InMemoryMetadataProvider {
    studies: HashMap<String, AttributeMap>,
    series: HashMap<String, AttributeMap>,
    images: HashMap<String, AttributeMap>,
}

impl InMemoryMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, level: MetadataLevel, id: &str, attributes: AttributeMap) {
        let map = match level {
            MetadataLevel::Study => &mut self.studies,
            MetadataLevel::Series => &mut self.series,
            MetadataLevel::Image => &mut self.images,
        };
        map.insert(id.to_string(), attributes);
    }
}

#[async_trait]
impl MetadataProvider for InMemoryMetadataProvider {
    async fn get(&self, level: MetadataLevel, id: &str) -> Option<AttributeMap> {
        let map = match level {
            MetadataLevel::Study => &self.studies,
            MetadataLevel::Series => &self.series,
            MetadataLevel::Image => &self.images,
        };
        map.get(id).cloned()
    }
}
