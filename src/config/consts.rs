// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Pseudo attribute carrying how many studies back a prior sits
/// (0 = the active study, 1 = most recent prior)
pub const ABSTRACT_PRIOR_ATTRIBUTE: &str = "abstractPriorValue";
/// Id of the catch-all default protocol
pub const DEFAULT_PROTOCOL_ID: &str = "defaultProtocol";
/// Weight applied to rules that do not declare one
pub const DEFAULT_RULE_WEIGHT: f64 = 1.0;

/// DICOM attributes used for chronological ordering and tie-breaking
pub const STUDY_DATE_ATTRIBUTE: &str = "StudyDate";
pub const STUDY_TIME_ATTRIBUTE: &str = "StudyTime";
pub const SERIES_NUMBER_ATTRIBUTE: &str = "SeriesNumber";
pub const INSTANCE_NUMBER_ATTRIBUTE: &str = "InstanceNumber";
