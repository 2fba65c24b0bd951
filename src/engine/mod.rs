// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The matching engine.
//!
//! [`MatchContext`] snapshots the study set, [`ProtocolEngine`] runs the
//! pass (protocol scoring, stage selection, viewport assignment),
//! [`MatchSession`] adds stage navigation on top of a pass outcome, and
//! [`PassScheduler`] coalesces bursty triggers so only the newest pass
//! completes.

mod coalesce;
mod context;
mod matcher;
mod pass;
mod session;

#[cfg(test)]
mod integration_tests;

pub use coalesce::PassScheduler;
pub use context::{
    ImageRecord, InMemoryMetadataProvider, MatchContext, SeriesManifest, SeriesRecord,
    StudyManifest, StudyRecord,
};
pub use matcher::{match_rules, MatchDetails, RuleOutcome};
pub use pass::{DisplaySetRef, MatchResult, ProtocolEngine, ViewportAssignment};
pub use session::MatchSession;
