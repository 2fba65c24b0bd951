// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for matching pass lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Pass start and completion
//! * Protocol and stage selection
//! * Fallbacks to the default protocol or to partial stage assignment
//! * Pass supersession under coalescing

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A matching pass started over a snapshot of the protocol library.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_lightbox::observability::messages::engine::PassStarted;
/// use the_lightbox::observability::messages::StructuredLog;
///
/// let msg = PassStarted {
///     protocol_count: 4,
///     prior_count: 1,
/// };
///
/// msg.log();
/// ```
pub struct PassStarted {
    pub protocol_count: usize,
    pub prior_count: usize,
}

impl Display for PassStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting matching pass: {} protocols, {} prior studies",
            self.protocol_count, self.prior_count
        )
    }
}

impl StructuredLog for PassStarted {
    fn log(&self) {
        tracing::info!(
            protocol_count = self.protocol_count,
            prior_count = self.prior_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "matching_pass",
            name = name,
            protocol_count = self.protocol_count,
            prior_count = self.prior_count,
        )
    }
}

/// A protocol won the scoring round.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct ProtocolSelected<'a> {
    pub protocol_id: &'a str,
    pub score: f64,
}

impl Display for ProtocolSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Selected protocol '{}' with score {}",
            self.protocol_id, self.score
        )
    }
}

impl StructuredLog for ProtocolSelected<'_> {
    fn log(&self) {
        tracing::debug!(
            protocol_id = self.protocol_id,
            score = self.score,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "protocol_selected",
            name = name,
            protocol_id = self.protocol_id,
            score = self.score,
        )
    }
}

/// A stage was chosen within the winning protocol.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct StageSelected<'a> {
    pub stage_id: &'a str,
    pub stage_index: usize,
    pub fully_satisfiable: bool,
}

impl Display for StageSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Selected stage '{}' (index {}, fully satisfiable: {})",
            self.stage_id, self.stage_index, self.fully_satisfiable
        )
    }
}

impl StructuredLog for StageSelected<'_> {
    fn log(&self) {
        tracing::debug!(
            stage_id = self.stage_id,
            stage_index = self.stage_index,
            fully_satisfiable = self.fully_satisfiable,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stage_selected",
            name = name,
            stage_id = self.stage_id,
            stage_index = self.stage_index,
        )
    }
}

/// The pass fell back to the synthesized default protocol.
///
/// # Log Level
/// `warn!` - Degraded but recoverable condition
pub struct DefaultProtocolFallback<'a> {
    pub reason: &'a str,
}

impl Display for DefaultProtocolFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Falling back to the default protocol: {}", self.reason)
    }
}

impl StructuredLog for DefaultProtocolFallback<'_> {
    fn log(&self) {
        tracing::warn!(reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("default_protocol_fallback", name = name, reason = self.reason)
    }
}

/// A matching pass produced its assignment.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PassCompleted<'a> {
    pub protocol_id: &'a str,
    pub stage_id: &'a str,
    pub filled_viewports: usize,
    pub total_viewports: usize,
}

impl Display for PassCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Matching pass complete: protocol '{}', stage '{}', {}/{} viewports filled",
            self.protocol_id, self.stage_id, self.filled_viewports, self.total_viewports
        )
    }
}

impl StructuredLog for PassCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            protocol_id = self.protocol_id,
            stage_id = self.stage_id,
            filled_viewports = self.filled_viewports,
            total_viewports = self.total_viewports,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pass_completed",
            name = name,
            protocol_id = self.protocol_id,
            stage_id = self.stage_id,
        )
    }
}

/// An in-flight pass was cancelled because a newer trigger arrived.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct PassSuperseded;

impl Display for PassSuperseded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Matching pass superseded by a newer trigger")
    }
}

impl StructuredLog for PassSuperseded {
    fn log(&self) {
        tracing::debug!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("pass_superseded", name = name)
    }
}
