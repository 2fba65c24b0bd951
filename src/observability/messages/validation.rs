// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for protocol library validation warnings.

use crate::errors::ProtocolValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A protocol library failed validation; the individual findings follow.
///
/// # Log Level
/// `warn!` - The library stays usable; offending rules are skipped at
/// match time
///
/// # Example
/// ```
/// use the_lightbox::observability::messages::validation::LibraryValidationFindings;
/// use the_lightbox::observability::messages::StructuredLog;
///
/// let msg = LibraryValidationFindings {
///     protocol_count: 4,
///     findings: &[],
/// };
///
/// msg.log();
/// ```
pub struct LibraryValidationFindings<'a> {
    pub protocol_count: usize,
    pub findings: &'a [ProtocolValidationError],
}

impl Display for LibraryValidationFindings<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validated {} protocols: {} findings",
            self.protocol_count,
            self.findings.len()
        )
    }
}

impl StructuredLog for LibraryValidationFindings<'_> {
    fn log(&self) {
        if self.findings.is_empty() {
            tracing::debug!(protocol_count = self.protocol_count, "{}", self);
            return;
        }
        tracing::warn!(
            protocol_count = self.protocol_count,
            finding_count = self.findings.len(),
            "{}", self
        );
        for finding in self.findings {
            tracing::warn!("{}", finding);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "library_validation",
            name = name,
            protocol_count = self.protocol_count,
            finding_count = self.findings.len(),
        )
    }
}
