// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message is a small struct implementing `Display` for human-readable
//! output and [`StructuredLog`] for field-structured emission through
//! `tracing`. Messages are organized by subsystem:
//!
//! * `engine` - matching pass lifecycle events
//! * `matcher` - rule evaluation events
//! * `store` - protocol store synchronization and persistence
//! * `validation` - protocol library validation warnings
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_lightbox::observability::messages::engine::PassStarted;
//! use the_lightbox::observability::messages::StructuredLog;
//!
//! let msg = PassStarted {
//!     protocol_count: 5,
//!     prior_count: 2,
//! };
//!
//! msg.log();
//! ```

use std::fmt::Display;
use tracing::Span;

pub mod engine;
pub mod matcher;
pub mod store;
pub mod validation;

/// Emission contract for structured log messages.
///
/// `log()` emits the message at its documented level with structured
/// fields; `span()` opens a span carrying the same fields for scoped work.
pub trait StructuredLog: Display {
    fn log(&self);
    fn span(&self, name: &str) -> Span;
}
