// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and
//! operational logging throughout the matching engine. Message types follow
//! a struct-based pattern with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Enable future internationalization without code changes
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - matching pass lifecycle events
//! * `messages::matcher` - rule evaluation events
//! * `messages::store` - protocol store synchronization and persistence
//! * `messages::validation` - protocol library validation warnings

pub mod messages;
