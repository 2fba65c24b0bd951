// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for protocol store backends and transports.
//!
//! All variants implement `std::error::Error` via the `thiserror` crate for
//! consistent error handling across backends.

use thiserror::Error;

/// Errors that can occur while reading from or writing to a protocol store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No protocol with the given id exists in the store
    #[error("protocol '{0}' not found")]
    NotFound(String),

    /// A protocol with the given id already exists in the store
    #[error("protocol '{0}' already exists")]
    Duplicate(String),

    /// The protocol is locked and cannot be modified or removed
    #[error("protocol '{0}' is locked")]
    Locked(String),

    /// The backing transport failed; cached protocols remain usable
    #[error("protocol transport failure: {0}")]
    Transport(String),
}
