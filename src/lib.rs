// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // protocol store backends
pub mod comparators;   // named comparison operators
pub mod config;        // config + runtime builder
pub mod engine;        // matching passes
pub mod errors;        // error handling
pub mod observability;
pub mod protocol;      // the persisted data model
pub mod traits;        // unified abstractions
