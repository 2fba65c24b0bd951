// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod matching;
mod store;
mod validation;

pub use matching::{MatchError, MatchIssue};
pub use store::StoreError;
pub use validation::ProtocolValidationError;
