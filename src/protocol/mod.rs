// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The persisted hanging-protocol data model.
//!
//! A [`Protocol`] is the top-level matchable unit: protocol-level matching
//! rules plus an ordered list of [`Stage`]s. Each stage pairs a
//! [`ViewportStructure`] with an ordered list of [`ViewportDefinition`]s,
//! and every viewport carries study/series/image [`Rule`] lists. All of it
//! round-trips through plain JSON documents; these types are read-only
//! inputs to the matching engine and are only cloned when a user edits them.

mod defaults;
mod protocol;
mod rule;
mod stage;
mod viewport;

pub use defaults::default_protocol;
pub use protocol::Protocol;
pub use rule::{Constraint, ConstraintInfo, Rule, ValidatorAndValue};
pub(crate) use rule::parse_int;
pub use stage::{Stage, ViewportStructure};
pub use viewport::ViewportDefinition;

use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of generated entity ids, matching the ids the authoring UI mints.
const ID_LENGTH: usize = 17;

/// Generate a fresh random id for a protocol, stage or rule.
pub(crate) fn fresh_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_are_unique_and_sized() {
        let a = fresh_id();
        let b = fresh_id();
        assert_eq!(a.len(), ID_LENGTH);
        assert_eq!(b.len(), ID_LENGTH);
        assert_ne!(a, b);
    }
}
