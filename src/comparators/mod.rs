// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod registry;

pub use registry::{ComparatorFn, ComparatorRegistry, RegistrationError};
