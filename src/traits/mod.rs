// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod metadata;
pub mod store;

pub use metadata::{AttributeMap, MetadataLevel, MetadataProvider};
pub use store::{ProtocolStore, ProtocolTransport};
