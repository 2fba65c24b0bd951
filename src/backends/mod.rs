// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod memory;
pub mod server;
pub mod stub;

pub use memory::MemoryProtocolStore;
pub use server::ServerProtocolStore;
pub use stub::{FailingTransport, StubTransport};
