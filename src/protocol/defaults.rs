// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_PROTOCOL_ID;
use crate::protocol::{Protocol, Stage, ViewportDefinition, ViewportStructure};

/// The catch-all single-viewport protocol.
///
/// It carries no matching rules, so it scores zero and stays eligible for
/// any study. The memory backend seeds it on first use, and the engine
/// synthesizes the same shape when the library is empty or every stored
/// protocol has been disqualified — the viewer never shows a blank layout.
pub fn default_protocol() -> Protocol {
    let mut stage = Stage::new("default", ViewportStructure::grid(1, 1));
    stage.viewports.push(ViewportDefinition::new());

    let mut protocol = Protocol::new("Default");
    protocol.id = DEFAULT_PROTOCOL_ID.to_string();
    protocol.locked = true;
    protocol.stages.push(stage);
    protocol
}
