// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::protocol::ViewportDefinition;

/// The layout a stage hangs its viewports in.
///
/// Only grid layouts exist today; the tagged representation leaves room for
/// more structure kinds without breaking stored documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewportStructure {
    Grid { rows: usize, columns: usize },
}

impl ViewportStructure {
    pub fn grid(rows: usize, columns: usize) -> Self {
        Self::Grid { rows, columns }
    }

    /// The number of viewport slots this structure requires.
    pub fn num_viewports(&self) -> usize {
        match self {
            ViewportStructure::Grid { rows, columns } => rows * columns,
        }
    }
}

/// One step in a protocol's display sequence: a layout structure plus an
/// ordered list of viewport definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    #[serde(default = "crate::protocol::fresh_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub viewport_structure: ViewportStructure,
    #[serde(default)]
    pub viewports: Vec<ViewportDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

impl Stage {
    pub fn new(name: &str, viewport_structure: ViewportStructure) -> Self {
        Self {
            id: crate::protocol::fresh_id(),
            name: name.to_string(),
            viewport_structure,
            viewports: Vec::new(),
            created_date: None,
        }
    }

    /// Whether the viewport list length matches the declared structure.
    pub fn is_consistent(&self) -> bool {
        self.viewports.len() == self.viewport_structure.num_viewports()
    }

    /// Deep-copy this stage under a fresh id, optionally renaming it.
    /// Nested viewport rules get fresh ids too.
    pub fn create_clone(&self, name: Option<&str>) -> Self {
        Self {
            id: crate::protocol::fresh_id(),
            name: name.unwrap_or(&self.name).to_string(),
            viewport_structure: self.viewport_structure.clone(),
            viewports: self.viewports.iter().map(ViewportDefinition::create_clone).collect(),
            created_date: self.created_date.clone(),
        }
    }
}
