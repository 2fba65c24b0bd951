// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The metadata scope an attribute lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataLevel {
    Study,
    Series,
    Image,
}

impl MetadataLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataLevel::Study => "study",
            MetadataLevel::Series => "series",
            MetadataLevel::Image => "image",
        }
    }
}

/// Newtype wrapper for an entity's attribute map providing type safety
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeMap(pub BTreeMap<String, Value>);

impl AttributeMap {
    /// Create a new empty attribute map
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert an attribute value
    pub fn insert(&mut self, name: &str, value: Value) {
        self.0.insert(name.to_string(), value);
    }

    /// Get an attribute by name; unknown attributes are simply absent
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Get an attribute as a string, accepting numeric values
    pub fn get_text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Get an attribute as an integer, accepting numeric strings
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<BTreeMap<String, Value>> for AttributeMap {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Attribute lookup capability consumed by the matching engine.
///
/// Implementations may fetch lazily over the network; the engine awaits
/// every lookup before scoring, never against partially-loaded metadata.
/// `None` means the provider knows the attributes are unavailable (not
/// pending); the engine then treats dependent rules as non-matching.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn get(&self, level: MetadataLevel, id: &str) -> Option<AttributeMap>;
}
