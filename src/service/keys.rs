//! Cache Keys
//!
//! Deterministic cache keys built from a resource type and its query
//! parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::service::ResourceKind;

// == Query ==
/// Query parameters for a resource read.
///
/// Parameters are kept sorted by name, and nested JSON objects serialise
/// with sorted keys, so equal queries always produce the same cache key
/// whatever order they were built in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, Value>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query for a single record.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().with("id", id.into())
    }

    /// Adds a parameter, replacing any previous value under `name`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The record id when this query is exactly a lookup by id.
    pub fn id(&self) -> Option<&str> {
        if self.0.len() != 1 {
            return None;
        }
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn canonical(&self) -> String {
        // A map of strings to JSON values always serialises
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

// == Key Builders ==
/// Cache key for a single record: `listing:42`.
pub fn item_key(resource: ResourceKind, id: &str) -> String {
    format!("{}:{}", resource.item_prefix(), id)
}

/// Cache key for `query`.
///
/// Plain id lookups map to the item key so writes can delete them
/// precisely; everything else becomes a view key such as
/// `listings:{"category":"bikes"}`.
pub fn cache_key(resource: ResourceKind, query: &Query) -> String {
    match (resource, query.id()) {
        (ResourceKind::Search, _) | (_, None) => {
            format!("{}:{}", resource.view_prefix(), query.canonical())
        }
        (_, Some(id)) => item_key(resource, id),
    }
}

/// Regular expression matching every view key of `resource`.
pub fn views_pattern(resource: ResourceKind) -> String {
    format!("^{}:", regex::escape(resource.view_prefix()))
}
