//! Backing Store Boundary
//!
//! The authoritative data service the cache sits in front of. Only the
//! interface lives here; implementations talk to the remote database.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::{CATEGORIES_NAMESPACE, LISTINGS_NAMESPACE, PROFILES_NAMESPACE, SEARCH_NAMESPACE};
use crate::service::Query;

// == Resource Kind ==
/// Logical resource types served through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Listings,
    Profiles,
    Categories,
    Search,
}

impl ResourceKind {
    /// Cache namespace holding this resource.
    pub fn namespace(&self) -> &'static str {
        match self {
            ResourceKind::Listings => LISTINGS_NAMESPACE,
            ResourceKind::Profiles => PROFILES_NAMESPACE,
            ResourceKind::Categories => CATEGORIES_NAMESPACE,
            ResourceKind::Search => SEARCH_NAMESPACE,
        }
    }

    /// Key prefix for a single record looked up by id.
    pub(crate) fn item_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Listings => "listing",
            ResourceKind::Profiles => "profile",
            ResourceKind::Categories => "category",
            ResourceKind::Search => "search",
        }
    }

    /// Key prefix for collection views.
    pub(crate) fn view_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Listings => "listings",
            ResourceKind::Profiles => "profiles",
            ResourceKind::Categories => "categories",
            ResourceKind::Search => "search",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.view_prefix())
    }
}

// == Store Error ==
/// Failures reported by the backing store. Passed through the cache layer
/// untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Backing store unavailable: {0}")]
    Unavailable(String),

    #[error("Backing store rejected the request: {0}")]
    Rejected(String),
}

// == Backing Store Trait ==
/// Authoritative store for marketplace resources.
///
/// Reads must be safe to repeat; the cache may call `fetch` again for the
/// same query after an entry expires or is invalidated.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Reads a resource matching `query`.
    async fn fetch(&self, resource: ResourceKind, query: &Query) -> Result<Value, StoreError>;

    /// Creates (`id == None`) or updates a record, returning the stored form.
    async fn write(
        &self,
        resource: ResourceKind,
        id: Option<&str>,
        payload: Value,
    ) -> Result<Value, StoreError>;

    /// Deletes a record.
    async fn delete(&self, resource: ResourceKind, id: &str) -> Result<(), StoreError>;
}
