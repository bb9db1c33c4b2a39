//! Cache key generation.
//!
//! Keys are rendered as `resource[/id][?name=value&...]`. Parameters are kept
//! in a `BTreeMap` and percent-encoded, so the same query always yields the
//! same key regardless of insertion order, and distinct queries never collide.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CacheError, Result};

// == Resource ==
/// Resource types served through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Risks,
    Categories,
    Resources,
    Skills,
    Budgets,
    Dashboard,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Risks,
        Resource::Categories,
        Resource::Resources,
        Resource::Skills,
        Resource::Budgets,
        Resource::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Risks => "risks",
            Resource::Categories => "categories",
            Resource::Resources => "resources",
            Resource::Skills => "skills",
            Resource::Budgets => "budgets",
            Resource::Dashboard => "dashboard",
        }
    }

    /// Returns true if `key` was built for this resource.
    pub fn owns(&self, key: &str) -> bool {
        match key.strip_prefix(self.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        Resource::ALL
            .into_iter()
            .find(|resource| resource.as_str() == s)
            .ok_or_else(|| CacheError::InvalidRequest(format!("Unknown resource: {}", s)))
    }
}

// == Cache Key ==
/// Deterministic key for one resource query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    resource: Resource,
    id: Option<String>,
    params: BTreeMap<String, String>,
}

impl CacheKey {
    /// Key for a collection listing.
    pub fn list(resource: Resource) -> Self {
        Self {
            resource,
            id: None,
            params: BTreeMap::new(),
        }
    }

    /// Key for a single item.
    pub fn item(resource: Resource, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::list(resource)
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn with_params<I, K, T>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: ToString,
    {
        for (name, value) in params {
            self.params.insert(name.into(), value.to_string());
        }
        self
    }

    /// Adds every top-level field of a serializable filter object.
    ///
    /// Null fields are skipped; strings are used verbatim and other values
    /// in their JSON form.
    pub fn with_filter<T: Serialize>(mut self, filter: &T) -> Result<Self> {
        let value = serde_json::to_value(filter)
            .map_err(|e| CacheError::InvalidRequest(format!("Unserializable filter: {}", e)))?;

        let Value::Object(fields) = value else {
            return Err(CacheError::InvalidRequest(
                "Filter must serialize to an object".to_string(),
            ));
        };

        for (name, field) in fields {
            match field {
                Value::Null => {}
                Value::String(s) => {
                    self.params.insert(name, s);
                }
                other => {
                    self.params.insert(name, other.to_string());
                }
            }
        }
        Ok(self)
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Path of the resource relative to an API root, e.g. `risks/42`.
    pub fn path(&self) -> String {
        match &self.id {
            Some(id) => format!("{}/{}", self.resource, urlencoding::encode(id)),
            None => self.resource.to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())?;

        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(
                f,
                "{}{}={}",
                sep,
                urlencoding::encode(name),
                urlencoding::encode(value)
            )?;
        }
        Ok(())
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn test_list_and_item_keys() {
        assert_eq!(CacheKey::list(Resource::Risks).to_string(), "risks");
        assert_eq!(CacheKey::item(Resource::Skills, "7").to_string(), "skills/7");
    }

    #[test]
    fn test_params_are_order_independent() {
        let a = CacheKey::list(Resource::Budgets)
            .with_param("year", 2024)
            .with_param("owner", "ana");
        let b = CacheKey::list(Resource::Budgets)
            .with_params([("owner", "ana"), ("year", "2024")]);

        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "budgets?owner=ana&year=2024");
    }

    #[test]
    fn test_special_characters_do_not_collide() {
        let a = CacheKey::list(Resource::Risks).with_param("q", "a&b=c");
        let b = CacheKey::list(Resource::Risks)
            .with_param("q", "a")
            .with_param("b", "c");

        assert_ne!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "risks?q=a%26b%3Dc");
    }

    #[test]
    fn test_item_id_is_encoded() {
        let key = CacheKey::item(Resource::Resources, "a/b");
        assert_eq!(key.to_string(), "resources/a%2Fb");
        assert_eq!(key.id(), Some("a/b"));
    }

    #[derive(Serialize)]
    struct RiskFilter {
        status: Option<String>,
        severity: u8,
        archived: bool,
        owner: Option<String>,
    }

    #[test]
    fn test_with_filter_flattens_object() {
        let filter = RiskFilter {
            status: Some("open".to_string()),
            severity: 3,
            archived: false,
            owner: None,
        };
        let key = CacheKey::list(Resource::Risks).with_filter(&filter).unwrap();

        assert_eq!(key.to_string(), "risks?archived=false&severity=3&status=open");
    }

    #[test]
    fn test_with_filter_rejects_non_object() {
        let result = CacheKey::list(Resource::Risks).with_filter(&vec![1, 2]);
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[test]
    fn test_resource_from_str() {
        for resource in Resource::ALL {
            assert_eq!(resource.as_str().parse::<Resource>().unwrap(), resource);
        }
        assert!(matches!(
            "projects".parse::<Resource>(),
            Err(CacheError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_resource_owns() {
        assert!(Resource::Risks.owns("risks"));
        assert!(Resource::Risks.owns("risks/1"));
        assert!(Resource::Risks.owns("risks?page=2"));
        assert!(!Resource::Risks.owns("risks_archive"));
        assert!(!Resource::Resources.owns("risks"));
    }
}
