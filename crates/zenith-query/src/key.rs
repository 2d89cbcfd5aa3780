//! Semantic cache keys.

use std::collections::BTreeMap;
use std::fmt;

/// Identifies a query: a resource name plus its filter parameters.
///
/// Parameters are kept sorted so keys built in different orders compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    resource: String,
    params: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a filter parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_order_does_not_matter() {
        let a = QueryKey::new("experiments").param("project_id", 3).param("limit", 10);
        let b = QueryKey::new("experiments").param("limit", 10).param("project_id", 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_display() {
        assert_eq!(QueryKey::new("projects").to_string(), "projects");
        let key = QueryKey::new("models").param("project_id", 7).param("a", "b");
        assert_eq!(key.to_string(), "models?a=b&project_id=7");
    }
}
