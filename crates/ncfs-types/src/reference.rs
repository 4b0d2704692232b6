//! References: the target of almost every storage operation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::ResourceId;

/// Identifies a filesystem entry by resource id, by path, or both.
///
/// On the wire `resource_id` comes first and is omitted when `None`; `path`
/// follows and is omitted when empty. A reference with neither set is
/// representable (it encodes as `{}`) but never valid as an operation target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

impl Reference {
    /// Reference by both id and path.
    pub fn new(resource_id: ResourceId, path: impl Into<String>) -> Self {
        Self {
            resource_id: Some(resource_id),
            path: path.into(),
        }
    }

    /// Reference by path only.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            resource_id: None,
            path: path.into(),
        }
    }

    /// Reference by id only.
    pub fn id(resource_id: ResourceId) -> Self {
        Self {
            resource_id: Some(resource_id),
            path: String::new(),
        }
    }

    /// At least one of id or path must be present.
    pub fn is_valid(&self) -> bool {
        self.resource_id.is_some() || !self.path.is_empty()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.resource_id, self.path.is_empty()) {
            (Some(id), true) => write!(f, "{id}"),
            (Some(id), false) => write!(f, "{id}:{}", self.path),
            (None, _) => f.write_str(&self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_reference_encoding() {
        let r = Reference::new(ResourceId::new("storage-id", "opaque-id"), "/some/path");
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"resource_id":{"storage_id":"storage-id","opaque_id":"opaque-id"},"path":"/some/path"}"#
        );
    }

    #[test]
    fn test_path_only_reference_omits_id() {
        let r = Reference::path("/subdir");
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"path":"/subdir"}"#);
    }

    #[test]
    fn test_id_only_reference_omits_path() {
        let r = Reference::id(ResourceId::new("s", "o"));
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"resource_id":{"storage_id":"s","opaque_id":"o"}}"#
        );
    }

    #[test]
    fn test_validity() {
        assert!(Reference::path("/a").is_valid());
        assert!(Reference::id(ResourceId::default()).is_valid());
        assert!(!Reference::default().is_valid());
    }

    #[test]
    fn test_decode_empty_resource_id_object() {
        let r: Reference =
            serde_json::from_str(r#"{"resource_id":{},"path":"/some/file.txt"}"#).unwrap();
        assert_eq!(r.resource_id, Some(ResourceId::default()));
        assert_eq!(r.path, "/some/file.txt");
    }

    #[test]
    fn test_display() {
        assert_eq!(Reference::path("/a/b").to_string(), "/a/b");
        assert_eq!(
            Reference::new(ResourceId::new("s", "o"), "/a").to_string(),
            "s!o:/a"
        );
    }
}
