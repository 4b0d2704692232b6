//! Identifiers: resources, users, groups, storage spaces.
//!
//! String fields that are empty are omitted from the JSON encoding, matching
//! the remote's `omitempty` behaviour. An all-empty [`ResourceId`] therefore
//! encodes as `{}`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque address of a resource inside a storage provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    /// Storage provider the resource lives in.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage_id: String,
    /// Provider-internal identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub opaque_id: String,
}

impl ResourceId {
    /// Create a resource id from its two components.
    pub fn new(storage_id: impl Into<String>, opaque_id: impl Into<String>) -> Self {
        Self {
            storage_id: storage_id.into(),
            opaque_id: opaque_id.into(),
        }
    }

    /// Returns true when neither component is set.
    pub fn is_empty(&self) -> bool {
        self.storage_id.is_empty() && self.opaque_id.is_empty()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.storage_id, self.opaque_id)
    }
}

wire_enum! {
    /// Kind of account behind a [`UserId`].
    pub enum UserType {
        #[default]
        Invalid = 0,
        Primary = 1,
        Secondary = 2,
        Service = 3,
        Application = 4,
        Guest = 5,
        Federated = 6,
        Lightweight = 7,
    }
}

/// Identity-provider-qualified user identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId {
    /// Identity provider, e.g. `"0.0.0.0:19000"`.
    #[serde(default)]
    pub idp: String,
    /// Provider-internal identifier.
    #[serde(default)]
    pub opaque_id: String,
    #[serde(rename = "type", default)]
    pub user_type: UserType,
}

impl UserId {
    /// Create a primary-account user id.
    pub fn primary(idp: impl Into<String>, opaque_id: impl Into<String>) -> Self {
        Self {
            idp: idp.into(),
            opaque_id: opaque_id.into(),
            user_type: UserType::Primary,
        }
    }
}

/// Identity-provider-qualified group identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId {
    #[serde(default)]
    pub idp: String,
    #[serde(default)]
    pub opaque_id: String,
}

/// An authenticated user.
///
/// Only `username` reaches the wire (as the `~<username>` path segment); the
/// rest rides along for logging and for storage-space ownership records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: UserId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mail: String,
}

impl User {
    /// Create a user with an id and username.
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: String::new(),
            mail: String::new(),
        }
    }

    /// Create an ownership record carrying only the id.
    pub fn with_id(id: UserId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.id.opaque_id)
    }
}

/// Identifier of a storage space.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageSpaceId {
    #[serde(default)]
    pub opaque_id: String,
}

impl StorageSpaceId {
    pub fn new(opaque_id: impl Into<String>) -> Self {
        Self {
            opaque_id: opaque_id.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_resource_id_encodes_as_empty_object() {
        let json = serde_json::to_string(&ResourceId::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_resource_id_field_order() {
        let json = serde_json::to_string(&ResourceId::new("storage-id", "opaque-id")).unwrap();
        assert_eq!(json, r#"{"storage_id":"storage-id","opaque_id":"opaque-id"}"#);
    }

    #[test]
    fn test_user_id_type_is_integer() {
        let id = UserId::primary("0.0.0.0:19000", "f7fbf8c8-139b-4376-b307-cf0a8c2d0d9c");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(
            json,
            r#"{"idp":"0.0.0.0:19000","opaque_id":"f7fbf8c8-139b-4376-b307-cf0a8c2d0d9c","type":1}"#
        );
    }

    #[test]
    fn test_unknown_user_type_decodes_as_invalid() {
        let id: UserId = serde_json::from_str(r#"{"idp":"x","type":42}"#).unwrap();
        assert_eq!(id.user_type, UserType::Invalid);
        assert_eq!(id.idp, "x");
    }

    #[test]
    fn test_owner_record_encodes_only_id() {
        let owner = User::with_id(UserId::primary("some-idp", "some-opaque-user-id"));
        let json = serde_json::to_string(&owner).unwrap();
        assert_eq!(
            json,
            r#"{"id":{"idp":"some-idp","opaque_id":"some-opaque-user-id","type":1}}"#
        );
    }

    #[test]
    fn test_user_display() {
        let user = User::new(UserId::primary("idp", "abc"), "tester");
        assert_eq!(user.to_string(), "tester (abc)");
    }
}
