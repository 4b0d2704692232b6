//! Access grants.

use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, UserId};
use crate::permissions::ResourcePermissions;

wire_enum! {
    pub enum GranteeType {
        #[default]
        Invalid = 0,
        User = 1,
        Group = 2,
    }
}

/// The identity on the receiving end of a grant.
///
/// Encodes as the externally tagged union the remote expects:
/// `{"UserId":{..}}` or `{"GroupId":{..}}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GranteeId {
    UserId(UserId),
    GroupId(GroupId),
}

/// Who a grant applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grantee {
    #[serde(rename = "type", default)]
    pub grantee_type: GranteeType,
    #[serde(rename = "Id")]
    pub id: GranteeId,
}

impl Grantee {
    pub fn user(id: UserId) -> Self {
        Self {
            grantee_type: GranteeType::User,
            id: GranteeId::UserId(id),
        }
    }

    pub fn group(id: GroupId) -> Self {
        Self {
            grantee_type: GranteeType::Group,
            id: GranteeId::GroupId(id),
        }
    }

    /// The user id, if this grantee is a user.
    pub fn user_id(&self) -> Option<&UserId> {
        match &self.id {
            GranteeId::UserId(id) => Some(id),
            GranteeId::GroupId(_) => None,
        }
    }
}

/// A (grantee, permission-set) pair attached to a reference.
///
/// Updating a grant replaces it wholesale; there is no merging of
/// permission sets.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub grantee: Grantee,
    #[serde(default)]
    pub permissions: ResourcePermissions,
}

impl Grant {
    pub fn new(grantee: Grantee, permissions: ResourcePermissions) -> Self {
        Self {
            grantee,
            permissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserType;

    #[test]
    fn test_user_grantee_encoding() {
        let g = Grantee::user(UserId::primary("0.0.0.0:19000", "abc"));
        assert_eq!(
            serde_json::to_string(&g).unwrap(),
            r#"{"type":1,"Id":{"UserId":{"idp":"0.0.0.0:19000","opaque_id":"abc","type":1}}}"#
        );
    }

    #[test]
    fn test_group_grantee_encoding() {
        let g = Grantee::group(GroupId {
            idp: "idp".into(),
            opaque_id: "physics".into(),
        });
        assert_eq!(
            serde_json::to_string(&g).unwrap(),
            r#"{"type":2,"Id":{"GroupId":{"idp":"idp","opaque_id":"physics"}}}"#
        );
        assert!(g.user_id().is_none());
    }

    #[test]
    fn test_grant_decodes_from_listing() {
        let json = r#"{"grantee":{"type":1,"Id":{"UserId":{"idp":"some-idp","opaque_id":"some-opaque-id","type":1}}},"permissions":{"stat":true}}"#;
        let grant: Grant = serde_json::from_str(json).unwrap();
        let user = grant.grantee.user_id().unwrap();
        assert_eq!(user.idp, "some-idp");
        assert_eq!(user.user_type, UserType::Primary);
        assert!(grant.permissions.stat);
        assert!(!grant.permissions.delete);
    }
}
