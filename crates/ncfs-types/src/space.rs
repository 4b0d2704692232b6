//! Quota and storage-space discovery types.

use serde::{Deserialize, Serialize};

use crate::ids::{ResourceId, StorageSpaceId, User, UserId};
use crate::resource::{Opaque, Timestamp};

/// Quota for the caller's home, as the remote reports it.
///
/// The remote uses camelCase keys for this reply only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    #[serde(rename = "maxBytes", default)]
    pub max_bytes: u64,
    #[serde(rename = "maxFiles", default)]
    pub max_files: u64,
}

/// Quota attached to a storage space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceQuota {
    #[serde(default)]
    pub quota_max_bytes: u64,
    #[serde(default)]
    pub quota_max_files: u64,
}

/// A storage space.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSpace {
    #[serde(skip_serializing_if = "Opaque::is_empty")]
    pub opaque: Opaque,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<StorageSpaceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<ResourceId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<SpaceQuota>,
    pub space_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<Timestamp>,
}

wire_enum! {
    pub enum FilterType {
        #[default]
        Invalid = 0,
        NoFilter = 1,
        Id = 2,
        Owner = 3,
        SpaceType = 4,
    }
}

/// The filter operand. Encodes externally tagged: `{"Owner":{..}}`,
/// `{"Id":{"opaque_id":".."}}`, `{"SpaceType":"home"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterTerm {
    Owner(UserId),
    Id(StorageSpaceId),
    SpaceType(String),
}

/// One ListStorageSpaces filter. The list is sent as a bare JSON array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStorageSpacesFilter {
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(rename = "Term")]
    pub term: FilterTerm,
}

impl ListStorageSpacesFilter {
    pub fn owner(owner: UserId) -> Self {
        Self {
            filter_type: FilterType::Owner,
            term: FilterTerm::Owner(owner),
        }
    }

    pub fn id(id: StorageSpaceId) -> Self {
        Self {
            filter_type: FilterType::Id,
            term: FilterTerm::Id(id),
        }
    }

    pub fn space_type(space_type: impl Into<String>) -> Self {
        Self {
            filter_type: FilterType::SpaceType,
            term: FilterTerm::SpaceType(space_type.into()),
        }
    }
}

/// Arguments for CreateStorageSpace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateStorageSpaceRequest {
    #[serde(skip_serializing_if = "Opaque::is_empty")]
    pub opaque: Opaque,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    #[serde(rename = "type")]
    pub space_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<SpaceQuota>,
}
