//! Point-in-time records: file revisions and recycle-bin entries.
//!
//! Both are addressed by an opaque `key` that is handed back verbatim to the
//! matching restore/download/purge operation.

use serde::{Deserialize, Serialize};

use crate::reference::Reference;
use crate::resource::{Opaque, ResourceType, Timestamp};

/// One revision of a file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVersion {
    pub opaque: Opaque,
    pub key: String,
    pub size: u64,
    /// Modification time in seconds. A bare integer here, unlike
    /// [`Timestamp`] elsewhere.
    pub mtime: u64,
    pub etag: String,
}

/// One deleted entry in the recycle bin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecycleItem {
    pub opaque: Opaque,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub key: String,
    /// Where the entry lived before deletion.
    #[serde(rename = "ref")]
    pub reference: Reference,
    pub size: u64,
    pub deletion_time: Timestamp,
}
