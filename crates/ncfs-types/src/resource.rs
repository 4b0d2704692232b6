//! Resource metadata as returned by GetMD and ListFolder.
//!
//! The remote frequently returns partial objects (`{ "size": 1 }` is a valid
//! GetMD reply), so every field here decodes to its default when absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{ResourceId, UserId};
use crate::permissions::ResourcePermissions;

wire_enum! {
    /// What kind of entry a [`ResourceInfo`] describes.
    pub enum ResourceType {
        #[default]
        Invalid = 0,
        File = 1,
        Container = 2,
        Reference = 3,
        Symlink = 4,
    }
}

impl ResourceType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, ResourceType::File)
    }

    /// Returns true if this is a container (directory).
    pub fn is_container(&self) -> bool {
        matches!(self, ResourceType::Container)
    }
}

wire_enum! {
    pub enum ChecksumType {
        #[default]
        Invalid = 0,
        Unset = 1,
        Adler32 = 2,
        Md5 = 3,
        Sha1 = 4,
    }
}

/// Content checksum.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChecksum {
    #[serde(rename = "type", default, skip_serializing_if = "is_invalid_checksum")]
    pub checksum_type: ChecksumType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sum: String,
}

fn is_invalid_checksum(t: &ChecksumType) -> bool {
    *t == ChecksumType::Invalid
}

/// Seconds since the Unix epoch, with optional sub-second precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    #[serde(default)]
    pub seconds: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub nanos: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl Timestamp {
    pub fn from_secs(seconds: u64) -> Self {
        Self { seconds, nanos: 0 }
    }
}

/// Metadata the remote derives itself (currently only a symlink target).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
}

/// User-defined key/value metadata.
///
/// Always encodes the `metadata` key, so an empty set is `{"metadata":{}}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitraryMetadata {
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ArbitraryMetadata {
    /// Build from `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            metadata: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// One opaque value: raw bytes plus an optional decoder hint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub decoder: String,
    #[serde(default, with = "base64_bytes")]
    pub value: Vec<u8>,
}

/// Protocol-extension bag. Values are base64 on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opaque {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub map: BTreeMap<String, OpaqueEntry>,
}

impl Opaque {
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Insert a plain value (no decoder hint).
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.map.insert(
            key.into(),
            OpaqueEntry {
                decoder: String::new(),
                value: value.into(),
            },
        );
        self
    }

    /// Raw bytes stored under `key`.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.map.get(key).map(|e| e.value.as_slice())
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

/// Metadata for one filesystem entry.
///
/// A fresh value is produced per call; the driver never mutates one after
/// returning it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceInfo {
    pub opaque: Opaque,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub id: ResourceId,
    pub checksum: ResourceChecksum,
    /// Content tag; changes whenever content changes.
    pub etag: String,
    pub mime_type: String,
    pub mtime: Timestamp,
    pub path: String,
    pub permission_set: ResourcePermissions,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserId>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub target: String,
    pub canonical_metadata: CanonicalMetadata,
    pub arbitrary_metadata: ArbitraryMetadata,
}

impl ResourceInfo {
    pub fn is_file(&self) -> bool {
        self.resource_type.is_file()
    }

    pub fn is_container(&self) -> bool {
        self.resource_type.is_container()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_reply_decodes() {
        let info: ResourceInfo = serde_json::from_str(r#"{ "size": 1 }"#).unwrap();
        assert_eq!(info.size, 1);
        assert_eq!(info.resource_type, ResourceType::Invalid);
        assert!(info.etag.is_empty());
        assert!(!info.permission_set.stat);
    }

    #[test]
    fn test_unknown_resource_type_does_not_fail_the_reply() {
        let info: ResourceInfo =
            serde_json::from_str(r#"{"type":5,"path":"/subdir","size":1}"#).unwrap();
        assert_eq!(info.resource_type, ResourceType::Invalid);
        assert_eq!(info.path, "/subdir");
    }

    #[test]
    fn test_full_reply_decodes() {
        let json = r#"{"opaque":{},"type":1,"id":{"opaque_id":"fileid-/some/path"},"checksum":{},"etag":"deadbeef","mime_type":"text/plain","mtime":{"seconds":1234567890},"path":"/some/path","permission_set":{},"size":12345,"canonical_metadata":{},"arbitrary_metadata":{"metadata":{"da":"ta","some":"arbi","trary":"meta"}}}"#;
        let info: ResourceInfo = serde_json::from_str(json).unwrap();
        assert!(info.is_file());
        assert_eq!(info.id.opaque_id, "fileid-/some/path");
        assert!(info.id.storage_id.is_empty());
        assert_eq!(info.etag, "deadbeef");
        assert_eq!(info.mime_type, "text/plain");
        assert_eq!(info.mtime, Timestamp::from_secs(1234567890));
        assert_eq!(info.size, 12345);
        assert_eq!(info.arbitrary_metadata.get("some"), Some("arbi"));
    }

    #[test]
    fn test_arbitrary_metadata_reserializes() {
        let md = ArbitraryMetadata::from_pairs([("foo", "bar")]);
        assert_eq!(
            serde_json::to_string(&md).unwrap(),
            r#"{"metadata":{"foo":"bar"}}"#
        );
    }

    #[test]
    fn test_opaque_values_are_base64() {
        let opaque = Opaque::default().with_value("foo", "sama");
        assert_eq!(
            serde_json::to_string(&opaque).unwrap(),
            r#"{"map":{"foo":{"value":"c2FtYQ=="}}}"#
        );

        let decoded: Opaque =
            serde_json::from_str(r#"{"map":{"some":{"value":"ZGF0YQ=="}}}"#).unwrap();
        assert_eq!(decoded.get("some"), Some(&b"data"[..]));
    }

    #[test]
    fn test_bad_base64_is_an_error() {
        let result: Result<Opaque, _> = serde_json::from_str(r#"{"map":{"x":{"value":"!!"}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_timestamp_omits_zero_nanos() {
        assert_eq!(
            serde_json::to_string(&Timestamp::from_secs(5)).unwrap(),
            r#"{"seconds":5}"#
        );
    }
}
