//! Per-operation request bodies.
//!
//! Each operation has exactly one body shape. They are not derived from one
//! canonical rule; the remote's API grew per-endpoint, so each struct here
//! pins the shape of one endpoint:
//!
//! |------------------------------------|---------------------------------------------|
//! | Operation                          | Body                                        |
//! |------------------------------------|---------------------------------------------|
//! | CreateDir, Delete, ListRevisions, ListGrants | bare [`Reference`]                |
//! | GetPathByID                        | bare [`ResourceId`](crate::ResourceId)      |
//! | Move                               | [`MoveArgs`]                                |
//! | GetMD, ListFolder                  | [`MetadataQuery`]                           |
//! | InitiateUpload                     | [`InitiateUploadArgs`]                      |
//! | RestoreRevision                    | [`RevisionArgs`]                            |
//! | ListRecycle, PurgeRecycleItem      | [`RecycleArgs`] (empty strings kept)        |
//! | RestoreRecycleItem                 | [`RestoreRecycleArgs`]                      |
//! | AddGrant, UpdateGrant, RemoveGrant | [`GrantArgs`]                               |
//! | DenyGrant                          | [`DenyGrantArgs`]                           |
//! | CreateReference                    | [`CreateReferenceArgs`]                     |
//! | SetArbitraryMetadata               | [`SetMetadataArgs`]                         |
//! | UnsetArbitraryMetadata             | [`UnsetMetadataArgs`]                       |
//! | ListStorageSpaces                  | bare array of filters                       |
//! | CreateStorageSpace                 | bare [`CreateStorageSpaceRequest`](crate::CreateStorageSpaceRequest) |
//! |------------------------------------|---------------------------------------------|
//!
//! Calls without arguments send an empty body, never `{}`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::grant::{Grant, Grantee};
use crate::reference::Reference;
use crate::resource::ArbitraryMetadata;

#[derive(Debug, Serialize)]
pub struct MoveArgs<'a> {
    pub from: &'a Reference,
    pub to: &'a Reference,
}

/// Target plus the metadata keys the caller is interested in.
/// `mdKeys` is always present, `[]` when empty.
#[derive(Debug, Serialize)]
pub struct MetadataQuery<'a> {
    #[serde(rename = "ref")]
    pub reference: &'a Reference,
    #[serde(rename = "mdKeys")]
    pub md_keys: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct InitiateUploadArgs<'a> {
    #[serde(rename = "ref")]
    pub reference: &'a Reference,
    #[serde(rename = "uploadLength")]
    pub upload_length: i64,
    pub metadata: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct RevisionArgs<'a> {
    #[serde(rename = "ref")]
    pub reference: &'a Reference,
    pub key: &'a str,
}

/// Recycle-bin addressing. Unlike [`Reference`], an empty `path` is sent
/// explicitly as `""`.
#[derive(Debug, Serialize)]
pub struct RecycleArgs<'a> {
    pub key: &'a str,
    pub path: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RestoreRecycleArgs<'a> {
    pub key: &'a str,
    pub path: &'a str,
    #[serde(rename = "restoreRef", skip_serializing_if = "Option::is_none")]
    pub restore_ref: Option<&'a Reference>,
}

#[derive(Debug, Serialize)]
pub struct GrantArgs<'a> {
    #[serde(rename = "ref")]
    pub reference: &'a Reference,
    pub g: &'a Grant,
}

#[derive(Debug, Serialize)]
pub struct DenyGrantArgs<'a> {
    #[serde(rename = "ref")]
    pub reference: &'a Reference,
    pub g: &'a Grantee,
}

#[derive(Debug, Serialize)]
pub struct CreateReferenceArgs<'a> {
    pub path: &'a str,
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SetMetadataArgs<'a> {
    #[serde(rename = "ref")]
    pub reference: &'a Reference,
    pub md: &'a ArbitraryMetadata,
}

#[derive(Debug, Serialize)]
pub struct UnsetMetadataArgs<'a> {
    #[serde(rename = "ref")]
    pub reference: &'a Reference,
    pub keys: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use crate::{ResourceId, ResourcePermissions, UserId};
    use pretty_assertions::assert_eq;

    fn text<T: Serialize>(value: &T) -> String {
        String::from_utf8(encode(value).unwrap()).unwrap()
    }

    fn fixture_ref() -> Reference {
        Reference::new(ResourceId::new("storage-id", "opaque-id"), "/some/path")
    }

    #[test]
    fn test_move_uses_named_fields() {
        let from = Reference::new(ResourceId::new("storage-id-1", "opaque-id-1"), "/some/old/path");
        let to = Reference::new(ResourceId::new("storage-id-2", "opaque-id-2"), "/some/new/path");
        assert_eq!(
            text(&MoveArgs { from: &from, to: &to }),
            r#"{"from":{"resource_id":{"storage_id":"storage-id-1","opaque_id":"opaque-id-1"},"path":"/some/old/path"},"to":{"resource_id":{"storage_id":"storage-id-2","opaque_id":"opaque-id-2"},"path":"/some/new/path"}}"#
        );
    }

    #[test]
    fn test_metadata_query_keeps_empty_keys() {
        let r = Reference::path("/subdir");
        assert_eq!(
            text(&MetadataQuery { reference: &r, md_keys: &[] }),
            r#"{"ref":{"path":"/subdir"},"mdKeys":[]}"#
        );
    }

    #[test]
    fn test_initiate_upload_shape() {
        let r = fixture_ref();
        let metadata: BTreeMap<String, String> = [("key2", "val2"), ("key1", "val1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(
            text(&InitiateUploadArgs { reference: &r, upload_length: 12345, metadata: &metadata }),
            r#"{"ref":{"resource_id":{"storage_id":"storage-id","opaque_id":"opaque-id"},"path":"/some/path"},"uploadLength":12345,"metadata":{"key1":"val1","key2":"val2"}}"#
        );
    }

    #[test]
    fn test_recycle_args_keep_empty_strings() {
        assert_eq!(text(&RecycleArgs { key: "", path: "" }), r#"{"key":"","path":""}"#);
    }

    #[test]
    fn test_restore_recycle_without_target_omits_it() {
        assert_eq!(
            text(&RestoreRecycleArgs { key: "k", path: "/p", restore_ref: None }),
            r#"{"key":"k","path":"/p"}"#
        );
    }

    #[test]
    fn test_grant_args_shape() {
        let r = Reference::path("/subdir");
        let grant = Grant::new(
            Grantee::user(UserId::primary("idp", "u")),
            ResourcePermissions::none(),
        );
        let body = text(&GrantArgs { reference: &r, g: &grant });
        assert!(body.starts_with(r#"{"ref":{"path":"/subdir"},"g":{"grantee":{"type":1,"Id":{"UserId":"#));
        assert!(body.ends_with(r#""deny_grant":false}}}"#));
    }
}
