//! Storage-provider capability trait.
//!
//! One method per provider operation. Every method takes the caller's
//! [`RequestContext`]; the user in it selects whose storage is addressed.

use std::collections::BTreeMap;

use async_trait::async_trait;
use ncfs_types::{
    ArbitraryMetadata, CreateStorageSpaceRequest, FileVersion, Grant, Grantee,
    ListStorageSpacesFilter, Quota, RecycleItem, Reference, ResourceId, ResourceInfo, StorageSpace,
};

use crate::context::RequestContext;
use crate::error::DriverResult;

/// Filesystem capabilities a storage provider exposes.
#[async_trait]
pub trait StorageFs: Send + Sync {
    // ========================================================================
    // Home
    // ========================================================================

    /// The caller's home path, as plain text.
    async fn get_home(&self, ctx: &RequestContext) -> DriverResult<String>;

    async fn create_home(&self, ctx: &RequestContext) -> DriverResult<()>;

    // ========================================================================
    // Namespace
    // ========================================================================

    async fn create_dir(&self, ctx: &RequestContext, reference: &Reference) -> DriverResult<()>;

    /// Create an empty file.
    async fn touch_file(&self, ctx: &RequestContext, reference: &Reference) -> DriverResult<()>;

    /// Delete an entry. It moves to the recycle bin.
    async fn delete(&self, ctx: &RequestContext, reference: &Reference) -> DriverResult<()>;

    async fn move_resource(
        &self,
        ctx: &RequestContext,
        from: &Reference,
        to: &Reference,
    ) -> DriverResult<()>;

    /// Metadata for one entry. `md_keys` names the arbitrary-metadata keys
    /// the caller wants populated; empty means the remote's default set.
    async fn get_md(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        md_keys: &[String],
    ) -> DriverResult<ResourceInfo>;

    async fn list_folder(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        md_keys: &[String],
    ) -> DriverResult<Vec<ResourceInfo>>;

    async fn get_path_by_id(&self, ctx: &RequestContext, id: &ResourceId) -> DriverResult<String>;

    /// Create a reference entry at `path` pointing to `target_uri`.
    async fn create_reference(
        &self,
        ctx: &RequestContext,
        path: &str,
        target_uri: &str,
    ) -> DriverResult<()>;

    // ========================================================================
    // Content
    // ========================================================================

    /// Announce an upload. Returns protocol-specific upload parameters.
    async fn initiate_upload(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        upload_length: i64,
        metadata: &BTreeMap<String, String>,
    ) -> DriverResult<BTreeMap<String, String>>;

    async fn upload(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        content: Vec<u8>,
    ) -> DriverResult<()>;

    async fn download(&self, ctx: &RequestContext, reference: &Reference) -> DriverResult<Vec<u8>>;

    // ========================================================================
    // Revisions
    // ========================================================================

    async fn list_revisions(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
    ) -> DriverResult<Vec<FileVersion>>;

    async fn download_revision(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        key: &str,
    ) -> DriverResult<Vec<u8>>;

    async fn restore_revision(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        key: &str,
    ) -> DriverResult<()>;

    // ========================================================================
    // Recycle bin
    // ========================================================================

    async fn list_recycle(
        &self,
        ctx: &RequestContext,
        key: &str,
        path: &str,
    ) -> DriverResult<Vec<RecycleItem>>;

    /// Restore a deleted entry, to `restore_ref` if given, otherwise to
    /// where it was deleted from.
    async fn restore_recycle_item(
        &self,
        ctx: &RequestContext,
        key: &str,
        path: &str,
        restore_ref: Option<&Reference>,
    ) -> DriverResult<()>;

    async fn purge_recycle_item(
        &self,
        ctx: &RequestContext,
        key: &str,
        path: &str,
    ) -> DriverResult<()>;

    async fn empty_recycle(&self, ctx: &RequestContext) -> DriverResult<()>;

    // ========================================================================
    // Grants
    // ========================================================================

    async fn add_grant(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        grant: &Grant,
    ) -> DriverResult<()>;

    async fn deny_grant(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        grantee: &Grantee,
    ) -> DriverResult<()>;

    async fn remove_grant(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        grant: &Grant,
    ) -> DriverResult<()>;

    /// Replace the grant for the same grantee.
    async fn update_grant(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        grant: &Grant,
    ) -> DriverResult<()>;

    async fn list_grants(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
    ) -> DriverResult<Vec<Grant>>;

    // ========================================================================
    // Arbitrary metadata
    // ========================================================================

    async fn set_arbitrary_metadata(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        md: &ArbitraryMetadata,
    ) -> DriverResult<()>;

    async fn unset_arbitrary_metadata(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        keys: &[String],
    ) -> DriverResult<()>;

    // ========================================================================
    // Provider
    // ========================================================================

    async fn get_quota(&self, ctx: &RequestContext) -> DriverResult<Quota>;

    async fn shutdown(&self, ctx: &RequestContext) -> DriverResult<()>;

    async fn list_storage_spaces(
        &self,
        ctx: &RequestContext,
        filters: &[ListStorageSpacesFilter],
    ) -> DriverResult<Vec<StorageSpace>>;

    async fn create_storage_space(
        &self,
        ctx: &RequestContext,
        request: &CreateStorageSpaceRequest,
    ) -> DriverResult<StorageSpace>;

    async fn update_storage_space(
        &self,
        ctx: &RequestContext,
        space: &StorageSpace,
    ) -> DriverResult<StorageSpace>;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Check if an entry exists. Any error, not just 404, counts as absent.
    async fn exists(&self, ctx: &RequestContext, reference: &Reference) -> bool {
        self.get_md(ctx, reference, &[]).await.is_ok()
    }
}
