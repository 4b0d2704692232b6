//! The Nextcloud adapter.
//!
//! Every operation is one request to
//! `<end_point>~<username>/api/<Operation>[/<extra>]`:
//!
//! - structured calls POST a JSON body built from `ncfs_types::requests`
//!   (or nothing, for calls without arguments) and decode the JSON reply;
//! - `Upload` PUTs the raw content to `.../Upload/<path>`;
//! - `Download` and `DownloadRevision` GET the raw content, undecoded.
//!
//! Byte-stream paths are appended with the leading `/` stripped and each
//! segment percent-encoded, as is the username. Revision keys may contain
//! `/`, so they are percent-encoded as a single segment.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use ncfs_types::requests::{
    CreateReferenceArgs, DenyGrantArgs, GrantArgs, InitiateUploadArgs, MetadataQuery, MoveArgs,
    RecycleArgs, RestoreRecycleArgs, RevisionArgs, SetMetadataArgs, UnsetMetadataArgs,
};
use ncfs_types::{
    ArbitraryMetadata, CreateStorageSpaceRequest, FileVersion, Grant, Grantee,
    ListStorageSpacesFilter, Quota, RecycleItem, Reference, ResourceId, ResourceInfo, StorageSpace,
};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::config::StorageDriverConfig;
use crate::context::RequestContext;
use crate::error::{DriverError, DriverResult};
use crate::ops::StorageFs;
use crate::transport::{HttpTransport, Transport, WireRequest};

/// Storage driver backed by a Nextcloud sciencemesh endpoint.
///
/// Stateless apart from the endpoint and transport; share it behind an `Arc`.
#[derive(Clone)]
pub struct NextcloudDriver {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for NextcloudDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NextcloudDriver")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl NextcloudDriver {
    /// Construct from the plugin registry's configuration map.
    pub fn new(config: Map<String, Value>) -> DriverResult<Self> {
        let config = StorageDriverConfig::from_map(config)?;
        Self::from_config(&config)
    }

    /// Construct from a decoded config, with an HTTP transport.
    pub fn from_config(config: &StorageDriverConfig) -> DriverResult<Self> {
        config.validate()?;
        let transport = HttpTransport::for_config(config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Construct with a caller-supplied transport.
    pub fn with_transport(config: &StorageDriverConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: config.base_url(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, ctx: &RequestContext, operation: &str, extra: Option<&str>) -> String {
        let mut url = format!(
            "{}~{}/api/{}",
            self.base_url,
            urlencoding::encode(ctx.username()),
            operation
        );
        if let Some(extra) = extra {
            url.push('/');
            url.push_str(extra);
        }
        url
    }

    async fn call(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        method: Method,
        extra: Option<&str>,
        body: Vec<u8>,
    ) -> DriverResult<Vec<u8>> {
        let url = self.url(ctx, operation, extra);
        let span = tracing::debug_span!(
            "driver.call",
            operation,
            method = %method,
            user = %ctx.username(),
        );

        async move {
            tracing::debug!(%url, body_len = body.len(), "sending request");
            let request = WireRequest { method, url, body };
            let result = self
                .transport
                .send(ctx, request)
                .await
                .and_then(|response| response.into_result());
            match result {
                Ok(body) => {
                    tracing::debug!(reply_len = body.len(), "request succeeded");
                    Ok(body)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "request failed");
                    Err(e.into())
                }
            }
        }
        .instrument(span)
        .await
    }

    /// POST without a body.
    async fn post_empty(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
    ) -> DriverResult<Vec<u8>> {
        self.call(ctx, operation, Method::POST, None, Vec::new()).await
    }

    /// POST an encoded argument struct.
    async fn post<A: Serialize + ?Sized + Sync>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        args: &A,
    ) -> DriverResult<Vec<u8>> {
        let body = ncfs_types::encode(args)
            .map_err(|source| DriverError::Encode { operation, source })?;
        self.call(ctx, operation, Method::POST, None, body).await
    }

    async fn post_json<A, T>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        args: &A,
    ) -> DriverResult<T>
    where
        A: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let reply = self.post(ctx, operation, args).await?;
        decode_reply(operation, &reply)
    }
}

fn decode_reply<T: DeserializeOwned>(operation: &'static str, reply: &[u8]) -> DriverResult<T> {
    ncfs_types::decode(reply).map_err(|source| DriverError::Decode { operation, source })
}

fn text_reply(operation: &'static str, reply: &[u8]) -> DriverResult<String> {
    ncfs_types::decode_text(reply).map_err(|source| DriverError::Decode { operation, source })
}

fn check_ref(operation: &'static str, reference: &Reference) -> DriverResult<()> {
    if reference.is_valid() {
        Ok(())
    } else {
        Err(DriverError::InvalidReference(operation))
    }
}

/// The reference's path as trailing URL segments, each percent-encoded.
fn stream_path(operation: &'static str, reference: &Reference) -> DriverResult<String> {
    let path = reference.path.trim_start_matches('/');
    if path.is_empty() {
        return Err(DriverError::InvalidReference(operation));
    }
    Ok(path
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/"))
}

#[async_trait]
impl StorageFs for NextcloudDriver {
    async fn get_home(&self, ctx: &RequestContext) -> DriverResult<String> {
        let reply = self.post_empty(ctx, "GetHome").await?;
        text_reply("GetHome", &reply)
    }

    async fn create_home(&self, ctx: &RequestContext) -> DriverResult<()> {
        self.post_empty(ctx, "CreateHome").await?;
        Ok(())
    }

    async fn create_dir(&self, ctx: &RequestContext, reference: &Reference) -> DriverResult<()> {
        check_ref("CreateDir", reference)?;
        self.post(ctx, "CreateDir", reference).await?;
        Ok(())
    }

    async fn touch_file(&self, _ctx: &RequestContext, _reference: &Reference) -> DriverResult<()> {
        Err(DriverError::Unimplemented("TouchFile"))
    }

    async fn delete(&self, ctx: &RequestContext, reference: &Reference) -> DriverResult<()> {
        check_ref("Delete", reference)?;
        self.post(ctx, "Delete", reference).await?;
        Ok(())
    }

    async fn move_resource(
        &self,
        ctx: &RequestContext,
        from: &Reference,
        to: &Reference,
    ) -> DriverResult<()> {
        check_ref("Move", from)?;
        check_ref("Move", to)?;
        self.post(ctx, "Move", &MoveArgs { from, to }).await?;
        Ok(())
    }

    async fn get_md(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        md_keys: &[String],
    ) -> DriverResult<ResourceInfo> {
        check_ref("GetMD", reference)?;
        let args = MetadataQuery {
            reference,
            md_keys,
        };
        self.post_json(ctx, "GetMD", &args).await
    }

    async fn list_folder(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        md_keys: &[String],
    ) -> DriverResult<Vec<ResourceInfo>> {
        check_ref("ListFolder", reference)?;
        let args = MetadataQuery {
            reference,
            md_keys,
        };
        self.post_json(ctx, "ListFolder", &args).await
    }

    async fn get_path_by_id(&self, ctx: &RequestContext, id: &ResourceId) -> DriverResult<String> {
        let reply = self.post(ctx, "GetPathByID", id).await?;
        text_reply("GetPathByID", &reply)
    }

    async fn create_reference(
        &self,
        ctx: &RequestContext,
        path: &str,
        target_uri: &str,
    ) -> DriverResult<()> {
        let args = CreateReferenceArgs {
            path,
            url: target_uri,
        };
        self.post(ctx, "CreateReference", &args).await?;
        Ok(())
    }

    async fn initiate_upload(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        upload_length: i64,
        metadata: &BTreeMap<String, String>,
    ) -> DriverResult<BTreeMap<String, String>> {
        check_ref("InitiateUpload", reference)?;
        let args = InitiateUploadArgs {
            reference,
            upload_length,
            metadata,
        };
        self.post_json(ctx, "InitiateUpload", &args).await
    }

    async fn upload(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        content: Vec<u8>,
    ) -> DriverResult<()> {
        let path = stream_path("Upload", reference)?;
        self.call(ctx, "Upload", Method::PUT, Some(&path), content)
            .await?;
        Ok(())
    }

    async fn download(&self, ctx: &RequestContext, reference: &Reference) -> DriverResult<Vec<u8>> {
        let path = stream_path("Download", reference)?;
        self.call(ctx, "Download", Method::GET, Some(&path), Vec::new())
            .await
    }

    async fn list_revisions(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
    ) -> DriverResult<Vec<FileVersion>> {
        check_ref("ListRevisions", reference)?;
        self.post_json(ctx, "ListRevisions", reference).await
    }

    async fn download_revision(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        key: &str,
    ) -> DriverResult<Vec<u8>> {
        let path = stream_path("DownloadRevision", reference)?;
        let extra = format!("{}/{}", urlencoding::encode(key), path);
        self.call(ctx, "DownloadRevision", Method::GET, Some(&extra), Vec::new())
            .await
    }

    async fn restore_revision(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        key: &str,
    ) -> DriverResult<()> {
        check_ref("RestoreRevision", reference)?;
        self.post(ctx, "RestoreRevision", &RevisionArgs { reference, key })
            .await?;
        Ok(())
    }

    async fn list_recycle(
        &self,
        ctx: &RequestContext,
        key: &str,
        path: &str,
    ) -> DriverResult<Vec<RecycleItem>> {
        self.post_json(ctx, "ListRecycle", &RecycleArgs { key, path })
            .await
    }

    async fn restore_recycle_item(
        &self,
        ctx: &RequestContext,
        key: &str,
        path: &str,
        restore_ref: Option<&Reference>,
    ) -> DriverResult<()> {
        if let Some(target) = restore_ref {
            check_ref("RestoreRecycleItem", target)?;
        }
        let args = RestoreRecycleArgs {
            key,
            path,
            restore_ref,
        };
        self.post(ctx, "RestoreRecycleItem", &args).await?;
        Ok(())
    }

    async fn purge_recycle_item(
        &self,
        ctx: &RequestContext,
        key: &str,
        path: &str,
    ) -> DriverResult<()> {
        self.post(ctx, "PurgeRecycleItem", &RecycleArgs { key, path })
            .await?;
        Ok(())
    }

    async fn empty_recycle(&self, ctx: &RequestContext) -> DriverResult<()> {
        self.post_empty(ctx, "EmptyRecycle").await?;
        Ok(())
    }

    async fn add_grant(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        grant: &Grant,
    ) -> DriverResult<()> {
        check_ref("AddGrant", reference)?;
        self.post(ctx, "AddGrant", &GrantArgs { reference, g: grant })
            .await?;
        Ok(())
    }

    async fn deny_grant(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        grantee: &Grantee,
    ) -> DriverResult<()> {
        check_ref("DenyGrant", reference)?;
        let args = DenyGrantArgs {
            reference,
            g: grantee,
        };
        self.post(ctx, "DenyGrant", &args).await?;
        Ok(())
    }

    async fn remove_grant(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        grant: &Grant,
    ) -> DriverResult<()> {
        check_ref("RemoveGrant", reference)?;
        self.post(ctx, "RemoveGrant", &GrantArgs { reference, g: grant })
            .await?;
        Ok(())
    }

    async fn update_grant(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        grant: &Grant,
    ) -> DriverResult<()> {
        check_ref("UpdateGrant", reference)?;
        self.post(ctx, "UpdateGrant", &GrantArgs { reference, g: grant })
            .await?;
        Ok(())
    }

    async fn list_grants(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
    ) -> DriverResult<Vec<Grant>> {
        check_ref("ListGrants", reference)?;
        self.post_json(ctx, "ListGrants", reference).await
    }

    async fn set_arbitrary_metadata(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        md: &ArbitraryMetadata,
    ) -> DriverResult<()> {
        check_ref("SetArbitraryMetadata", reference)?;
        self.post(ctx, "SetArbitraryMetadata", &SetMetadataArgs { reference, md })
            .await?;
        Ok(())
    }

    async fn unset_arbitrary_metadata(
        &self,
        ctx: &RequestContext,
        reference: &Reference,
        keys: &[String],
    ) -> DriverResult<()> {
        check_ref("UnsetArbitraryMetadata", reference)?;
        self.post(ctx, "UnsetArbitraryMetadata", &UnsetMetadataArgs { reference, keys })
            .await?;
        Ok(())
    }

    async fn get_quota(&self, ctx: &RequestContext) -> DriverResult<Quota> {
        let reply = self.post_empty(ctx, "GetQuota").await?;
        decode_reply("GetQuota", &reply)
    }

    async fn shutdown(&self, ctx: &RequestContext) -> DriverResult<()> {
        self.post_empty(ctx, "Shutdown").await?;
        Ok(())
    }

    async fn list_storage_spaces(
        &self,
        ctx: &RequestContext,
        filters: &[ListStorageSpacesFilter],
    ) -> DriverResult<Vec<StorageSpace>> {
        self.post_json(ctx, "ListStorageSpaces", filters).await
    }

    async fn create_storage_space(
        &self,
        ctx: &RequestContext,
        request: &CreateStorageSpaceRequest,
    ) -> DriverResult<StorageSpace> {
        self.post_json(ctx, "CreateStorageSpace", request).await
    }

    async fn update_storage_space(
        &self,
        _ctx: &RequestContext,
        _space: &StorageSpace,
    ) -> DriverResult<StorageSpace> {
        Err(DriverError::Unimplemented("UpdateStorageSpace"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::WireResponse;
    use ncfs_types::{User, UserId};
    use recorder::Recorder;

    /// In-memory transport that records requests and replies with a fixed
    /// response.
    mod recorder {
        use std::sync::Mutex;

        use super::*;

        pub struct Recorder {
            pub requests: Mutex<Vec<WireRequest>>,
            pub status: u16,
            pub reply: Vec<u8>,
        }

        impl Recorder {
            pub fn replying(status: u16, reply: &str) -> Arc<Self> {
                Arc::new(Self {
                    requests: Mutex::new(Vec::new()),
                    status,
                    reply: reply.as_bytes().to_vec(),
                })
            }

            pub fn single(&self) -> WireRequest {
                let requests = self.requests.lock().unwrap();
                assert_eq!(requests.len(), 1, "expected exactly one request");
                requests[0].clone()
            }

            pub fn count(&self) -> usize {
                self.requests.lock().unwrap().len()
            }
        }

        #[async_trait]
        impl Transport for Recorder {
            async fn send(
                &self,
                _ctx: &RequestContext,
                request: WireRequest,
            ) -> Result<WireResponse, TransportError> {
                self.requests.lock().unwrap().push(request);
                Ok(WireResponse {
                    status: self.status,
                    body: self.reply.clone(),
                })
            }
        }
    }

    fn driver(recorder: Arc<Recorder>) -> NextcloudDriver {
        let config = StorageDriverConfig::new("http://mock.com/apps/sciencemesh");
        NextcloudDriver::with_transport(&config, recorder)
    }

    fn ctx() -> RequestContext {
        RequestContext::new(User::new(UserId::primary("0.0.0.0:19000", "abc"), "tester"))
    }

    #[tokio::test]
    async fn test_url_layout() {
        let recorder = Recorder::replying(200, "yes we are");
        let home = driver(recorder.clone()).get_home(&ctx()).await.unwrap();
        assert_eq!(home, "yes we are");

        let request = recorder.single();
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.url,
            "http://mock.com/apps/sciencemesh/~tester/api/GetHome"
        );
        assert!(request.body.is_empty());
    }

    #[tokio::test]
    async fn test_upload_strips_leading_slash() {
        let recorder = Recorder::replying(200, "");
        driver(recorder.clone())
            .upload(&ctx(), &Reference::path("/some/file/path.txt"), b"shiny!".to_vec())
            .await
            .unwrap();

        let request = recorder.single();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(
            request.url,
            "http://mock.com/apps/sciencemesh/~tester/api/Upload/some/file/path.txt"
        );
        assert_eq!(request.body, b"shiny!");
    }

    #[tokio::test]
    async fn test_revision_key_is_escaped() {
        let recorder = Recorder::replying(200, "rev");
        let bytes = driver(recorder.clone())
            .download_revision(&ctx(), &Reference::path("some/file/path.txt"), "some/revision")
            .await
            .unwrap();
        assert_eq!(bytes, b"rev");

        let request = recorder.single();
        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url,
            "http://mock.com/apps/sciencemesh/~tester/api/DownloadRevision/some%2Frevision/some/file/path.txt"
        );
    }

    #[tokio::test]
    async fn test_stream_path_segments_are_escaped() {
        let recorder = Recorder::replying(200, "");
        let driver = driver(recorder.clone());
        driver
            .upload(&ctx(), &Reference::path("/notes/file#1 100%?.txt"), b"x".to_vec())
            .await
            .unwrap();
        assert_eq!(
            recorder.single().url,
            "http://mock.com/apps/sciencemesh/~tester/api/Upload/notes/file%231%20100%25%3F.txt"
        );

        driver
            .download_revision(&ctx(), &Reference::path("/a b/c#d"), "v1")
            .await
            .unwrap();
        let requests = recorder.requests.lock().unwrap();
        assert_eq!(
            requests[1].url,
            "http://mock.com/apps/sciencemesh/~tester/api/DownloadRevision/v1/a%20b/c%23d"
        );
    }

    #[tokio::test]
    async fn test_username_is_escaped() {
        let recorder = Recorder::replying(200, "/home");
        let ctx = RequestContext::new(User::new(UserId::primary("idp", "abc"), "marie curie#2"));
        driver(recorder.clone()).get_home(&ctx).await.unwrap();
        assert_eq!(
            recorder.single().url,
            "http://mock.com/apps/sciencemesh/~marie%20curie%232/api/GetHome"
        );
    }

    #[tokio::test]
    async fn test_non_2xx_is_status_error() {
        let recorder = Recorder::replying(404, "no such entry");
        let err = driver(recorder)
            .get_md(&ctx(), &Reference::path("/subdir"), &[])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("no such entry"));
    }

    #[tokio::test]
    async fn test_bad_reply_is_decode_error() {
        let recorder = Recorder::replying(200, "response not defined! POST /x ");
        let err = driver(recorder)
            .list_grants(&ctx(), &Reference::path("/subdir"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DriverError::Decode {
                operation: "ListGrants",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_invalid_reference_sends_nothing() {
        let recorder = Recorder::replying(200, "");
        let driver = driver(recorder.clone());
        let err = driver
            .create_dir(&ctx(), &Reference::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::InvalidReference("CreateDir")));

        let err = driver
            .download(&ctx(), &Reference::id(ResourceId::new("s", "o")))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::InvalidReference("Download")));
        assert_eq!(recorder.count(), 0);
    }

    #[tokio::test]
    async fn test_unimplemented_operations() {
        let recorder = Recorder::replying(200, "");
        let driver = driver(recorder.clone());
        assert!(matches!(
            driver.touch_file(&ctx(), &Reference::path("/f")).await,
            Err(DriverError::Unimplemented("TouchFile"))
        ));
        assert!(matches!(
            driver
                .update_storage_space(&ctx(), &StorageSpace::default())
                .await,
            Err(DriverError::Unimplemented("UpdateStorageSpace"))
        ));
        assert_eq!(recorder.count(), 0);
    }

    #[tokio::test]
    async fn test_new_from_map() {
        let map = match serde_json::json!({
            "end_point": "http://mock.com/apps/sciencemesh/",
            "mock_http": true,
        }) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        let driver = NextcloudDriver::new(map).unwrap();
        assert_eq!(driver.base_url(), "http://mock.com/apps/sciencemesh/");
    }
}
