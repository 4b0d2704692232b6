//! `ncfs call`: one driver operation, result printed to stdout.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use ncfs_driver::{RequestContext, StorageFs};
use ncfs_types::{ArbitraryMetadata, Reference, ResourceId};
use serde::Serialize;
use serde_json::Value;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Print the home path
    GetHome,
    CreateHome,
    CreateDir {
        path: String,
    },
    Delete {
        path: String,
    },
    Move {
        from: String,
        to: String,
    },
    /// Metadata for one entry
    Stat {
        path: String,
        /// Arbitrary-metadata key to request (repeatable)
        #[arg(long = "key")]
        keys: Vec<String>,
    },
    /// List a folder
    Ls {
        path: String,
    },
    GetPath {
        storage_id: String,
        opaque_id: String,
    },
    CreateReference {
        path: String,
        target: String,
    },
    InitiateUpload {
        path: String,
        length: i64,
        /// Upload metadata as key=value (repeatable)
        #[arg(long = "meta", value_parser = parse_pair)]
        metadata: Vec<(String, String)>,
    },
    /// Upload a local file
    Upload {
        path: String,
        file: PathBuf,
    },
    /// Write the file's content to stdout
    Download {
        path: String,
    },
    Revisions {
        path: String,
    },
    DownloadRevision {
        path: String,
        key: String,
    },
    RestoreRevision {
        path: String,
        key: String,
    },
    /// List the recycle bin
    Recycle {
        #[arg(long, default_value = "")]
        key: String,
        #[arg(long, default_value = "")]
        path: String,
    },
    RestoreRecycle {
        key: String,
        #[arg(long, default_value = "")]
        path: String,
        /// Restore to this path instead of the original location
        #[arg(long)]
        to: Option<String>,
    },
    PurgeRecycle {
        key: String,
        #[arg(long, default_value = "")]
        path: String,
    },
    EmptyRecycle,
    Grants {
        path: String,
    },
    SetMetadata {
        path: String,
        /// key=value pairs
        #[arg(required = true, value_parser = parse_pair)]
        pairs: Vec<(String, String)>,
    },
    UnsetMetadata {
        path: String,
        #[arg(required = true)]
        keys: Vec<String>,
    },
    Quota,
    /// List storage spaces visible to the user
    Spaces,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {s:?}"))
}

/// What an operation produced.
#[derive(Debug, PartialEq)]
pub enum Output {
    Nothing,
    Text(String),
    Json(Value),
    Bytes(Vec<u8>),
}

fn json<T: Serialize>(value: &T) -> Result<Output> {
    Ok(Output::Json(serde_json::to_value(value)?))
}

pub async fn run(driver: &dyn StorageFs, ctx: &RequestContext, op: Operation) -> Result<Output> {
    tracing::debug!(?op, user = %ctx.username(), "running operation");
    let output = match op {
        Operation::GetHome => Output::Text(driver.get_home(ctx).await?),
        Operation::CreateHome => {
            driver.create_home(ctx).await?;
            Output::Nothing
        }
        Operation::CreateDir { path } => {
            driver.create_dir(ctx, &Reference::path(path)).await?;
            Output::Nothing
        }
        Operation::Delete { path } => {
            driver.delete(ctx, &Reference::path(path)).await?;
            Output::Nothing
        }
        Operation::Move { from, to } => {
            driver
                .move_resource(ctx, &Reference::path(from), &Reference::path(to))
                .await?;
            Output::Nothing
        }
        Operation::Stat { path, keys } => {
            json(&driver.get_md(ctx, &Reference::path(path), &keys).await?)?
        }
        Operation::Ls { path } => {
            json(&driver.list_folder(ctx, &Reference::path(path), &[]).await?)?
        }
        Operation::GetPath {
            storage_id,
            opaque_id,
        } => {
            let id = ResourceId::new(storage_id, opaque_id);
            Output::Text(driver.get_path_by_id(ctx, &id).await?)
        }
        Operation::CreateReference { path, target } => {
            driver.create_reference(ctx, &path, &target).await?;
            Output::Nothing
        }
        Operation::InitiateUpload {
            path,
            length,
            metadata,
        } => {
            let metadata: BTreeMap<String, String> = metadata.into_iter().collect();
            json(
                &driver
                    .initiate_upload(ctx, &Reference::path(path), length, &metadata)
                    .await?,
            )?
        }
        Operation::Upload { path, file } => {
            let content =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            driver.upload(ctx, &Reference::path(path), content).await?;
            Output::Nothing
        }
        Operation::Download { path } => {
            Output::Bytes(driver.download(ctx, &Reference::path(path)).await?)
        }
        Operation::Revisions { path } => {
            json(&driver.list_revisions(ctx, &Reference::path(path)).await?)?
        }
        Operation::DownloadRevision { path, key } => Output::Bytes(
            driver
                .download_revision(ctx, &Reference::path(path), &key)
                .await?,
        ),
        Operation::RestoreRevision { path, key } => {
            driver
                .restore_revision(ctx, &Reference::path(path), &key)
                .await?;
            Output::Nothing
        }
        Operation::Recycle { key, path } => json(&driver.list_recycle(ctx, &key, &path).await?)?,
        Operation::RestoreRecycle { key, path, to } => {
            let target = to.map(Reference::path);
            driver
                .restore_recycle_item(ctx, &key, &path, target.as_ref())
                .await?;
            Output::Nothing
        }
        Operation::PurgeRecycle { key, path } => {
            driver.purge_recycle_item(ctx, &key, &path).await?;
            Output::Nothing
        }
        Operation::EmptyRecycle => {
            driver.empty_recycle(ctx).await?;
            Output::Nothing
        }
        Operation::Grants { path } => {
            json(&driver.list_grants(ctx, &Reference::path(path)).await?)?
        }
        Operation::SetMetadata { path, pairs } => {
            let md = ArbitraryMetadata::from_pairs(pairs);
            driver
                .set_arbitrary_metadata(ctx, &Reference::path(path), &md)
                .await?;
            Output::Nothing
        }
        Operation::UnsetMetadata { path, keys } => {
            driver
                .unset_arbitrary_metadata(ctx, &Reference::path(path), &keys)
                .await?;
            Output::Nothing
        }
        Operation::Quota => json(&driver.get_quota(ctx).await?)?,
        Operation::Spaces => json(&driver.list_storage_spaces(ctx, &[]).await?)?,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ncfs_driver::{NextcloudDriver, StorageDriverConfig};
    use ncfs_mock::fixtures::einstein_table;
    use ncfs_mock::{MockServer, ServerState, Simulator};
    use ncfs_types::{User, UserId};
    use pretty_assertions::assert_eq;

    async fn einstein() -> (MockServer, NextcloudDriver, RequestContext) {
        let simulator = Arc::new(Simulator::new(einstein_table().unwrap()));
        let server = MockServer::start(simulator).await.unwrap();
        let config = StorageDriverConfig::new(server.endpoint()).with_mock_http(true);
        let driver = NextcloudDriver::from_config(&config).unwrap();
        let ctx = RequestContext::new(User::new(
            UserId::primary("0.0.0.0:19000", "4c510ada-c86b-4815-8820-42cdf82c3d51"),
            "einstein",
        ));
        (server, driver, ctx)
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("a=b=c").unwrap(), ("a".into(), "b=c".into()));
        assert!(parse_pair("novalue").is_err());
    }

    #[tokio::test]
    async fn test_mkdir_then_stat() {
        let (server, driver, ctx) = einstein().await;
        let out = run(
            &driver,
            &ctx,
            Operation::CreateDir {
                path: "/subdir".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(out, Output::Nothing);
        assert_eq!(server.simulator().state(), ServerState::Subdir);

        let out = run(
            &driver,
            &ctx,
            Operation::Stat {
                path: "/subdir".into(),
                keys: vec![],
            },
        )
        .await
        .unwrap();
        match out {
            Output::Json(value) => assert_eq!(value["size"], 1),
            other => panic!("expected json, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_restore_to_other_location() {
        let (server, driver, ctx) = einstein().await;
        server.simulator().set_state(ServerState::Recycle);
        run(
            &driver,
            &ctx,
            Operation::RestoreRecycle {
                key: "subdir-key".into(),
                path: String::new(),
                to: Some("/subdirRestored".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(server.simulator().state(), ServerState::FileRestored);
    }

    #[tokio::test]
    async fn test_not_found_propagates() {
        let (_server, driver, ctx) = einstein().await;
        let err = run(&driver, &ctx, Operation::Ls { path: "/Shares".into() })
            .await
            .unwrap_err();
        let driver_err = err.downcast_ref::<ncfs_driver::DriverError>().unwrap();
        assert!(driver_err.is_not_found());
    }
}
