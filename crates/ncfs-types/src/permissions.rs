//! The fixed permission bundle attached to grants and resource metadata.

use serde::{Deserialize, Serialize};

/// Nineteen independent capabilities.
///
/// Every field is always encoded, `false` included, so a grant's request body
/// never changes shape with its content. Missing fields decode as `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePermissions {
    pub add_grant: bool,
    pub create_container: bool,
    pub delete: bool,
    pub get_path: bool,
    pub get_quota: bool,
    pub initiate_file_download: bool,
    pub initiate_file_upload: bool,
    pub list_grants: bool,
    pub list_container: bool,
    pub list_file_versions: bool,
    pub list_recycle: bool,
    #[serde(rename = "move")]
    pub r#move: bool,
    pub remove_grant: bool,
    pub purge_recycle: bool,
    pub restore_file_version: bool,
    pub restore_recycle_item: bool,
    pub stat: bool,
    pub update_grant: bool,
    pub deny_grant: bool,
}

impl ResourcePermissions {
    /// No capabilities.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every capability.
    pub fn all() -> Self {
        Self {
            add_grant: true,
            create_container: true,
            delete: true,
            get_path: true,
            get_quota: true,
            initiate_file_download: true,
            initiate_file_upload: true,
            list_grants: true,
            list_container: true,
            list_file_versions: true,
            list_recycle: true,
            r#move: true,
            remove_grant: true,
            purge_recycle: true,
            restore_file_version: true,
            restore_recycle_item: true,
            stat: true,
            update_grant: true,
            deny_grant: true,
        }
    }

    /// Read-only viewer: stat, list, download.
    pub fn viewer() -> Self {
        Self {
            stat: true,
            list_container: true,
            initiate_file_download: true,
            get_path: true,
            ..Self::none()
        }
    }

    /// Number of granted capabilities.
    pub fn count(&self) -> usize {
        [
            self.add_grant,
            self.create_container,
            self.delete,
            self.get_path,
            self.get_quota,
            self.initiate_file_download,
            self.initiate_file_upload,
            self.list_grants,
            self.list_container,
            self.list_file_versions,
            self.list_recycle,
            self.r#move,
            self.remove_grant,
            self.purge_recycle,
            self.restore_file_version,
            self.restore_recycle_item,
            self.stat,
            self.update_grant,
            self.deny_grant,
        ]
        .iter()
        .filter(|granted| **granted)
        .count()
    }
}
