//! Configuration for `ncfs call`.
//!
//! ```toml
//! [driver]
//! end_point = "https://cloud.example.org/apps/sciencemesh/"
//! mock_http = false
//!
//! [user]
//! username = "einstein"
//! idp = "0.0.0.0:19000"
//! opaque_id = "4c510ada-c86b-4815-8820-42cdf82c3d51"
//! ```
//!
//! Command-line flags override the file; without a file, `--endpoint` and
//! `--user` are enough.

use std::path::Path;

use anyhow::{Context, Result, bail};
use ncfs_driver::StorageDriverConfig;
use ncfs_types::{User, UserId};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub driver: StorageDriverConfig,
    pub user: UserConfig,
}

/// The identity calls are made as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub username: String,
    pub idp: String,
    pub opaque_id: String,
    pub display_name: String,
}

impl UserConfig {
    pub fn to_user(&self) -> User {
        User::new(UserId::primary(&self.idp, &self.opaque_id), &self.username)
            .with_display_name(&self.display_name)
    }
}

/// Flag overrides, applied on top of the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub mock_http: bool,
}

impl CliConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load the file if given, apply overrides, and validate.
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(endpoint) = overrides.endpoint {
            config.driver.end_point = endpoint;
        }
        if let Some(username) = overrides.username {
            config.user.username = username;
        }
        config.driver.mock_http |= overrides.mock_http;

        config.driver.validate()?;
        if config.user.username.is_empty() {
            bail!("no user: set [user] username in the config or pass --user");
        }
        Ok(config)
    }
}
