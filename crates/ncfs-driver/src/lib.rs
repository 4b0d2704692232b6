//! Storage-provider driver for Nextcloud's sciencemesh app.
//!
//! [`NextcloudDriver`] implements [`StorageFs`] by turning each operation
//! into exactly one HTTP request against the configured endpoint and
//! decoding the reply. There is no local state, no caching, and no retry.
//!
//! # Example
//!
//! ```no_run
//! use ncfs_driver::{NextcloudDriver, RequestContext, StorageDriverConfig, StorageFs};
//! use ncfs_types::{Reference, User, UserId};
//!
//! # async fn demo() -> ncfs_driver::DriverResult<()> {
//! let config = StorageDriverConfig::new("https://cloud.example.org/apps/sciencemesh/");
//! let driver = NextcloudDriver::from_config(&config)?;
//!
//! let ctx = RequestContext::new(User::new(UserId::primary("idp", "abc"), "einstein"));
//! driver.create_dir(&ctx, &Reference::path("/subdir")).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod ops;
pub mod transport;

pub use config::StorageDriverConfig;
pub use context::RequestContext;
pub use driver::NextcloudDriver;
pub use error::{DriverError, DriverResult, TransportError};
pub use ops::StorageFs;
pub use transport::{HttpTransport, Transport, WireRequest, WireResponse};
