//! Driver configuration.
//!
//! The plugin registry hands the driver an untyped key/value map; it is
//! decoded here with serde. The CLI loads the same struct from a TOML file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DriverError, DriverResult};

/// Configuration for one Nextcloud storage driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageDriverConfig {
    /// Base URL of the sciencemesh app, e.g.
    /// `https://cloud.example.org/apps/sciencemesh/`.
    pub end_point: String,

    /// Talk to a local conformance server instead of a real deployment.
    /// Proxies are bypassed so loopback traffic never leaves the host.
    pub mock_http: bool,
}

impl StorageDriverConfig {
    /// Create a config for the given endpoint.
    pub fn new(end_point: impl Into<String>) -> Self {
        Self {
            end_point: end_point.into(),
            mock_http: false,
        }
    }

    /// Mark the endpoint as a local conformance server.
    pub fn with_mock_http(mut self, mock_http: bool) -> Self {
        self.mock_http = mock_http;
        self
    }

    /// Decode from the registry's configuration map.
    pub fn from_map(map: Map<String, Value>) -> DriverResult<Self> {
        let config: Self = serde_json::from_value(Value::Object(map))
            .map_err(|e| DriverError::config(format!("error decoding conf: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the endpoint is an absolute http(s) URL.
    pub fn validate(&self) -> DriverResult<()> {
        if self.end_point.is_empty() {
            return Err(DriverError::config("end_point is required"));
        }
        let url = reqwest::Url::parse(&self.end_point)
            .map_err(|e| DriverError::config(format!("end_point {:?}: {e}", self.end_point)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(DriverError::config(format!(
                "end_point scheme must be http or https, got {other:?}"
            ))),
        }
    }

    /// The endpoint with exactly one trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}/", self.end_point.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_from_map() {
        let config = StorageDriverConfig::from_map(map(json!({
            "end_point": "http://mock.com/apps/sciencemesh/",
            "mock_http": true,
        })))
        .unwrap();
        assert_eq!(config.end_point, "http://mock.com/apps/sciencemesh/");
        assert!(config.mock_http);
    }

    #[test]
    fn test_mock_http_defaults_to_false() {
        let config =
            StorageDriverConfig::from_map(map(json!({ "end_point": "https://cloud.example.org/" })))
                .unwrap();
        assert!(!config.mock_http);
    }

    #[test]
    fn test_wrong_type_is_config_error() {
        let err = StorageDriverConfig::from_map(map(json!({
            "end_point": "http://x/",
            "mock_http": "yes",
        })))
        .unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));
    }

    #[test]
    fn test_missing_endpoint_is_rejected() {
        let err = StorageDriverConfig::from_map(Map::new()).unwrap_err();
        assert!(err.to_string().contains("end_point is required"));
    }

    #[test]
    fn test_non_http_scheme_is_rejected() {
        assert!(StorageDriverConfig::new("ftp://x/").validate().is_err());
        assert!(StorageDriverConfig::new("not a url").validate().is_err());
    }

    #[test]
    fn test_base_url_normalisation() {
        assert_eq!(
            StorageDriverConfig::new("http://mock.com/apps/sciencemesh").base_url(),
            "http://mock.com/apps/sciencemesh/"
        );
        assert_eq!(
            StorageDriverConfig::new("http://mock.com/apps/sciencemesh//").base_url(),
            "http://mock.com/apps/sciencemesh/"
        );
    }
}
