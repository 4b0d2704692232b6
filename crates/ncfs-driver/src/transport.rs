//! Transport client: moves one encoded request to the remote and returns
//! the raw status and body.
//!
//! Transports do not interpret status codes; [`WireResponse::into_result`]
//! turns a non-2xx reply into [`TransportError::Status`] for the driver.

use async_trait::async_trait;
use reqwest::Method;

use crate::config::StorageDriverConfig;
use crate::context::RequestContext;
use crate::error::TransportError;

/// One outgoing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: Method,
    pub url: String,
    pub body: Vec<u8>,
}

impl WireRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body,
        }
    }

    pub fn put(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::PUT,
            url: url.into(),
            body,
        }
    }
}

/// The remote's answer, undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl WireResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body of a 2xx reply, or the status and body as an error.
    pub fn into_result(self) -> Result<Vec<u8>, TransportError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(TransportError::Status {
                status: self.status,
                body: String::from_utf8_lossy(&self.body).into_owned(),
            })
        }
    }
}

/// Sends requests to the remote.
///
/// Exactly one request per call: no retries, no timeouts of its own.
/// Implementations return [`TransportError::Cancelled`] once the context
/// is cancelled, abandoning the in-flight request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        ctx: &RequestContext,
        request: WireRequest,
    ) -> Result<WireResponse, TransportError>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Build a client for the given driver config. `mock_http` endpoints are
    /// local, so proxy settings from the environment are ignored for them.
    pub fn for_config(config: &StorageDriverConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if config.mock_http {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap a preconfigured client (custom TLS roots, headers, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        ctx: &RequestContext,
        request: WireRequest,
    ) -> Result<WireResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", request.url)))?;

        let mut builder = self.client.request(request.method, url).body(request.body);
        for (name, value) in ncfs_telemetry::trace_headers() {
            builder = builder.header(name, value);
        }

        let exchange = async move {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();
            Ok::<_, TransportError>(WireResponse { status, body })
        };

        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(TransportError::Cancelled),
            result = exchange => result,
        }
    }
}
