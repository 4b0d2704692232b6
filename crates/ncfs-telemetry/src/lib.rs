//! Logging and OpenTelemetry setup for ncfs.
//!
//! Every binary calls [`init`] once at startup. Log lines go to stderr with an
//! `EnvFilter` (default `info`, override with `RUST_LOG`). With the
//! `telemetry` feature, spans are additionally exported over OTLP when the
//! standard OTel environment variables ask for it:
//!
//! ```bash
//! OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 ncfs mock --port 8080
//! ```
//!
//! Set `OTEL_SDK_DISABLED=true` to explicitly disable even when the endpoint is set.

#[cfg(feature = "telemetry")]
mod otel;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Header names for W3C Trace Context propagation.
pub const TRACEPARENT: &str = "traceparent";
pub const TRACESTATE: &str = "tracestate";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("global subscriber already set: {0}")]
    Subscriber(#[from] TryInitError),

    #[error("OTLP exporter setup failed: {0}")]
    Exporter(String),
}

/// Keeps the exporter alive; spans are flushed when it drops.
#[must_use = "dropping the guard stops span export"]
pub struct TelemetryGuard {
    #[cfg(feature = "telemetry")]
    _otel: Option<otel::OtelGuard>,
}

/// Whether the OTel environment asks for span export.
///
/// `OTEL_SDK_DISABLED=true` always wins. Otherwise export is on when an OTLP
/// endpoint is configured or `OTEL_TRACES_EXPORTER` names anything but `none`.
pub fn otel_enabled() -> bool {
    let env = |name: &str| std::env::var(name).ok();
    if env("OTEL_SDK_DISABLED").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
        return false;
    }
    env("OTEL_EXPORTER_OTLP_ENDPOINT").is_some()
        || env("OTEL_TRACES_EXPORTER").is_some_and(|v| !v.eq_ignore_ascii_case("none"))
}

/// Install the global subscriber.
pub fn init(service_name: &str) -> Result<TelemetryGuard, TelemetryError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);
    let registry = tracing_subscriber::registry().with(filter).with(fmt_layer);

    #[cfg(feature = "telemetry")]
    {
        if otel_enabled() {
            let (layer, guard) = otel::otel_layer(service_name)?;
            registry.with(layer).try_init()?;
            tracing::info!(service = service_name, "OTLP span export enabled");
            return Ok(TelemetryGuard { _otel: Some(guard) });
        }
    }

    registry.try_init()?;
    tracing::debug!(service = service_name, "logging initialised");
    Ok(TelemetryGuard {
        #[cfg(feature = "telemetry")]
        _otel: None,
    })
}

/// W3C Trace Context for the current span, as `(name, value)` header pairs.
///
/// Empty when export is off or there is no active trace.
pub fn trace_headers() -> Vec<(&'static str, String)> {
    let (traceparent, tracestate) = inject_trace_context();
    [(TRACEPARENT, traceparent), (TRACESTATE, tracestate)]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect()
}

/// Inject W3C Trace Context from the current tracing span.
#[cfg(feature = "telemetry")]
pub fn inject_trace_context() -> (String, String) {
    otel::inject_trace_context_impl()
}

#[cfg(not(feature = "telemetry"))]
pub fn inject_trace_context() -> (String, String) {
    (String::new(), String::new())
}

/// Span for an incoming request, parented to the remote caller's trace when
/// one was propagated.
#[cfg(feature = "telemetry")]
pub fn extract_trace_context(traceparent: &str, tracestate: &str) -> tracing::Span {
    otel::extract_trace_context_impl(traceparent, tracestate)
}

#[cfg(not(feature = "telemetry"))]
pub fn extract_trace_context(_traceparent: &str, _tracestate: &str) -> tracing::Span {
    tracing::info_span!("mock.request")
}
