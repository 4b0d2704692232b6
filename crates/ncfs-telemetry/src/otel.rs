//! OTLP export for ncfs spans.

use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry::trace::{
    Link, SamplingDecision, SamplingResult, SpanKind, TraceContextExt, TraceId, TraceState,
    TracerProvider as _,
};
use opentelemetry::{Context, KeyValue, global};
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Sampler, SdkTracer, SdkTracerProvider, ShouldSample};
use tracing_opentelemetry::{OpenTelemetryLayer, OpenTelemetrySpanExt};

use crate::{TRACEPARENT, TRACESTATE, TelemetryError};

/// Flushes and stops the provider when dropped.
pub struct OtelGuard {
    provider: SdkTracerProvider,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Err(e) = self.provider.shutdown() {
            eprintln!("ncfs: span export did not shut down cleanly: {e}");
        }
    }
}

fn build_provider(service_name: &str) -> Result<SdkTracerProvider, TelemetryError> {
    // The batch processor and the tonic channel spawn onto the ambient runtime.
    tokio::runtime::Handle::try_current()
        .map_err(|_| TelemetryError::Exporter("OTLP export needs a Tokio runtime".into()))?;

    let exporter = SpanExporter::builder()
        .with_tonic()
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .with_sampler(CallSampler::default())
        .with_batch_exporter(exporter)
        .build())
}

/// Layer that forwards `tracing` spans to the OTLP exporter.
pub(crate) fn otel_layer<S>(
    service_name: &str,
) -> Result<(OpenTelemetryLayer<S, SdkTracer>, OtelGuard), TelemetryError>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    let provider = build_provider(service_name)?;
    global::set_tracer_provider(provider.clone());
    let layer = tracing_opentelemetry::layer().with_tracer(provider.tracer("ncfs"));
    Ok((layer, OtelGuard { provider }))
}

/// The two trace headers an HTTP call carries.
#[derive(Default)]
struct TraceHeaders {
    traceparent: String,
    tracestate: String,
}

impl Injector for TraceHeaders {
    fn set(&mut self, key: &str, value: String) {
        match key {
            TRACEPARENT => self.traceparent = value,
            TRACESTATE => self.tracestate = value,
            _ => {}
        }
    }
}

impl Extractor for TraceHeaders {
    fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            TRACEPARENT => &self.traceparent,
            TRACESTATE => &self.tracestate,
            _ => return None,
        };
        (!value.is_empty()).then_some(value.as_str())
    }

    fn keys(&self) -> Vec<&str> {
        vec![TRACEPARENT, TRACESTATE]
    }
}

pub(crate) fn inject_trace_context_impl() -> (String, String) {
    let mut headers = TraceHeaders::default();
    TraceContextPropagator::new().inject_context(&tracing::Span::current().context(), &mut headers);
    (headers.traceparent, headers.tracestate)
}

pub(crate) fn extract_trace_context_impl(traceparent: &str, tracestate: &str) -> tracing::Span {
    let span = tracing::info_span!("mock.request");
    if !traceparent.is_empty() {
        let headers = TraceHeaders {
            traceparent: traceparent.to_string(),
            tracestate: tracestate.to_string(),
        };
        span.set_parent(TraceContextPropagator::new().extract(&headers));
    }
    span
}

/// Where a root span comes from, judged by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanOrigin {
    /// `driver.*`: one per storage operation.
    Driver,
    /// `mock.*`: one per request the simulator answers.
    Simulator,
    Other,
}

impl SpanOrigin {
    fn of(name: &str) -> Self {
        match name.split('.').next() {
            Some("driver") => Self::Driver,
            Some("mock") => Self::Simulator,
            _ => Self::Other,
        }
    }
}

/// Keeps every driver call and every failed span; thins out the rest.
#[derive(Debug, Clone)]
struct CallSampler {
    background_ratio: f64,
}

impl Default for CallSampler {
    fn default() -> Self {
        Self {
            background_ratio: 0.1,
        }
    }
}

fn marks_failure(attributes: &[KeyValue]) -> bool {
    attributes
        .iter()
        .any(|kv| match kv.key.as_str() {
            "otel.status_code" => kv.value.as_str() == "ERROR",
            "error" => kv.value.as_str() == "true",
            _ => false,
        })
}

fn keep(trace_state: TraceState) -> SamplingResult {
    SamplingResult {
        decision: SamplingDecision::RecordAndSample,
        attributes: Vec::new(),
        trace_state,
    }
}

impl ShouldSample for CallSampler {
    fn should_sample(
        &self,
        parent_context: Option<&Context>,
        trace_id: TraceId,
        name: &str,
        span_kind: &SpanKind,
        attributes: &[KeyValue],
        links: &[Link],
    ) -> SamplingResult {
        if let Some(cx) = parent_context {
            let parent = cx.span().span_context().clone();
            if parent.is_sampled() {
                return keep(parent.trace_state().clone());
            }
        }
        if marks_failure(attributes) || SpanOrigin::of(name) == SpanOrigin::Driver {
            return keep(TraceState::default());
        }
        Sampler::TraceIdRatioBased(self.background_ratio).should_sample(
            parent_context,
            trace_id,
            name,
            span_kind,
            attributes,
            links,
        )
    }
}
