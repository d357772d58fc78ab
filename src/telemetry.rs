use anyhow::Result;
use std::time::Duration;

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter, MeterProvider},
    trace::TracerProvider as _,
    KeyValue,
};
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    resource::Resource,
    trace::SdkTracerProvider,
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, Registry};

use crate::obs::tracingx::filter_from_env;

pub const ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
pub const COMMIT_ENV: &str = "DEX_COMMIT_SHA";
const DEFAULT_ENDPOINT: &str = "http://localhost:4318";

/// Providers OTel instalados por [`init`] mais os instrumentos de processo.
/// Os instrumentos por operação do pool ficam em [`crate::obs::wrap`].
pub struct Telemetry {
    pub tracer_provider: SdkTracerProvider,
    pub meter_provider: SdkMeterProvider,
    pub meter: Meter,
    pub swap_latency_ms: Histogram<f64>,
    pub pool_events: Counter<u64>,
}

impl Telemetry {
    pub fn shutdown(&self) {
        let _ = self.meter_provider.force_flush();
        let _ = self.meter_provider.shutdown();
        let _ = self.tracer_provider.shutdown();
    }
}

fn commit_sha() -> String {
    std::env::var(COMMIT_ENV).unwrap_or_else(|_| "unknown".into())
}

pub fn init(service_name: &str) -> Result<Telemetry> {
    let endpoint = std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", service_name.to_string()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("git.commit.sha", commit_sha()),
        ])
        .build();

    // ---- Traces (OTLP/HTTP) ----
    let span_exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(&endpoint)
        .build()?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(span_exporter)
        .build();

    let tracer = tracer_provider.tracer("dex_core");

    // ---- Métricas (OTLP/HTTP) ----
    let metric_exporter = MetricExporter::builder()
        .with_http()
        .with_endpoint(&endpoint)
        .build()?;

    let reader = PeriodicReader::builder(metric_exporter)
        .with_interval(Duration::from_secs(10))
        .build();

    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(reader)
        .build();

    // Globais: `obs::wrap` passa a exportar por aqui.
    global::set_tracer_provider(tracer_provider.clone());
    global::set_meter_provider(meter_provider.clone());

    // tracing -> OTel
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    let subscriber = Registry::default()
        .with(filter_from_env())
        .with(fmt_layer)
        .with(otel_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);

    let meter = meter_provider.meter("dex_core");
    let swap_latency_ms = meter
        .f64_histogram("swap_latency_ms")
        .with_unit("ms")
        .with_description("Latency of swap operations in ms")
        .build();
    let pool_events = meter
        .u64_counter("pool_events_total")
        .with_description("Pool events emitted, by kind")
        .build();

    Ok(Telemetry {
        tracer_provider,
        meter_provider,
        meter,
        swap_latency_ms,
        pool_events,
    })
}

/// Cria um `Span` INFO com nome **estático** (exigência do tracing) e
/// coloca o nome dinâmico em `span_name`. Inclui `git_commit_sha`.
pub fn make_info_span(name: &str, op_id: u32, component: &str) -> tracing::Span {
    let commit = commit_sha();
    tracing::span!(
        target: "dex_core",
        Level::INFO,
        "op",
        git_commit_sha = %commit,
        span_name = %name,
        op_id = op_id,
        component = component
    )
}
