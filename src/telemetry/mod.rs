mod config;
mod shutdown;

pub use config::TelemetryConfig;
pub use shutdown::TelemetryGuard;

use crate::error::{ExecutorError, Result};
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber. Logs go to stderr, stdout is reserved for
/// the result document.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryGuard {
    if config.otel_enabled {
        match init_with_otel(config) {
            Ok(provider) => return TelemetryGuard::new(Some(provider)),
            Err(e) => {
                eprintln!(
                    "Failed to initialize OpenTelemetry: {}. Falling back to stderr-only logging.",
                    e
                );
            }
        }
    }

    init_stderr_only(config);
    TelemetryGuard::default()
}

fn env_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter))
}

fn init_with_otel(config: &TelemetryConfig) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(&config.endpoint)
        .with_protocol(opentelemetry_otlp::Protocol::HttpBinary)
        .with_timeout(std::time::Duration::from_secs(5))
        .with_headers(config.headers.clone())
        .build()
        .map_err(|e| ExecutorError::Config(format!("Failed to build OTLP exporter: {}", e)))?;

    let resource = opentelemetry_sdk::Resource::builder_empty()
        .with_service_name(config.service_name.clone())
        .with_attributes([KeyValue::new("service.version", env!("CARGO_PKG_VERSION"))])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build();

    let tracer = provider.tracer("jmeter-executor");
    opentelemetry::global::set_tracer_provider(provider.clone());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()
        .map_err(|e| ExecutorError::Config(format!("Failed to install subscriber: {}", e)))?;

    tracing::info!(endpoint = %config.endpoint, "OpenTelemetry initialized");
    Ok(provider)
}

fn init_stderr_only(config: &TelemetryConfig) {
    let result = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(config))
        .with_target(true)
        .with_line_number(true)
        .try_init();

    if let Err(e) = result {
        eprintln!("Tracing already initialized: {}", e);
    }
}
