//! Tracing initialization for the pagelens binary.
//!
//! Logging is always structured via `tracing`. Span export to
//! OpenTelemetry is opt-in (the `--otel` flag) and writes to stdout,
//! which is enough for inspecting capability-call spans locally; a real
//! deployment would swap in an OTLP exporter here.

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Kept so [`shutdown_tracing`] can flush buffered spans at exit.
static OTEL_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Install the global subscriber.
///
/// `RUST_LOG` controls the filter; without it, everything at `info` and
/// above is kept. Fails if a subscriber is already installed.
pub fn init_tracing(enable_otel: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    if !enable_otel {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt)
            .try_init()?;
        return Ok(());
    }

    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .build();
    let tracer = provider.tracer("pagelens");
    let _ = OTEL_PROVIDER.set(provider.clone());
    opentelemetry::global::set_tracer_provider(provider);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()?;
    Ok(())
}

/// Flush and shut down the OTel provider. No-op when `--otel` was off.
pub fn shutdown_tracing() {
    if let Some(provider) = OTEL_PROVIDER.get() {
        if let Err(err) = provider.shutdown() {
            tracing::warn!("otel provider shutdown failed: {err}");
        }
    }
}
