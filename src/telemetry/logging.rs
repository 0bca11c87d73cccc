use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::TelemetryConfig;
use crate::error::PluginResult;

/// Install the global `tracing` subscriber.
///
/// The output format follows the export gate: a compact console formatter
/// for local work, JSON once logs leave the process (the Cloud Logging
/// agent ingests structured stdout). When a tracer provider exists, span
/// context flows through the OpenTelemetry layer so logs correlate with
/// exported traces.
pub(crate) fn init_subscriber(
    config: &TelemetryConfig,
    tracer_provider: Option<&TracerProvider>,
) -> PluginResult<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.export_enabled {
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .boxed(),
        );
    } else {
        layers.push(tracing_subscriber::fmt::layer().compact().boxed());
    }

    if let Some(provider) = tracer_provider {
        let tracer = provider.tracer("gcloud-telemetry");
        layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    Ok(())
}
