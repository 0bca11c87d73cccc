use opentelemetry_otlp::{WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    Resource, runtime,
    trace::{RandomIdGenerator, TracerProvider},
};

use crate::config::TelemetryConfig;
use crate::error::PluginResult;
use crate::telemetry::bearer_metadata;

/// Build the tracer provider for a resolved configuration.
///
/// Returns `None` when traces are disabled. With the export gate off,
/// spans are printed to stdout through a simple processor; with it on,
/// they are batched to the OTLP endpoint with the caller's authorization
/// attached.
pub(crate) fn init_tracer_provider(
    config: &TelemetryConfig,
    resource: Resource,
    endpoint: &str,
    authorization: Option<&str>,
) -> PluginResult<Option<TracerProvider>> {
    if config.traces_disabled {
        return Ok(None);
    }

    let builder = TracerProvider::builder()
        .with_sampler(config.sampler.clone())
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource);

    let provider = if config.export_enabled {
        let mut exporter_builder = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint);
        if let Some(authorization) = authorization {
            exporter_builder = exporter_builder.with_metadata(bearer_metadata(authorization)?);
        }
        let exporter = exporter_builder.build()?;
        builder.with_batch_exporter(exporter, runtime::Tokio).build()
    } else {
        builder
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build()
    };

    Ok(Some(provider))
}
