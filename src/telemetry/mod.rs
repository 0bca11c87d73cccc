//! Telemetry pipeline wiring.
//!
//! This module turns a resolved [`TelemetryConfig`](crate::TelemetryConfig)
//! into running OpenTelemetry providers and a `tracing` subscriber:
//!
//! - Trace pipeline: sampler + batch OTLP export, or local stdout export
//!   when the export gate is off
//! - Metric pipeline: periodic reader driven by the resolved flush cadence
//! - Logging: console formatter locally, JSON once logs leave the process
//!
//! Construction is separated from installation: the functions here build
//! providers, [`GcloudPluginBuilder::init`](crate::GcloudPluginBuilder::init)
//! registers them globally.

mod logging;
mod metrics;
mod trace;

pub use metrics::ActionMetrics;

pub(crate) use logging::init_subscriber;
pub(crate) use metrics::init_meter_provider;
pub(crate) use trace::init_tracer_provider;

use tonic::metadata::{MetadataMap, MetadataValue};

use crate::error::{PluginError, PluginResult};

/// Build gRPC metadata carrying the `authorization` header for an exporter.
pub(crate) fn bearer_metadata(authorization: &str) -> PluginResult<MetadataMap> {
    let value = MetadataValue::try_from(authorization).map_err(|e| {
        PluginError::InvalidConfiguration {
            reason: format!("authorization header is not valid gRPC metadata: {e}"),
        }
    })?;
    let mut metadata = MetadataMap::new();
    metadata.insert("authorization", value);
    Ok(metadata)
}
