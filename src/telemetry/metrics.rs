//! Metric pipeline and instrument definitions.
//!
//! Instrument names follow OpenTelemetry dot conventions and carry an
//! `action` attribute so dashboards can slice by host-framework action.

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry_otlp::{WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
    runtime,
};

use crate::config::TelemetryConfig;
use crate::error::PluginResult;
use crate::telemetry::bearer_metadata;

// Instrument name constants
pub const ACTION_REQUESTS: &str = "action.requests";
pub const ACTION_FAILURES: &str = "action.failures";
pub const ACTION_LATENCY: &str = "action.latency";

/// Build the meter provider for a resolved configuration.
///
/// Returns `None` when metrics are disabled. The periodic reader flushes
/// on the resolved cadence regardless of where the metrics go: to the
/// OTLP endpoint when the export gate is on, to stdout otherwise.
pub(crate) fn init_meter_provider(
    config: &TelemetryConfig,
    resource: Resource,
    endpoint: &str,
    authorization: Option<&str>,
) -> PluginResult<Option<SdkMeterProvider>> {
    if config.metrics_disabled {
        return Ok(None);
    }

    let reader = if config.export_enabled {
        let mut exporter_builder = opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint);
        if let Some(authorization) = authorization {
            exporter_builder = exporter_builder.with_metadata(bearer_metadata(authorization)?);
        }
        let exporter = exporter_builder.build()?;
        PeriodicReader::builder(exporter, runtime::Tokio)
            .with_interval(config.metric_export_interval)
            .with_timeout(config.metric_export_timeout)
            .build()
    } else {
        PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default(), runtime::Tokio)
            .with_interval(config.metric_export_interval)
            .with_timeout(config.metric_export_timeout)
            .build()
    };

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource)
        .build();

    Ok(Some(provider))
}

/// Instruments the host framework records action activity through.
pub struct ActionMetrics {
    requests: Counter<u64>,
    failures: Counter<u64>,
    latency: Histogram<f64>,
}

impl ActionMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            requests: meter
                .u64_counter(ACTION_REQUESTS)
                .with_description("Completed action invocations")
                .with_unit("{invocation}")
                .build(),
            failures: meter
                .u64_counter(ACTION_FAILURES)
                .with_description("Failed action invocations")
                .with_unit("{invocation}")
                .build(),
            latency: meter
                .f64_histogram(ACTION_LATENCY)
                .with_description("Action latency")
                .with_unit("ms")
                .build(),
        }
    }

    /// Record a completed action invocation.
    pub fn record_request(&self, action: &str) {
        self.requests
            .add(1, &[KeyValue::new("action", action.to_string())]);
    }

    /// Record a failed action invocation with its error code.
    pub fn record_failure(&self, action: &str, error_code: &str) {
        self.failures.add(
            1,
            &[
                KeyValue::new("action", action.to_string()),
                KeyValue::new("error_code", error_code.to_string()),
            ],
        );
    }

    /// Record action latency in milliseconds.
    pub fn record_latency(&self, action: &str, millis: f64) {
        self.latency
            .record(millis, &[KeyValue::new("action", action.to_string())]);
    }
}
