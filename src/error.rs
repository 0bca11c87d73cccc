use opentelemetry::trace::TraceError;
use opentelemetry_sdk::metrics::MetricError;
use thiserror::Error;

/// Error type for plugin initialization and telemetry pipeline failures.
///
/// Configuration resolution itself is total and never fails; everything
/// fallible lives in the wiring around it (exporters, the subscriber,
/// credentials, the trace store).
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("OpenTelemetry trace pipeline error: {0}")]
    Trace(#[from] TraceError),

    #[error("OpenTelemetry metric pipeline error: {0}")]
    Metric(#[from] MetricError),

    #[error("Failed to set global subscriber: {0}")]
    SubscriberInit(#[from] tracing_subscriber::util::TryInitError),

    #[error("Failed to load Google credentials: {0}")]
    Credentials(#[from] gcp_auth::Error),

    #[error("Trace store error: {0}")]
    TraceStore(#[from] firestore::errors::FirestoreError),

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

/// Result type alias used throughout the crate.
pub type PluginResult<T> = Result<T, PluginError>;
