mod config;
mod credentials;
mod environment;
mod error;
mod plugin;
mod store;
mod telemetry;

// Re-export public API
pub use config::{
    AUTO_INSTRUMENTATIONS, DEVELOPMENT_METRIC_EXPORT_INTERVAL, DEVELOPMENT_METRIC_EXPORT_TIMEOUT,
    Instrumentation, InstrumentationOptions, PRODUCTION_METRIC_EXPORT_INTERVAL,
    PRODUCTION_METRIC_EXPORT_TIMEOUT, TelemetryConfig, TelemetryOverrides, resolve,
};
pub use credentials::{CLOUD_PLATFORM_SCOPE, Credentials};
pub use environment::{RUNTIME_ENV_VAR, RuntimeEnvironment};
pub use error::{PluginError, PluginResult};
pub use plugin::{DEFAULT_OTLP_ENDPOINT, GcloudPlugin, GcloudPluginBuilder};
pub use store::{
    DEFAULT_TRACE_COLLECTION, FirestoreTraceStore, InMemoryTraceStore, SpanRecord, TraceData,
    TraceStore,
};
pub use telemetry::ActionMetrics;

// Re-export the sampler type so integrators can override sampling without
// depending on opentelemetry_sdk directly.
pub use opentelemetry_sdk::trace::Sampler;

// Re-export async_trait for custom TraceStore implementations
pub use async_trait::async_trait;
