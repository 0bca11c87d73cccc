use std::sync::Arc;
use std::time::Duration;

use opentelemetry::{KeyValue, global};
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::{Sampler, TracerProvider};

use crate::config::{TelemetryConfig, TelemetryOverrides, resolve};
use crate::credentials::Credentials;
use crate::environment::RuntimeEnvironment;
use crate::error::PluginResult;
use crate::store::{FirestoreTraceStore, InMemoryTraceStore, TraceStore};
use crate::telemetry::{ActionMetrics, init_meter_provider, init_subscriber, init_tracer_provider};

/// Default OTLP endpoint for Google Cloud telemetry ingestion.
pub const DEFAULT_OTLP_ENDPOINT: &str = "https://telemetry.googleapis.com";

/// The Google Cloud telemetry plugin.
///
/// Holds the resolved configuration, the OpenTelemetry providers, the
/// trace store, and the action instruments. Constructed once per process
/// via [`GcloudPlugin::builder`]; shut down with [`shutdown`](Self::shutdown)
/// to flush pending telemetry.
///
/// # Example
///
/// ```ignore
/// let plugin = GcloudPlugin::builder()
///     .service_name("my-service")
///     .environment(RuntimeEnvironment::Production)
///     .sampler(Sampler::TraceIdRatioBased(0.1))
///     .init()
///     .await?;
///
/// plugin.metrics().record_request("generate");
///
/// // ... on exit:
/// plugin.shutdown();
/// ```
pub struct GcloudPlugin {
    environment: RuntimeEnvironment,
    config: TelemetryConfig,
    project_id: Option<String>,
    tracer_provider: Option<TracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
    trace_store: Arc<dyn TraceStore>,
    metrics: ActionMetrics,
}

impl GcloudPlugin {
    /// Access the builder for custom configuration.
    pub fn builder() -> GcloudPluginBuilder {
        GcloudPluginBuilder::new()
    }

    /// The environment the plugin resolved against.
    pub fn environment(&self) -> RuntimeEnvironment {
        self.environment
    }

    /// The resolved, immutable telemetry configuration.
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// The Google Cloud project in use, when one was discovered.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// The trace store selected for this environment.
    pub fn trace_store(&self) -> Arc<dyn TraceStore> {
        self.trace_store.clone()
    }

    /// Instruments for recording host-framework action activity.
    pub fn metrics(&self) -> &ActionMetrics {
        &self.metrics
    }

    /// Flush pending spans and metrics without shutting down.
    pub fn force_flush(&self) -> PluginResult<()> {
        if let Some(provider) = &self.tracer_provider {
            for result in provider.force_flush() {
                result?;
            }
        }
        if let Some(provider) = &self.meter_provider {
            provider.force_flush()?;
        }
        Ok(())
    }

    /// Gracefully shut down telemetry, flushing any pending data.
    pub fn shutdown(self) {
        if let Some(provider) = self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                tracing::error!("Failed to shutdown tracer provider: {}", e);
            }
        }
        if let Some(provider) = self.meter_provider {
            if let Err(e) = provider.shutdown() {
                tracing::error!("Failed to shutdown meter provider: {}", e);
            }
        }
    }
}

/// Builder for configuring a [`GcloudPlugin`].
///
/// Environment and project id are discovered when not set explicitly;
/// telemetry fields not overridden here keep their environment defaults
/// (see [`resolve`]).
///
/// # Example
///
/// ```ignore
/// let plugin = GcloudPlugin::builder()
///     .service_name("orchestrator")
///     .project_id("my-project")
///     .metric_export_interval(Duration::from_secs(60))
///     .force_dev_export(true)
///     .init()
///     .await?;
/// ```
pub struct GcloudPluginBuilder {
    service_name: String,
    project_id: Option<String>,
    environment: Option<RuntimeEnvironment>,
    otlp_endpoint: String,
    trace_collection: String,
    overrides: TelemetryOverrides,
    install_subscriber: bool,
}

impl GcloudPluginBuilder {
    pub fn new() -> Self {
        Self {
            service_name: env!("CARGO_PKG_NAME").to_string(),
            project_id: None,
            environment: None,
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            trace_collection: crate::store::DEFAULT_TRACE_COLLECTION.to_string(),
            overrides: TelemetryOverrides::default(),
            install_subscriber: true,
        }
    }

    /// Set the service name attached to all exported telemetry.
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Set the Google Cloud project explicitly instead of discovering it
    /// from the credentials.
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the runtime environment explicitly instead of reading
    /// `RUNTIME_ENV`.
    pub fn environment(mut self, environment: RuntimeEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Override the OTLP ingestion endpoint (e.g. a local collector).
    pub fn otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Firestore collection for persisted traces (default: `traces`).
    pub fn trace_collection(mut self, collection: impl Into<String>) -> Self {
        self.trace_collection = collection.into();
        self
    }

    /// Supply a full override record at once.
    pub fn overrides(mut self, overrides: TelemetryOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Override the span sampling policy.
    pub fn sampler(mut self, sampler: Sampler) -> Self {
        self.overrides.sampler = Some(sampler);
        self
    }

    /// Opt development into remote export.
    pub fn force_dev_export(mut self, force: bool) -> Self {
        self.overrides.force_dev_export = force;
        self
    }

    /// Override the export gate directly.
    pub fn export_enabled(mut self, enabled: bool) -> Self {
        self.overrides.export_enabled = Some(enabled);
        self
    }

    /// Kill-switch for the metric pipeline.
    pub fn metrics_disabled(mut self, disabled: bool) -> Self {
        self.overrides.metrics_disabled = Some(disabled);
        self
    }

    /// Kill-switch for the trace pipeline.
    pub fn traces_disabled(mut self, disabled: bool) -> Self {
        self.overrides.traces_disabled = Some(disabled);
        self
    }

    /// Override the periodic metric flush interval.
    pub fn metric_export_interval(mut self, interval: Duration) -> Self {
        self.overrides.metric_export_interval = Some(interval);
        self
    }

    /// Override the per-flush metric export timeout.
    pub fn metric_export_timeout(mut self, timeout: Duration) -> Self {
        self.overrides.metric_export_timeout = Some(timeout);
        self
    }

    /// Skip installing the global `tracing` subscriber. Use when the
    /// embedding application owns subscriber setup.
    pub fn install_subscriber(mut self, install: bool) -> Self {
        self.install_subscriber = install;
        self
    }

    /// Resolve configuration and initialize the telemetry subsystems.
    ///
    /// This will:
    /// 1. Classify the environment and resolve the configuration
    /// 2. Load credentials and discover the project (export gate on only)
    /// 3. Build the trace and metric pipelines and install the subscriber
    /// 4. Register global providers and select the trace store
    pub async fn init(self) -> PluginResult<GcloudPlugin> {
        let environment = self.environment.unwrap_or_else(RuntimeEnvironment::detect);
        let config = resolve(environment, &self.overrides);

        let mut project_id = self.project_id;
        let mut authorization = None;
        if config.export_enabled {
            let credentials = Credentials::application_default().await?;
            if project_id.is_none() {
                project_id = Some(credentials.project_id().await?);
            }
            authorization = Some(credentials.bearer_token().await?);
        }

        let resource = build_resource(&self.service_name, project_id.as_deref());

        let tracer_provider = init_tracer_provider(
            &config,
            resource.clone(),
            &self.otlp_endpoint,
            authorization.as_deref(),
        )?;
        let meter_provider =
            init_meter_provider(&config, resource, &self.otlp_endpoint, authorization.as_deref())?;

        if self.install_subscriber {
            init_subscriber(&config, tracer_provider.as_ref())?;
        }

        if let Some(provider) = &tracer_provider {
            global::set_tracer_provider(provider.clone());
        }
        if let Some(provider) = &meter_provider {
            global::set_meter_provider(provider.clone());
        }

        let metrics = match &meter_provider {
            Some(provider) => ActionMetrics::new(&provider.meter("gcloud-telemetry")),
            // Metrics disabled: instruments bind to the global no-op meter.
            None => ActionMetrics::new(&global::meter("gcloud-telemetry")),
        };

        let trace_store: Arc<dyn TraceStore> = match (&project_id, config.export_enabled) {
            (Some(project), true) => {
                let store = FirestoreTraceStore::with_collection(
                    firestore::FirestoreDb::new(project).await?,
                    self.trace_collection,
                );
                Arc::new(store)
            }
            _ => Arc::new(InMemoryTraceStore::new()),
        };

        tracing::debug!(
            environment = ?environment,
            export_enabled = config.export_enabled,
            instrumentations = ?config.active_instrumentations(),
            "telemetry initialized"
        );

        Ok(GcloudPlugin {
            environment,
            config,
            project_id,
            tracer_provider,
            meter_provider,
            trace_store,
            metrics,
        })
    }
}

impl Default for GcloudPluginBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn build_resource(service_name: &str, project_id: Option<&str>) -> Resource {
    let mut attributes = vec![
        KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            service_name.to_string(),
        ),
        KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
            env!("CARGO_PKG_VERSION"),
        ),
    ];
    if let Some(project) = project_id {
        attributes.push(KeyValue::new("gcp.project_id", project.to_string()));
    }
    Resource::new(attributes)
}
