use std::collections::HashMap;
use std::time::Duration;

use opentelemetry_sdk::trace::Sampler;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::environment::RuntimeEnvironment;

/// Metric flush cadence for deployed workloads. Long interval keeps
/// ingestion cost and volume down.
pub const PRODUCTION_METRIC_EXPORT_INTERVAL: Duration = Duration::from_millis(300_000);
pub const PRODUCTION_METRIC_EXPORT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Metric flush cadence for local iteration. Short interval gives fast
/// feedback when watching a dev dashboard or stdout.
pub const DEVELOPMENT_METRIC_EXPORT_INTERVAL: Duration = Duration::from_millis(5_000);
pub const DEVELOPMENT_METRIC_EXPORT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Instrumentations enabled automatically when
/// [`TelemetryConfig::auto_instrumentation_enabled`] is set, before
/// per-instrumentation options are applied.
pub const AUTO_INSTRUMENTATIONS: &[&str] = &["http", "grpc", "dns", "fs"];

/// Per-instrumentation toggle and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentationOptions {
    /// Whether this instrumentation is active (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Instrumentation-specific settings, passed through uninterpreted.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub settings: HashMap<String, JsonValue>,
}

fn default_enabled() -> bool {
    true
}

impl Default for InstrumentationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: HashMap::new(),
        }
    }
}

impl InstrumentationOptions {
    /// Options record that switches an instrumentation off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            settings: HashMap::new(),
        }
    }
}

/// An explicitly supplied instrumentation, appended to the automatic set
/// in the order given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrumentation {
    pub name: String,
    #[serde(default)]
    pub options: InstrumentationOptions,
}

impl Instrumentation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: InstrumentationOptions::default(),
        }
    }
}

/// Fully resolved telemetry configuration.
///
/// Produced once by [`resolve`] at plugin initialization and treated as
/// immutable afterwards. Every field is populated; partial configs cannot
/// be expressed in this type.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Span sampling policy (default: sample everything).
    pub sampler: Sampler,
    /// Master switch for the automatic instrumentation set.
    pub auto_instrumentation_enabled: bool,
    /// Per-instrumentation enable/disable and settings. An override
    /// replaces this whole map; entries are never merged individually.
    pub auto_instrumentation_options: HashMap<String, InstrumentationOptions>,
    /// Explicitly supplied instrumentations, appended to the automatic set.
    pub extra_instrumentations: Vec<Instrumentation>,
    /// Periodic metric flush interval.
    pub metric_export_interval: Duration,
    /// Timeout for a single metric flush.
    pub metric_export_timeout: Duration,
    /// Kill-switch for the metric pipeline.
    pub metrics_disabled: bool,
    /// Kill-switch for the trace pipeline.
    pub traces_disabled: bool,
    /// Export gate: when false, telemetry is collected locally (printed
    /// to stdout) but never shipped to Google Cloud.
    pub export_enabled: bool,
}

impl TelemetryConfig {
    /// Base defaults for local iteration.
    ///
    /// Development does not export unless the caller explicitly opts in
    /// via [`TelemetryOverrides::force_dev_export`] - that coupling is
    /// the only place where one override field feeds another field's
    /// default, and an explicit `export_enabled` override still wins.
    pub fn development_defaults(force_dev_export: bool) -> Self {
        Self {
            sampler: Sampler::AlwaysOn,
            auto_instrumentation_enabled: true,
            auto_instrumentation_options: default_auto_instrumentation_options(),
            extra_instrumentations: Vec::new(),
            metric_export_interval: DEVELOPMENT_METRIC_EXPORT_INTERVAL,
            metric_export_timeout: DEVELOPMENT_METRIC_EXPORT_TIMEOUT,
            metrics_disabled: false,
            traces_disabled: false,
            export_enabled: force_dev_export,
        }
    }

    /// Base defaults for deployed workloads.
    pub fn production_defaults() -> Self {
        Self {
            sampler: Sampler::AlwaysOn,
            auto_instrumentation_enabled: true,
            auto_instrumentation_options: default_auto_instrumentation_options(),
            extra_instrumentations: Vec::new(),
            metric_export_interval: PRODUCTION_METRIC_EXPORT_INTERVAL,
            metric_export_timeout: PRODUCTION_METRIC_EXPORT_TIMEOUT,
            metrics_disabled: false,
            traces_disabled: false,
            export_enabled: true,
        }
    }

    /// Names of the instrumentations that end up active: the automatic
    /// set filtered through its options, then the extras in order.
    pub fn active_instrumentations(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        if self.auto_instrumentation_enabled {
            for name in AUTO_INSTRUMENTATIONS {
                let enabled = self
                    .auto_instrumentation_options
                    .get(*name)
                    .is_none_or(|options| options.enabled);
                if enabled {
                    names.push((*name).to_string());
                }
            }
        }
        for extra in &self.extra_instrumentations {
            if extra.options.enabled && !names.iter().any(|n| n == &extra.name) {
                names.push(extra.name.clone());
            }
        }
        names
    }
}

/// The noisy, low-value instrumentations are off by default.
fn default_auto_instrumentation_options() -> HashMap<String, InstrumentationOptions> {
    let mut options = HashMap::new();
    options.insert("dns".to_string(), InstrumentationOptions::disabled());
    options.insert("fs".to_string(), InstrumentationOptions::disabled());
    options
}

/// Caller-supplied partial configuration.
///
/// Any field set here replaces the environment default for that field;
/// unset fields keep the default. There is no deep merging: an override
/// for `auto_instrumentation_options` replaces the whole map.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gcloud_telemetry::{resolve, RuntimeEnvironment, TelemetryOverrides};
///
/// let config = resolve(
///     RuntimeEnvironment::Production,
///     &TelemetryOverrides {
///         metric_export_interval: Some(Duration::from_secs(60)),
///         ..Default::default()
///     },
/// );
/// assert_eq!(config.metric_export_interval, Duration::from_secs(60));
/// assert!(config.export_enabled);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TelemetryOverrides {
    pub sampler: Option<Sampler>,
    pub auto_instrumentation_enabled: Option<bool>,
    pub auto_instrumentation_options: Option<HashMap<String, InstrumentationOptions>>,
    pub extra_instrumentations: Option<Vec<Instrumentation>>,
    pub metric_export_interval: Option<Duration>,
    pub metric_export_timeout: Option<Duration>,
    pub metrics_disabled: Option<bool>,
    pub traces_disabled: Option<bool>,
    pub export_enabled: Option<bool>,
    /// Opt development into remote export. This feeds the development
    /// *default* for `export_enabled`; it is not itself an override of
    /// that field. Ignored in production, where export defaults to on.
    pub force_dev_export: bool,
}

/// Resolve the telemetry configuration for an environment.
///
/// Pure and total: picks the base default record for `environment`, then
/// overlays every override field that is set. Values are not validated
/// here - a zero interval passes through to the SDK, which enforces its
/// own contracts.
pub fn resolve(
    environment: RuntimeEnvironment,
    overrides: &TelemetryOverrides,
) -> TelemetryConfig {
    let base = match environment {
        RuntimeEnvironment::Development => {
            TelemetryConfig::development_defaults(overrides.force_dev_export)
        }
        RuntimeEnvironment::Production => TelemetryConfig::production_defaults(),
    };

    TelemetryConfig {
        sampler: overrides.sampler.clone().unwrap_or(base.sampler),
        auto_instrumentation_enabled: overrides
            .auto_instrumentation_enabled
            .unwrap_or(base.auto_instrumentation_enabled),
        auto_instrumentation_options: overrides
            .auto_instrumentation_options
            .clone()
            .unwrap_or(base.auto_instrumentation_options),
        extra_instrumentations: overrides
            .extra_instrumentations
            .clone()
            .unwrap_or(base.extra_instrumentations),
        metric_export_interval: overrides
            .metric_export_interval
            .unwrap_or(base.metric_export_interval),
        metric_export_timeout: overrides
            .metric_export_timeout
            .unwrap_or(base.metric_export_timeout),
        metrics_disabled: overrides.metrics_disabled.unwrap_or(base.metrics_disabled),
        traces_disabled: overrides.traces_disabled.unwrap_or(base.traces_disabled),
        export_enabled: overrides.export_enabled.unwrap_or(base.export_enabled),
    }
}
