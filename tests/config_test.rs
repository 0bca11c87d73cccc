//! Integration tests for telemetry configuration resolution.
//!
//! These exercise the public resolution contract: environment defaults,
//! per-field override layering, and the development export opt-in.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::time::Duration;

use gcloud_telemetry::{
    Instrumentation, InstrumentationOptions, RuntimeEnvironment, Sampler, TelemetryOverrides,
    resolve,
};

// ============================================================================
// Environment Defaults
// ============================================================================

#[test]
fn test_development_defaults() {
    let config = resolve(RuntimeEnvironment::Development, &TelemetryOverrides::default());

    assert!(!config.export_enabled);
    assert!(!config.metrics_disabled);
    assert!(!config.traces_disabled);
    assert!(config.auto_instrumentation_enabled);
    assert_eq!(config.metric_export_interval, Duration::from_millis(5_000));
    assert_eq!(config.metric_export_timeout, Duration::from_millis(5_000));
    assert_eq!(format!("{:?}", config.sampler), format!("{:?}", Sampler::AlwaysOn));
    assert!(config.extra_instrumentations.is_empty());
}

#[test]
fn test_production_defaults() {
    let config = resolve(RuntimeEnvironment::Production, &TelemetryOverrides::default());

    assert!(config.export_enabled);
    assert!(!config.metrics_disabled);
    assert!(!config.traces_disabled);
    assert_eq!(config.metric_export_interval, Duration::from_millis(300_000));
    assert_eq!(config.metric_export_timeout, Duration::from_millis(30_000));
}

#[test]
fn test_defaults_disable_noisy_instrumentations() {
    for environment in [RuntimeEnvironment::Development, RuntimeEnvironment::Production] {
        let config = resolve(environment, &TelemetryOverrides::default());
        assert!(!config.auto_instrumentation_options["dns"].enabled);
        assert!(!config.auto_instrumentation_options["fs"].enabled);
    }
}

// ============================================================================
// Override Layering
// ============================================================================

#[test]
fn test_every_override_field_wins() {
    let mut instrumentation_options = HashMap::new();
    instrumentation_options.insert("http".to_string(), InstrumentationOptions::disabled());

    let overrides = TelemetryOverrides {
        sampler: Some(Sampler::AlwaysOff),
        auto_instrumentation_enabled: Some(false),
        auto_instrumentation_options: Some(instrumentation_options.clone()),
        extra_instrumentations: Some(vec![Instrumentation::new("redis")]),
        metric_export_interval: Some(Duration::from_secs(7)),
        metric_export_timeout: Some(Duration::from_secs(3)),
        metrics_disabled: Some(true),
        traces_disabled: Some(true),
        export_enabled: Some(false),
        force_dev_export: false,
    };

    let config = resolve(RuntimeEnvironment::Production, &overrides);

    assert_eq!(format!("{:?}", config.sampler), format!("{:?}", Sampler::AlwaysOff));
    assert!(!config.auto_instrumentation_enabled);
    assert_eq!(config.auto_instrumentation_options, instrumentation_options);
    assert_eq!(
        config.extra_instrumentations,
        vec![Instrumentation::new("redis")]
    );
    assert_eq!(config.metric_export_interval, Duration::from_secs(7));
    assert_eq!(config.metric_export_timeout, Duration::from_secs(3));
    assert!(config.metrics_disabled);
    assert!(config.traces_disabled);
    assert!(!config.export_enabled);
}

#[test]
fn test_absent_fields_keep_environment_defaults() {
    let overrides = TelemetryOverrides {
        metrics_disabled: Some(true),
        ..Default::default()
    };

    let config = resolve(RuntimeEnvironment::Production, &overrides);

    assert!(config.metrics_disabled);
    // Everything else untouched.
    assert!(config.export_enabled);
    assert!(!config.traces_disabled);
    assert_eq!(config.metric_export_interval, Duration::from_millis(300_000));
}

#[test]
fn test_instrumentation_override_is_shallow() {
    // Overriding the options map replaces it wholesale; the default
    // dns/fs entries must not survive the replacement.
    let mut replacement = HashMap::new();
    replacement.insert(
        "http".to_string(),
        InstrumentationOptions {
            enabled: true,
            settings: HashMap::new(),
        },
    );

    let config = resolve(
        RuntimeEnvironment::Development,
        &TelemetryOverrides {
            auto_instrumentation_options: Some(replacement),
            ..Default::default()
        },
    );

    assert_eq!(config.auto_instrumentation_options.len(), 1);
    assert!(!config.auto_instrumentation_options.contains_key("dns"));
    assert!(!config.auto_instrumentation_options.contains_key("fs"));
}

// ============================================================================
// Development Export Opt-In
// ============================================================================

#[test]
fn test_force_dev_export_flips_the_development_default() {
    let forced = resolve(
        RuntimeEnvironment::Development,
        &TelemetryOverrides {
            force_dev_export: true,
            ..Default::default()
        },
    );
    assert!(forced.export_enabled);
}

#[test]
fn test_force_dev_export_is_ignored_in_production() {
    let config = resolve(
        RuntimeEnvironment::Production,
        &TelemetryOverrides {
            force_dev_export: true,
            ..Default::default()
        },
    );
    // Production already exports; the flag must not change anything else.
    assert!(config.export_enabled);
}

#[test]
fn test_explicit_export_override_still_wins_over_the_coupling() {
    let config = resolve(
        RuntimeEnvironment::Development,
        &TelemetryOverrides {
            force_dev_export: true,
            export_enabled: Some(false),
            ..Default::default()
        },
    );
    assert!(!config.export_enabled);
}

// ============================================================================
// Purity
// ============================================================================

#[test]
fn test_identical_inputs_yield_structurally_equal_configs() {
    let overrides = TelemetryOverrides {
        sampler: Some(Sampler::TraceIdRatioBased(0.5)),
        metric_export_interval: Some(Duration::from_secs(42)),
        extra_instrumentations: Some(vec![Instrumentation::new("postgres")]),
        ..Default::default()
    };

    for environment in [RuntimeEnvironment::Development, RuntimeEnvironment::Production] {
        let first = resolve(environment, &overrides);
        let second = resolve(environment, &overrides);
        assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }
}
