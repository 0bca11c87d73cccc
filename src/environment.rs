/// Process variable consulted by [`RuntimeEnvironment::detect`].
pub const RUNTIME_ENV_VAR: &str = "RUNTIME_ENV";

/// Runtime environment classification supplied by the host framework.
///
/// The environment picks the base defaults for telemetry resolution:
/// development favors fast local feedback (short metric intervals, no
/// remote export), production favors cost and volume control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeEnvironment {
    /// Local iteration. Telemetry stays in-process unless export is
    /// explicitly forced on.
    Development,
    /// Deployed workload. Telemetry is exported to Google Cloud.
    #[default]
    Production,
}

impl RuntimeEnvironment {
    /// Classify the current process from the `RUNTIME_ENV` variable.
    ///
    /// Unset or unrecognized values classify as [`Production`](Self::Production),
    /// so a deployment can never silently fall back to non-exporting
    /// development behavior.
    pub fn detect() -> Self {
        std::env::var(RUNTIME_ENV_VAR)
            .map(|value| Self::from_label(&value))
            .unwrap_or(Self::Production)
    }

    /// Parse an environment label. Unrecognized labels map to production.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}
