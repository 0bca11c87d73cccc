//! Trace persistence.
//!
//! Finished traces are written to a document store so the host framework
//! can inspect them later: Firestore when telemetry is exported, an
//! in-memory store during local development and in tests.

mod firestore;
mod memory;

pub use firestore::{DEFAULT_TRACE_COLLECTION, FirestoreTraceStore};
pub use memory::InMemoryTraceStore;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single recorded span within a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub span_id: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    pub display_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Span attributes, stored uninterpreted.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, JsonValue>,
    /// Terminal status label ("ok", "error", ...), if the span set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A persisted trace: identity, bounds, and its spans keyed by span id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceData {
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub spans: HashMap<String, SpanRecord>,
}

impl TraceData {
    /// Fold a later write for the same trace into this record.
    ///
    /// Spans accumulate across saves (a trace is written incrementally as
    /// its spans finish); the incoming record wins on display name and
    /// widens the time bounds.
    pub fn merge_from(&mut self, other: TraceData) {
        if other.display_name.is_some() {
            self.display_name = other.display_name;
        }
        if other.start_time < self.start_time {
            self.start_time = other.start_time;
        }
        if other.end_time > self.end_time {
            self.end_time = other.end_time;
        }
        self.spans.extend(other.spans);
    }
}

/// Persistence contract for traces.
///
/// Implementations must be shareable across the async runtime; errors are
/// surfaced as `anyhow::Error` so backends can carry their own error
/// types through the seam.
#[async_trait]
pub trait TraceStore: Send + Sync {
    /// Persist a trace. Saving an id that already exists merges the new
    /// record into the stored one (see [`TraceData::merge_from`]).
    async fn save(&self, trace_id: &str, trace: TraceData) -> anyhow::Result<()>;

    /// Fetch a trace by id.
    async fn load(&self, trace_id: &str) -> anyhow::Result<Option<TraceData>>;

    /// List the most recently started traces, newest first.
    async fn list(&self, limit: usize) -> anyhow::Result<Vec<TraceData>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn span(trace_id: &str, span_id: &str, name: &str) -> SpanRecord {
        SpanRecord {
            span_id: span_id.to_string(),
            trace_id: trace_id.to_string(),
            parent_span_id: None,
            display_name: name.to_string(),
            start_time: Utc.timestamp_opt(1_000, 0).unwrap(),
            end_time: Utc.timestamp_opt(1_001, 0).unwrap(),
            attributes: HashMap::new(),
            status: None,
        }
    }

    fn trace(trace_id: &str, start: i64, end: i64) -> TraceData {
        TraceData {
            trace_id: trace_id.to_string(),
            display_name: None,
            start_time: Utc.timestamp_opt(start, 0).unwrap(),
            end_time: Utc.timestamp_opt(end, 0).unwrap(),
            spans: HashMap::new(),
        }
    }

    #[test]
    fn merge_accumulates_spans_and_widens_bounds() {
        let mut first = trace("t1", 100, 200);
        first
            .spans
            .insert("a".to_string(), span("t1", "a", "root"));

        let mut second = trace("t1", 150, 300);
        second.display_name = Some("flow".to_string());
        second
            .spans
            .insert("b".to_string(), span("t1", "b", "child"));

        first.merge_from(second);

        assert_eq!(first.spans.len(), 2);
        assert_eq!(first.display_name.as_deref(), Some("flow"));
        assert_eq!(first.start_time, Utc.timestamp_opt(100, 0).unwrap());
        assert_eq!(first.end_time, Utc.timestamp_opt(300, 0).unwrap());
    }

    #[test]
    fn merge_prefers_the_incoming_span_for_duplicate_ids() {
        let mut first = trace("t1", 100, 200);
        first
            .spans
            .insert("a".to_string(), span("t1", "a", "old-name"));

        let mut second = trace("t1", 100, 200);
        second
            .spans
            .insert("a".to_string(), span("t1", "a", "new-name"));

        first.merge_from(second);

        assert_eq!(first.spans["a"].display_name, "new-name");
    }
}
