use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{TraceData, TraceStore};

/// Trace store backed by a process-local map.
///
/// The development default: traces stay inspectable without a Google
/// Cloud project. Also used throughout the test suite.
#[derive(Debug, Default)]
pub struct InMemoryTraceStore {
    traces: RwLock<HashMap<String, TraceData>>,
}

impl InMemoryTraceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TraceStore for InMemoryTraceStore {
    async fn save(&self, trace_id: &str, trace: TraceData) -> anyhow::Result<()> {
        let mut traces = self.traces.write().await;
        match traces.get_mut(trace_id) {
            Some(existing) => existing.merge_from(trace),
            None => {
                traces.insert(trace_id.to_string(), trace);
            }
        }
        Ok(())
    }

    async fn load(&self, trace_id: &str) -> anyhow::Result<Option<TraceData>> {
        Ok(self.traces.read().await.get(trace_id).cloned())
    }

    async fn list(&self, limit: usize) -> anyhow::Result<Vec<TraceData>> {
        let traces = self.traces.read().await;
        let mut all: Vec<TraceData> = traces.values().cloned().collect();
        all.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        all.truncate(limit);
        Ok(all)
    }
}
