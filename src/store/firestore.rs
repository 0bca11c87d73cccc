use async_trait::async_trait;
use firestore::{FirestoreDb, FirestoreQueryDirection, path};

use super::{TraceData, TraceStore};
use crate::error::PluginResult;

/// Default Firestore collection for persisted traces.
pub const DEFAULT_TRACE_COLLECTION: &str = "traces";

/// Trace store backed by a Firestore collection, one document per trace.
///
/// Merge-on-save is implemented as read-merge-write: trace writes come
/// from a single process between flushes, so last-writer-wins on the
/// document is acceptable.
pub struct FirestoreTraceStore {
    db: FirestoreDb,
    collection: String,
}

impl FirestoreTraceStore {
    /// Connect to the project's default database, writing to the
    /// [`DEFAULT_TRACE_COLLECTION`].
    pub async fn connect(project_id: &str) -> PluginResult<Self> {
        Ok(Self::with_collection(
            FirestoreDb::new(project_id).await?,
            DEFAULT_TRACE_COLLECTION,
        ))
    }

    pub fn new(db: FirestoreDb) -> Self {
        Self::with_collection(db, DEFAULT_TRACE_COLLECTION)
    }

    pub fn with_collection(db: FirestoreDb, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl TraceStore for FirestoreTraceStore {
    async fn save(&self, trace_id: &str, trace: TraceData) -> anyhow::Result<()> {
        let merged = match self.load(trace_id).await? {
            Some(mut existing) => {
                existing.merge_from(trace);
                existing
            }
            None => trace,
        };

        self.db
            .fluent()
            .update()
            .in_col(&self.collection)
            .document_id(trace_id)
            .object(&merged)
            .execute::<TraceData>()
            .await?;
        Ok(())
    }

    async fn load(&self, trace_id: &str) -> anyhow::Result<Option<TraceData>> {
        let trace = self
            .db
            .fluent()
            .select()
            .by_id_in(&self.collection)
            .obj::<TraceData>()
            .one(trace_id)
            .await?;
        Ok(trace)
    }

    async fn list(&self, limit: usize) -> anyhow::Result<Vec<TraceData>> {
        let traces = self
            .db
            .fluent()
            .select()
            .from(self.collection.as_str())
            .order_by([(
                path!(TraceData::start_time),
                FirestoreQueryDirection::Descending,
            )])
            .limit(limit as u32)
            .obj::<TraceData>()
            .query()
            .await?;
        Ok(traces)
    }
}
