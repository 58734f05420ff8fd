use crate::{ClipRecord, ClipResult, ClipSummary};

use std::future::Future;

/// Durable keyed storage for clip records.
///
/// Every call is its own transaction. Callers must not assume atomicity
/// across calls: an insert followed by a list can race with a concurrent
/// delete.
pub trait ClipStorage: Send + Sync {
    /// Append a new record and return the identifier the store assigned.
    fn insert(&self, name: String, data: Vec<u8>) -> impl Future<Output = ClipResult<i64>> + Send;

    /// Return every record in insertion order.
    fn list_all(&self) -> impl Future<Output = ClipResult<Vec<ClipRecord>>> + Send;

    /// Return the id, name and size of every record in insertion order,
    /// without loading payloads.
    fn list_summaries(&self) -> impl Future<Output = ClipResult<Vec<ClipSummary>>> + Send;

    /// Load one record with its payload, or `None` if `id` is absent.
    fn get_by_id(&self, id: i64) -> impl Future<Output = ClipResult<Option<ClipRecord>>> + Send;

    /// Remove the record with `id`. Removing an absent id is a no-op.
    fn delete_by_id(&self, id: i64) -> impl Future<Output = ClipResult<()>> + Send;
}
