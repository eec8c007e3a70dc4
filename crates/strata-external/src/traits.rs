use crate::error::ExternalResult;

/// Storage behind one external protocol.
///
/// A backend serves any number of clusters. Stored blobs are immutable: ids
/// are handed out by the backend on write and never reused.
pub trait ExternalBackend: Send + Sync {
    /// Fetch the bytes stored under `id` in `cluster`.
    ///
    /// Returns `Ok(None)` if the cluster exists but has no such blob.
    fn fetch(&self, cluster: &str, id: &str) -> ExternalResult<Option<Vec<u8>>>;

    /// Store `data` in `cluster` and return the new id.
    fn store(&self, cluster: &str, data: &[u8]) -> ExternalResult<String>;
}
