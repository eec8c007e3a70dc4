use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use crate::error::{ExternalError, ExternalResult};
use crate::traits::ExternalBackend;

/// In-memory external backend.
///
/// Intended for tests and embedding. Clusters must be declared before use;
/// ids are assigned per cluster starting at 1.
#[derive(Default)]
pub struct InMemoryExternalBackend {
    clusters: RwLock<HashMap<String, BTreeMap<u64, Vec<u8>>>>,
    read_only: RwLock<HashSet<String>>,
}

impl InMemoryExternalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an empty cluster.
    pub fn with_cluster(self, cluster: &str) -> Self {
        self.clusters
            .write()
            .expect("lock poisoned")
            .entry(cluster.to_string())
            .or_default();
        self
    }

    /// Seed a blob at a fixed id, declaring the cluster if needed.
    pub fn with_blob(self, cluster: &str, id: u64, data: impl Into<Vec<u8>>) -> Self {
        self.clusters
            .write()
            .expect("lock poisoned")
            .entry(cluster.to_string())
            .or_default()
            .insert(id, data.into());
        self
    }

    /// Reject further writes to `cluster`.
    pub fn set_read_only(&self, cluster: &str) {
        self.read_only
            .write()
            .expect("lock poisoned")
            .insert(cluster.to_string());
    }

    /// Number of blobs stored in `cluster`.
    pub fn blob_count(&self, cluster: &str) -> usize {
        self.clusters
            .read()
            .expect("lock poisoned")
            .get(cluster)
            .map_or(0, BTreeMap::len)
    }
}

impl ExternalBackend for InMemoryExternalBackend {
    fn fetch(&self, cluster: &str, id: &str) -> ExternalResult<Option<Vec<u8>>> {
        let clusters = self.clusters.read().expect("lock poisoned");
        let blobs = clusters
            .get(cluster)
            .ok_or_else(|| ExternalError::UnknownCluster(cluster.to_string()))?;
        Ok(id
            .parse::<u64>()
            .ok()
            .and_then(|id| blobs.get(&id))
            .cloned())
    }

    fn store(&self, cluster: &str, data: &[u8]) -> ExternalResult<String> {
        if self.read_only.read().expect("lock poisoned").contains(cluster) {
            return Err(ExternalError::ReadOnly(cluster.to_string()));
        }
        let mut clusters = self.clusters.write().expect("lock poisoned");
        let blobs = clusters
            .get_mut(cluster)
            .ok_or_else(|| ExternalError::UnknownCluster(cluster.to_string()))?;
        let id = blobs.keys().next_back().map_or(1, |last| last + 1);
        blobs.insert(id, data.to_vec());
        Ok(id.to_string())
    }
}

impl std::fmt::Debug for InMemoryExternalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clusters = self.clusters.read().expect("lock poisoned");
        let mut names: Vec<&String> = clusters.keys().collect();
        names.sort();
        f.debug_struct("InMemoryExternalBackend")
            .field("clusters", &names)
            .finish()
    }
}
