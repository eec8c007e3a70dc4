use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use strata_types::BlobFlags;
use tracing::debug;

use crate::error::{RowError, RowResult};
use crate::row::StoredRow;
use crate::traits::RowStore;

/// Domain id used by [`InMemoryRowStore::new`].
pub const DEFAULT_DOMAIN_ID: &str = "strata-local";

/// In-memory, `BTreeMap`-based row store.
///
/// Intended for tests and embedding. Counts fetch queries so callers can
/// check how many round trips an operation made, and can be switched
/// read-only or unavailable to exercise failure paths.
pub struct InMemoryRowStore {
    domain_id: String,
    rows: RwLock<BTreeMap<u64, StoredRow>>,
    fetch_queries: AtomicUsize,
    read_only: AtomicBool,
    unavailable: AtomicBool,
}

impl InMemoryRowStore {
    /// Create a new empty store in the default domain.
    pub fn new() -> Self {
        Self::with_domain(DEFAULT_DOMAIN_ID)
    }

    /// Create a new empty store in `domain_id`.
    pub fn with_domain(domain_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            rows: RwLock::new(BTreeMap::new()),
            fetch_queries: AtomicUsize::new(0),
            read_only: AtomicBool::new(false),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Seed a row at a fixed text id, bypassing the append-only rule.
    ///
    /// For fixtures that need raw bytes the compress path would never write.
    pub fn insert_raw(&self, text_id: u64, raw: impl Into<Vec<u8>>, flags: BlobFlags) -> RowResult<()> {
        if text_id == 0 {
            return Err(RowError::InvalidTextId(text_id));
        }
        self.rows
            .write()
            .expect("lock poisoned")
            .insert(text_id, StoredRow::new(text_id, raw.into(), flags));
        Ok(())
    }

    /// Number of rows stored.
    pub fn len(&self) -> usize {
        self.rows.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.read().expect("lock poisoned").is_empty()
    }

    /// Number of `fetch_rows` queries served so far.
    pub fn fetch_query_count(&self) -> usize {
        self.fetch_queries.load(Ordering::SeqCst)
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Make every query fail with [`RowError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> RowResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RowError::Unavailable(format!(
                "domain {} is down",
                self.domain_id
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryRowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RowStore for InMemoryRowStore {
    fn domain_id(&self) -> &str {
        &self.domain_id
    }

    fn fetch_rows(&self, text_ids: &[u64]) -> RowResult<HashMap<u64, StoredRow>> {
        self.check_available()?;
        self.fetch_queries.fetch_add(1, Ordering::SeqCst);

        let rows = self.rows.read().expect("lock poisoned");
        Ok(text_ids
            .iter()
            .filter_map(|id| rows.get(id).map(|row| (*id, row.clone())))
            .collect())
    }

    fn insert_row(&self, raw: &[u8], flags: BlobFlags) -> RowResult<u64> {
        self.check_available()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(RowError::ReadOnly);
        }

        let mut rows = self.rows.write().expect("lock poisoned");
        let text_id = rows.keys().next_back().map_or(1, |last| last + 1);
        rows.insert(text_id, StoredRow::new(text_id, raw.to_vec(), flags));
        debug!(text_id, bytes = raw.len(), flags = %flags, "inserted text row");
        Ok(text_id)
    }
}

impl std::fmt::Debug for InMemoryRowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRowStore")
            .field("domain_id", &self.domain_id)
            .field("row_count", &self.len())
            .finish()
    }
}
