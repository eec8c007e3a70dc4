use std::collections::HashMap;

use strata_types::BlobFlags;

use crate::error::RowResult;
use crate::row::StoredRow;

/// Append-only store of text rows.
///
/// Implementations must satisfy these invariants:
/// - Text ids are positive and never reused.
/// - A row is never modified after `insert_row` returns.
/// - Inserts are atomic: a failed insert leaves no row behind.
pub trait RowStore: Send + Sync {
    /// Identifier of the database domain this store serves.
    ///
    /// Used to scope cache keys so that stores of different tenants never
    /// share entries.
    fn domain_id(&self) -> &str;

    /// Fetch many rows in one query.
    ///
    /// Ids with no row are absent from the returned map.
    fn fetch_rows(&self, text_ids: &[u64]) -> RowResult<HashMap<u64, StoredRow>>;

    /// Insert a new row and return its text id.
    fn insert_row(&self, raw: &[u8], flags: BlobFlags) -> RowResult<u64>;

    /// Fetch a single row.
    fn fetch_row(&self, text_id: u64) -> RowResult<Option<StoredRow>> {
        Ok(self.fetch_rows(&[text_id])?.remove(&text_id))
    }
}
