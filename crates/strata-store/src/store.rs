use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use strata_cache::BlobCache;
use strata_external::ExternalStoreAccess;
use strata_rows::{RowError, RowStore};
use strata_types::{
    AddressResult, BlobAddress, BlobFlag, BlobFlags, BAD_SCHEMA, EXTERNAL_SCHEMA, ROW_SCHEMA,
};
use tracing::{debug, warn};

use crate::config::BlobStoreConfig;
use crate::error::{AccessFailure, StoreError, StoreResult};
use crate::status::{BatchResult, StatusMessage};

/// Cache namespace for decoded blob text.
pub const CACHE_NAMESPACE: &str = "strata-blob";

/// Where an uncached address is loaded from.
enum Source {
    Row(u64),
    External { pointer: String, flags: BlobFlags },
}

/// Layered blob store.
///
/// Writes compress text through the flag pipeline and append a row (or an
/// external blob plus a pointer row). Reads consult the shared cache first,
/// then the row store or external store, expand the payload, and cache the
/// text under a key scoped by the row store's domain.
pub struct BlobStore {
    rows: Arc<dyn RowStore>,
    external: Arc<ExternalStoreAccess>,
    cache: Arc<dyn BlobCache>,
    config: BlobStoreConfig,
}

impl BlobStore {
    /// Create a store with the default configuration.
    pub fn new(
        rows: Arc<dyn RowStore>,
        external: Arc<ExternalStoreAccess>,
        cache: Arc<dyn BlobCache>,
    ) -> Self {
        Self::with_config(rows, external, cache, BlobStoreConfig::default())
    }

    pub fn with_config(
        rows: Arc<dyn RowStore>,
        external: Arc<ExternalStoreAccess>,
        cache: Arc<dyn BlobCache>,
        config: BlobStoreConfig,
    ) -> Self {
        Self {
            rows,
            external,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &BlobStoreConfig {
        &self.config
    }

    pub fn compress_blobs(&self) -> bool {
        self.config.compress_blobs
    }

    pub fn set_compress_blobs(&mut self, compress: bool) {
        self.config.compress_blobs = compress;
    }

    pub fn legacy_encoding(&self) -> Option<&str> {
        self.config.legacy_encoding.as_deref()
    }

    /// Set the encoding assumed for rows without the `utf-8` flag.
    ///
    /// The label is resolved lazily, so an unknown label only fails once a
    /// blob needs it.
    pub fn set_legacy_encoding(&mut self, encoding: Option<&str>) {
        self.config.legacy_encoding = encoding.map(str::to_string);
    }

    /// Cache lifetime in seconds.
    pub fn cache_expiry(&self) -> u64 {
        self.config.cache_expiry_secs
    }

    pub fn set_cache_expiry(&mut self, secs: u64) {
        self.config.cache_expiry_secs = secs;
    }

    pub fn use_external_store(&self) -> bool {
        self.config.use_external_store
    }

    pub fn set_use_external_store(&mut self, enabled: bool) {
        self.config.use_external_store = enabled;
    }

    /// The `tt:` address of a text row.
    pub fn make_address_from_text_id(text_id: u64) -> String {
        BlobAddress::from_text_id(text_id).to_string()
    }

    /// The text id referenced by `address`.
    ///
    /// Returns `Ok(None)` for well-formed addresses of any schema other than
    /// `tt`, and an error for malformed addresses or invalid `tt` ids.
    pub fn text_id_from_address(address: &str) -> AddressResult<Option<u64>> {
        let parsed = BlobAddress::parse(address)?;
        if !parsed.is_row_address() {
            return Ok(None);
        }
        parsed.row_id().map(Some)
    }

    /// Cache key for the text of `address` in this store's domain.
    pub fn cache_key(&self, address: &str) -> String {
        self.cache
            .make_global_key(CACHE_NAMESPACE, &[self.rows.domain_id(), address])
    }

    /// Run the compress half of the flag pipeline with this store's policy.
    pub fn compress_data(&self, text: &str) -> StoreResult<(Vec<u8>, BlobFlags)> {
        Ok(strata_codec::compress(
            text,
            self.config.compress_blobs,
            self.config.legacy_encoding.as_deref(),
        )?)
    }

    /// Run the expand half of the flag pipeline, ignoring `external`.
    ///
    /// Returns `Ok(None)` if the payload is bad data.
    pub fn decompress_data(&self, raw: &[u8], flags: BlobFlags) -> StoreResult<Option<String>> {
        self.decode(raw, flags, self.config.legacy_encoding.as_deref())
    }

    /// Store `text` as a new blob and return its address.
    ///
    /// Never touches existing rows. With `use_external_store` the payload
    /// goes to an external cluster and the row holds only the pointer.
    pub fn store_blob(&self, text: &str) -> StoreResult<BlobAddress> {
        let legacy = if self.config.use_external_store {
            self.config.external_legacy_encoding()
        } else {
            self.config.legacy_encoding.as_deref()
        };
        let (mut data, mut flags) =
            strata_codec::compress(text, self.config.compress_blobs, legacy)?;

        if self.config.use_external_store {
            let url = self.external.insert(&data)?;
            data = url.into_bytes();
            flags.insert(BlobFlag::External);
        }

        let text_id = self.rows.insert_row(&data, flags)?;
        if text_id == 0 {
            return Err(RowError::InvalidTextId(text_id).into());
        }
        let address = BlobAddress::from_text_id(text_id);
        debug!(address = %address, flags = %flags, "stored blob");
        Ok(address)
    }

    /// Load the text stored at `address`.
    ///
    /// Fails with [`StoreError::BadBlob`] if the address is known bad or
    /// structurally invalid, and with [`StoreError::BlobAccess`] if it is
    /// valid but cannot be resolved.
    pub fn get_blob(&self, address: &str) -> StoreResult<String> {
        let key = self.cache_key(address);
        if let Some(text) = self.cache.get(&key) {
            debug!(address, "blob cache hit");
            return Ok(text);
        }

        let text = self.fetch_one(address)?;
        self.cache.set(&key, &text, self.config.cache_ttl());
        Ok(text)
    }

    /// Load many blobs at once.
    ///
    /// Each address is resolved independently: failures become `None`
    /// values plus a warning, never an error for the whole batch. Cache hits
    /// are served first; remaining `tt:` addresses are loaded with a single
    /// row store query.
    pub fn get_blob_batch<S: AsRef<str>>(&self, addresses: &[S]) -> BatchResult {
        let mut seen = HashSet::new();
        let requested: Vec<&str> = addresses
            .iter()
            .map(AsRef::as_ref)
            .filter(|address| seen.insert(*address))
            .collect();
        if requested.is_empty() {
            return BatchResult::default();
        }

        let keys: Vec<String> = requested.iter().map(|a| self.cache_key(a)).collect();
        let mut cached = self.cache.get_many(&keys);

        let mut values = HashMap::with_capacity(requested.len());
        let mut misses = Vec::new();
        for (address, key) in requested.iter().zip(&keys) {
            match cached.remove(key) {
                Some(text) => {
                    values.insert(address.to_string(), Some(text));
                }
                None => misses.push(*address),
            }
        }
        debug!(
            requested = requested.len(),
            misses = misses.len(),
            "blob batch cache lookup"
        );

        let ttl = self.config.cache_ttl();
        let mut failures: HashMap<&str, StoreError> = HashMap::new();
        for (address, outcome) in self.fetch_many(&misses) {
            match outcome {
                Ok(text) => {
                    self.cache.set(&self.cache_key(address), &text, ttl);
                    values.insert(address.to_string(), Some(text));
                }
                Err(e) => {
                    values.insert(address.to_string(), None);
                    failures.insert(address, e);
                }
            }
        }

        let errors = requested
            .iter()
            .filter_map(|address| failures.remove(address).map(|e| (*address, e)))
            .map(|(address, e)| {
                warn!(address, error = %e, "blob batch entry failed");
                StatusMessage::internal_warning(e)
            })
            .collect();

        BatchResult::new(values, errors)
    }

    /// Turn a stored payload into text.
    ///
    /// Returns `Ok(None)` for bad data: corrupt compression, a misflagged
    /// envelope, an `error` flag or an unusable external pointer. With the
    /// `external` flag the payload is a pointer: it is fetched and the same
    /// flags are applied to the fetched bytes. If `cache_key` is given, the
    /// text of an external blob is cached under that address.
    pub fn expand_blob(
        &self,
        raw: &[u8],
        flags: BlobFlags,
        cache_key: Option<&str>,
    ) -> StoreResult<Option<String>> {
        let address = match cache_key {
            Some(address) if !raw.is_empty() && flags.contains(BlobFlag::External) => address,
            _ => return self.expand_payload(raw, flags),
        };

        let key = self.cache_key(address);
        if let Some(text) = self.cache.get(&key) {
            debug!(address, "external blob cache hit");
            return Ok(Some(text));
        }
        let text = self.expand_payload(raw, flags)?;
        if let Some(text) = &text {
            self.cache.set(&key, text, self.config.cache_ttl());
        }
        Ok(text)
    }

    /// [`expand_blob`](Self::expand_blob) without touching the cache.
    fn expand_payload(&self, raw: &[u8], flags: BlobFlags) -> StoreResult<Option<String>> {
        if raw.is_empty() {
            return Ok(Some(String::new()));
        }
        if !flags.contains(BlobFlag::External) {
            return self.decode(raw, flags, self.config.legacy_encoding.as_deref());
        }

        let Ok(url) = std::str::from_utf8(raw) else {
            warn!(flags = %flags, "external pointer is not valid UTF-8");
            return Ok(None);
        };
        self.expand_external(url, flags)
    }

    fn expand_external(&self, url: &str, flags: BlobFlags) -> StoreResult<Option<String>> {
        match self.external.fetch_from_url(url) {
            Ok(Some(data)) => self.decode(&data, flags, self.config.external_legacy_encoding()),
            Ok(None) => Err(AccessFailure::NotFound {
                address: url.to_string(),
            }
            .into()),
            Err(e) if e.is_data_error() => {
                warn!(url, error = %e, "unusable external pointer");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn decode(
        &self,
        raw: &[u8],
        flags: BlobFlags,
        legacy_encoding: Option<&str>,
    ) -> StoreResult<Option<String>> {
        match strata_codec::expand(raw, flags, legacy_encoding) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_data_error() => {
                warn!(flags = %flags, error = %e, "blob payload could not be expanded");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn source(&self, address: &str) -> StoreResult<Source> {
        let bad_blob = |reason: String| StoreError::BadBlob {
            address: address.to_string(),
            reason,
        };

        let parsed = BlobAddress::parse(address).map_err(|e| bad_blob(e.to_string()))?;
        match parsed.schema() {
            ROW_SCHEMA => parsed
                .row_id()
                .map(Source::Row)
                .map_err(|e| bad_blob(e.to_string())),
            EXTERNAL_SCHEMA => {
                let mut flags = BlobFlags::empty().with(BlobFlag::External);
                if let Some(extra) = parsed.parameter("flags") {
                    flags = flags.union(BlobFlags::parse(extra));
                }
                Ok(Source::External {
                    pointer: parsed.identifier().to_string(),
                    flags,
                })
            }
            BAD_SCHEMA => Err(bad_blob(
                parsed
                    .parameter("error")
                    .unwrap_or("address marked as bad")
                    .to_string(),
            )),
            schema => Err(AccessFailure::UnknownSchema {
                address: address.to_string(),
                schema: schema.to_string(),
            }
            .into()),
        }
    }

    fn fetch_one(&self, address: &str) -> StoreResult<String> {
        match self.source(address)? {
            Source::Row(text_id) => {
                let row = self
                    .rows
                    .fetch_row(text_id)
                    .map_err(|e| unavailable(address, e.into()))?
                    .ok_or_else(|| AccessFailure::NotFound {
                        address: address.to_string(),
                    })?;
                self.load(address, &row.raw, row.flags)
            }
            Source::External { pointer, flags } => self.load(address, pointer.as_bytes(), flags),
        }
    }

    /// Resolve uncached addresses, returning outcomes in input order.
    fn fetch_many<'a>(&self, addresses: &[&'a str]) -> Vec<(&'a str, StoreResult<String>)> {
        let mut outcomes: Vec<Option<StoreResult<String>>> = Vec::with_capacity(addresses.len());
        let mut pending_rows: Vec<(usize, u64)> = Vec::new();

        for (i, address) in addresses.iter().enumerate() {
            match self.source(address) {
                Ok(Source::Row(text_id)) => {
                    pending_rows.push((i, text_id));
                    outcomes.push(None);
                }
                Ok(Source::External { pointer, flags }) => {
                    outcomes.push(Some(self.load(address, pointer.as_bytes(), flags)));
                }
                Err(e) => outcomes.push(Some(Err(e))),
            }
        }

        if !pending_rows.is_empty() {
            let mut ids: Vec<u64> = pending_rows.iter().map(|(_, id)| *id).collect();
            ids.sort_unstable();
            ids.dedup();

            match self.rows.fetch_rows(&ids) {
                Ok(rows) => {
                    for (i, text_id) in pending_rows {
                        let address = addresses[i];
                        outcomes[i] = Some(match rows.get(&text_id) {
                            Some(row) => self.load(address, &row.raw, row.flags),
                            None => Err(AccessFailure::NotFound {
                                address: address.to_string(),
                            }
                            .into()),
                        });
                    }
                }
                Err(e) => {
                    warn!(rows = ids.len(), error = %e, "bulk row fetch failed");
                    let reason = e.to_string();
                    for (i, _) in pending_rows {
                        outcomes[i] = Some(Err(AccessFailure::Unavailable {
                            address: addresses[i].to_string(),
                            reason: reason.clone(),
                        }
                        .into()));
                    }
                }
            }
        }

        addresses
            .iter()
            .zip(outcomes)
            .map(|(address, outcome)| {
                let outcome = outcome.unwrap_or_else(|| {
                    Err(AccessFailure::NotFound {
                        address: address.to_string(),
                    }
                    .into())
                });
                (*address, outcome)
            })
            .collect()
    }

    fn load(&self, address: &str, raw: &[u8], flags: BlobFlags) -> StoreResult<String> {
        match self.expand_payload(raw, flags) {
            Ok(Some(text)) => Ok(text),
            Ok(None) => Err(AccessFailure::BadData {
                address: address.to_string(),
            }
            .into()),
            Err(e) => Err(unavailable(address, e)),
        }
    }
}

/// Report a lower-level failure against the address the caller asked for.
fn unavailable(address: &str, err: StoreError) -> StoreError {
    match err {
        StoreError::BlobAccess(_) | StoreError::Row(_) | StoreError::External(_) => {
            AccessFailure::Unavailable {
                address: address.to_string(),
                reason: err.to_string(),
            }
            .into()
        }
        other => other,
    }
}

impl std::fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStore")
            .field("domain_id", &self.rows.domain_id())
            .field("external", &self.external)
            .field("config", &self.config)
            .finish()
    }
}
