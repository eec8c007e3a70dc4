use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use strata_codec::Envelope;
use tracing::{debug, warn};

use crate::config::ExternalStoreConfig;
use crate::error::{ExternalError, ExternalResult};
use crate::pointer::ExternalPointer;
use crate::traits::ExternalBackend;

/// Gateway to the external clusters.
///
/// Routes pointers to the backend registered for their protocol. Reads are
/// only allowed for protocols enabled in [`ExternalStoreConfig::protocols`];
/// writes go to one of [`ExternalStoreConfig::write_stores`].
pub struct ExternalStoreAccess {
    backends: HashMap<String, Arc<dyn ExternalBackend>>,
    config: ExternalStoreConfig,
}

impl ExternalStoreAccess {
    pub fn new(config: ExternalStoreConfig) -> Self {
        Self {
            backends: HashMap::new(),
            config,
        }
    }

    /// A gateway with no backends. Every fetch fails.
    pub fn disabled() -> Self {
        Self::new(ExternalStoreConfig::default())
    }

    /// Register the backend serving `protocol`.
    pub fn with_backend(mut self, protocol: &str, backend: Arc<dyn ExternalBackend>) -> Self {
        self.backends.insert(protocol.to_ascii_lowercase(), backend);
        self
    }

    pub fn config(&self) -> &ExternalStoreConfig {
        &self.config
    }

    /// Returns `true` if at least one write store is configured.
    pub fn can_write(&self) -> bool {
        !self.config.write_stores.is_empty()
    }

    fn backend(&self, protocol: &str) -> ExternalResult<&Arc<dyn ExternalBackend>> {
        if !self.config.allows_protocol(protocol) {
            return Err(ExternalError::ProtocolDisabled(protocol.to_string()));
        }
        self.backends
            .get(&protocol.to_ascii_lowercase())
            .ok_or_else(|| ExternalError::UnknownProtocol(protocol.to_string()))
    }

    /// Fetch the bytes a pointer refers to.
    ///
    /// Returns `Ok(None)` if the cluster has no such blob. A pointer with an
    /// item segment addresses one text inside a stored envelope; only that
    /// text is returned.
    pub fn fetch_from_url(&self, url: &str) -> ExternalResult<Option<Vec<u8>>> {
        let pointer = ExternalPointer::parse(url)?;
        let backend = self.backend(pointer.protocol())?;

        let Some(data) = backend.fetch(pointer.cluster(), pointer.id())? else {
            debug!(url, "external blob not found");
            return Ok(None);
        };

        match pointer.item() {
            None => Ok(Some(data)),
            Some(item) => {
                let envelope = Envelope::from_bytes(&data)?;
                Ok(Some(envelope.item(item)?.to_vec()))
            }
        }
    }

    /// Store `data` in one of the write stores and return its pointer.
    ///
    /// Write stores are tried in random order; a failing store is skipped
    /// and the next one tried.
    pub fn insert(&self, data: &[u8]) -> ExternalResult<String> {
        if self.config.write_stores.is_empty() {
            return Err(ExternalError::NoWriteStores);
        }

        let mut stores: Vec<&String> = self.config.write_stores.iter().collect();
        stores.shuffle(&mut rand::thread_rng());

        let mut failures = Vec::new();
        for base in stores {
            match self.insert_into(base, data) {
                Ok(url) => {
                    debug!(url = %url, bytes = data.len(), "stored external blob");
                    return Ok(url);
                }
                Err(e) => {
                    warn!(store = %base, error = %e, "external write failed, trying next store");
                    failures.push(format!("{base}: {e}"));
                }
            }
        }
        Err(ExternalError::AllWritesFailed(failures.join("; ")))
    }

    fn insert_into(&self, base: &str, data: &[u8]) -> ExternalResult<String> {
        let (protocol, cluster) = ExternalPointer::parse_base(base)?;
        let backend = self
            .backends
            .get(&protocol.to_ascii_lowercase())
            .ok_or_else(|| ExternalError::UnknownProtocol(protocol.clone()))?;
        let id = backend.store(&cluster, data)?;
        Ok(ExternalPointer::new(protocol, cluster, id).to_string())
    }
}

impl std::fmt::Debug for ExternalStoreAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut protocols: Vec<&String> = self.backends.keys().collect();
        protocols.sort();
        f.debug_struct("ExternalStoreAccess")
            .field("backends", &protocols)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryExternalBackend;
    use strata_codec::ConcatenatedBlob;

    fn access(backend: InMemoryExternalBackend, write_stores: &[&str]) -> ExternalStoreAccess {
        ExternalStoreAccess::new(ExternalStoreConfig::new(
            ["ForTesting"],
            write_stores.iter().copied(),
        ))
        .with_backend("ForTesting", Arc::new(backend))
    }

    #[test]
    fn fetch_existing_blob() {
        let gw = access(
            InMemoryExternalBackend::new().with_blob("cluster1", 12345, "hello"),
            &[],
        );
        let data = gw.fetch_from_url("ForTesting://cluster1/12345").unwrap();
        assert_eq!(data.unwrap(), b"hello");
    }

    #[test]
    fn fetch_missing_blob() {
        let gw = access(InMemoryExternalBackend::new().with_cluster("cluster1"), &[]);
        assert!(gw.fetch_from_url("ForTesting://cluster1/1").unwrap().is_none());
    }

    #[test]
    fn fetch_malformed_pointer_is_data_error() {
        let gw = access(InMemoryExternalBackend::new(), &[]);
        for url in ["someNonUrlText", "someProtocol://"] {
            let err = gw.fetch_from_url(url).unwrap_err();
            assert!(err.is_data_error(), "{url:?} gave {err:?}");
        }
    }

    #[test]
    fn fetch_disabled_protocol() {
        let gw = access(InMemoryExternalBackend::new().with_cluster("c"), &[])
            .with_backend("DB", Arc::new(InMemoryExternalBackend::new()));
        let err = gw.fetch_from_url("DB://c/1").unwrap_err();
        assert!(matches!(err, ExternalError::ProtocolDisabled(_)));
        assert!(!err.is_data_error());
    }

    #[test]
    fn fetch_unregistered_protocol() {
        let gw = ExternalStoreAccess::new(ExternalStoreConfig::new(["DB"], Vec::<String>::new()));
        let err = gw.fetch_from_url("DB://c/1").unwrap_err();
        assert!(matches!(err, ExternalError::UnknownProtocol(_)));
    }

    #[test]
    fn fetch_envelope_item() {
        let mut blob = ConcatenatedBlob::new();
        let key = blob.add_item(b"first revision");
        blob.set_text(b"second revision");
        let bytes = Envelope::Concatenated(blob).to_bytes().unwrap();

        let gw = access(InMemoryExternalBackend::new().with_blob("c1", 7, bytes), &[]);
        let data = gw.fetch_from_url(&format!("ForTesting://c1/7/{key}")).unwrap();
        assert_eq!(data.unwrap(), b"first revision");

        let err = gw.fetch_from_url("ForTesting://c1/7/missing").unwrap_err();
        assert!(err.is_data_error());
    }

    #[test]
    fn insert_returns_fetchable_pointer() {
        let gw = access(
            InMemoryExternalBackend::new().with_cluster("cluster1"),
            &["ForTesting://cluster1"],
        );
        let url = gw.insert(b"big blob").unwrap();
        assert_eq!(url, "ForTesting://cluster1/1");
        assert_eq!(gw.fetch_from_url(&url).unwrap().unwrap(), b"big blob");
    }

    #[test]
    fn insert_fails_over_to_writable_store() {
        let backend = InMemoryExternalBackend::new()
            .with_cluster("ro")
            .with_cluster("rw");
        backend.set_read_only("ro");
        let gw = access(backend, &["ForTesting://ro", "ForTesting://rw"]);
        for _ in 0..5 {
            let url = gw.insert(b"x").unwrap();
            assert!(url.starts_with("ForTesting://rw/"), "{url}");
        }
    }

    #[test]
    fn insert_without_write_stores() {
        let gw = access(InMemoryExternalBackend::new(), &[]);
        assert!(!gw.can_write());
        assert!(matches!(gw.insert(b"x"), Err(ExternalError::NoWriteStores)));
    }

    #[test]
    fn insert_all_stores_failing() {
        let backend = InMemoryExternalBackend::new().with_cluster("ro");
        backend.set_read_only("ro");
        let gw = access(backend, &["ForTesting://ro"]);
        assert!(matches!(gw.insert(b"x"), Err(ExternalError::AllWritesFailed(_))));
    }
}
