use serde::{Deserialize, Serialize};

/// Configuration for the external store gateway.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalStoreConfig {
    /// Protocols allowed for reads, matched case-insensitively.
    pub protocols: Vec<String>,
    /// Base URLs (`protocol://cluster`) that accept new blobs.
    pub write_stores: Vec<String>,
}

impl ExternalStoreConfig {
    pub fn new<P, W>(protocols: P, write_stores: W) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        W: IntoIterator,
        W::Item: Into<String>,
    {
        Self {
            protocols: protocols.into_iter().map(Into::into).collect(),
            write_stores: write_stores.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if reads through `protocol` are allowed.
    pub fn allows_protocol(&self, protocol: &str) -> bool {
        self.protocols
            .iter()
            .any(|p| p.eq_ignore_ascii_case(protocol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_nothing() {
        let config = ExternalStoreConfig::default();
        assert!(!config.allows_protocol("DB"));
        assert!(config.write_stores.is_empty());
    }

    #[test]
    fn protocol_match_ignores_case() {
        let config = ExternalStoreConfig::new(["ForTesting"], ["ForTesting://cluster1"]);
        assert!(config.allows_protocol("fortesting"));
        assert!(!config.allows_protocol("DB"));
    }
}
