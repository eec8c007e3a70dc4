use std::fmt;

use crate::error::{ExternalError, ExternalResult};

const PROTOCOL_SEPARATOR: &str = "://";

/// A parsed external pointer: `protocol://cluster/id[/item]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExternalPointer {
    protocol: String,
    cluster: String,
    id: String,
    item: Option<String>,
}

impl ExternalPointer {
    pub fn new(protocol: impl Into<String>, cluster: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            cluster: cluster.into(),
            id: id.into(),
            item: None,
        }
    }

    /// Address an item inside a concatenated envelope.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Parse a pointer.
    ///
    /// The path after `://` needs at least two non-empty `/`-separated
    /// segments; a third segment names an envelope item.
    ///
    /// ```
    /// use strata_external::ExternalPointer;
    ///
    /// let ptr = ExternalPointer::parse("DB://cluster1/12345").unwrap();
    /// assert_eq!(ptr.cluster(), "cluster1");
    /// assert_eq!(ptr.id(), "12345");
    /// assert!(ExternalPointer::parse("someProtocol://").is_err());
    /// ```
    pub fn parse(pointer: &str) -> ExternalResult<Self> {
        let (protocol, path) = split_protocol(pointer)?;
        let malformed = |reason: &str| ExternalError::MalformedPointer {
            pointer: pointer.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() < 2 {
            return Err(malformed("expected cluster and id"));
        }
        if segments.len() > 3 {
            return Err(malformed("too many path segments"));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(malformed("empty path segment"));
        }

        Ok(Self {
            protocol: protocol.to_string(),
            cluster: segments[0].to_string(),
            id: segments[1].to_string(),
            item: segments.get(2).map(|s| s.to_string()),
        })
    }

    /// Parse a write-store base URL of the form `protocol://cluster`.
    pub fn parse_base(base: &str) -> ExternalResult<(String, String)> {
        let (protocol, cluster) = split_protocol(base)?;
        if cluster.contains('/') {
            return Err(ExternalError::MalformedPointer {
                pointer: base.to_string(),
                reason: "write store must name a single cluster".into(),
            });
        }
        Ok((protocol.to_string(), cluster.to_string()))
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }
}

impl fmt::Display for ExternalPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.protocol, self.cluster, self.id)?;
        if let Some(item) = &self.item {
            write!(f, "/{item}")?;
        }
        Ok(())
    }
}

fn split_protocol(url: &str) -> ExternalResult<(&str, &str)> {
    let malformed = |reason: &str| ExternalError::MalformedPointer {
        pointer: url.to_string(),
        reason: reason.to_string(),
    };
    let (protocol, path) = url
        .split_once(PROTOCOL_SEPARATOR)
        .ok_or_else(|| malformed("missing protocol"))?;
    if protocol.is_empty() {
        return Err(malformed("empty protocol"));
    }
    if path.is_empty() {
        return Err(malformed("empty path"));
    }
    Ok((protocol, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cluster_and_id() {
        let ptr = ExternalPointer::parse("ForTesting://cluster1/12345").unwrap();
        assert_eq!(ptr.protocol(), "ForTesting");
        assert_eq!(ptr.cluster(), "cluster1");
        assert_eq!(ptr.id(), "12345");
        assert_eq!(ptr.item(), None);
    }

    #[test]
    fn parse_with_item() {
        let ptr = ExternalPointer::parse("DB://cluster2/7/abc123").unwrap();
        assert_eq!(ptr.item(), Some("abc123"));
        assert_eq!(ptr.to_string(), "DB://cluster2/7/abc123");
    }

    #[test]
    fn display_roundtrip() {
        let ptr = ExternalPointer::new("DB", "c1", "42").with_item("k");
        assert_eq!(ExternalPointer::parse(&ptr.to_string()).unwrap(), ptr);
    }

    #[test]
    fn reject_not_enough_parts() {
        for bad in [
            "someNonUrlText",
            "someProtocol://",
            "DB://cluster1",
            "DB://cluster1/",
            "://cluster1/1",
            "DB://a/b/c/d",
            "DB://a//b",
        ] {
            let err = ExternalPointer::parse(bad).unwrap_err();
            assert!(err.is_data_error(), "{bad:?} gave {err:?}");
        }
    }

    #[test]
    fn parse_base_url() {
        let (protocol, cluster) = ExternalPointer::parse_base("DB://cluster1").unwrap();
        assert_eq!(protocol, "DB");
        assert_eq!(cluster, "cluster1");
        assert!(ExternalPointer::parse_base("DB://cluster1/3").is_err());
        assert!(ExternalPointer::parse_base("cluster1").is_err());
    }
}
