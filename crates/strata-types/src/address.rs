//! Blob address codec.
//!
//! Wire format: `schema:identifier[?k=v&k=v...]`. The schema is a short token
//! (`tt`, `es`, `bad`, or a URL scheme), the identifier is opaque and may
//! contain `/` or `:`, and parameters keep the order they were supplied in.
//!
//! `%`, whitespace and the separators of each part (`?` in the identifier,
//! `&`, `=` and `?` in parameters) are percent-encoded on format and decoded
//! on parse, so every formatted address parses back to itself.

use std::fmt::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AddressError, AddressResult};

/// Schema of addresses that point at a row in the primary text table.
pub const ROW_SCHEMA: &str = "tt";

/// Schema of addresses known to reference lost data.
pub const BAD_SCHEMA: &str = "bad";

/// Schema of addresses carrying an external store pointer directly.
pub const EXTERNAL_SCHEMA: &str = "es";

/// A decoded blob address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobAddress {
    schema: String,
    identifier: String,
    parameters: Vec<(String, String)>,
}

impl BlobAddress {
    /// Build an address from its parts. The schema is normalised to lowercase.
    ///
    /// Fails if the schema is empty or contains characters other than ASCII
    /// alphanumerics and `-+._`, or if the identifier is empty.
    pub fn new(schema: impl Into<String>, identifier: impl Into<String>) -> AddressResult<Self> {
        let schema = schema.into();
        let identifier = identifier.into();
        let malformed = |reason: &str| AddressError::Malformed {
            address: format!("{schema}:{identifier}"),
            reason: reason.to_string(),
        };

        if schema.is_empty() {
            return Err(malformed("empty schema"));
        }
        if !schema.chars().all(is_schema_char) {
            return Err(malformed("schema contains invalid characters"));
        }
        if identifier.is_empty() {
            return Err(malformed("empty identifier"));
        }

        Ok(Self {
            schema: schema.to_ascii_lowercase(),
            identifier,
            parameters: Vec::new(),
        })
    }

    /// Append a parameter, keeping insertion order.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((key.into(), value.into()));
        self
    }

    /// The address of row `text_id` in the primary text table.
    ///
    /// Text ids handed out by row stores start at 1.
    pub fn from_text_id(text_id: u64) -> Self {
        debug_assert!(text_id > 0, "text ids are positive");
        Self {
            schema: ROW_SCHEMA.to_string(),
            identifier: text_id.to_string(),
            parameters: Vec::new(),
        }
    }

    /// Parse an address string.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_types::BlobAddress;
    ///
    /// let addr = BlobAddress::parse("bad:foo?x=y").unwrap();
    /// assert_eq!(addr.schema(), "bad");
    /// assert_eq!(addr.identifier(), "foo");
    /// assert_eq!(addr.parameter("x"), Some("y"));
    /// assert!(BlobAddress::parse("no-separator").is_err());
    /// ```
    pub fn parse(address: &str) -> AddressResult<Self> {
        let malformed = |reason: &str| AddressError::Malformed {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let (schema, rest) = address
            .split_once(':')
            .ok_or_else(|| malformed("missing ':' separator"))?;

        if schema.is_empty() {
            return Err(malformed("empty schema"));
        }
        if !schema.chars().all(is_schema_char) {
            return Err(malformed("schema contains invalid characters"));
        }

        let (identifier, query) = match rest.split_once('?') {
            Some((identifier, query)) => (identifier, Some(query)),
            None => (rest, None),
        };

        if identifier.is_empty() {
            return Err(malformed("empty identifier"));
        }
        if address.chars().any(char::is_whitespace) {
            return Err(malformed("contains whitespace"));
        }

        let parameters = match query {
            Some(query) => parse_query(query).ok_or_else(|| malformed("invalid percent-encoding"))?,
            None => Vec::new(),
        };

        Ok(Self {
            schema: schema.to_ascii_lowercase(),
            identifier: decode_component(identifier)
                .ok_or_else(|| malformed("invalid percent-encoding"))?,
            parameters,
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// First value supplied for `key`, if any.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if this address points into the primary text table.
    pub fn is_row_address(&self) -> bool {
        self.schema == ROW_SCHEMA
    }

    /// The text id of a `tt:` address.
    ///
    /// Fails with [`AddressError::WrongSchema`] for any other schema and with
    /// [`AddressError::InvalidTextId`] unless the identifier is a positive
    /// decimal integer (`0`, negative numbers and non-digits are rejected).
    pub fn row_id(&self) -> AddressResult<u64> {
        if !self.is_row_address() {
            return Err(AddressError::WrongSchema {
                address: self.to_string(),
                expected: ROW_SCHEMA.to_string(),
                actual: self.schema.clone(),
            });
        }
        parse_text_id(&self.identifier).ok_or_else(|| AddressError::InvalidTextId {
            address: self.to_string(),
        })
    }
}

impl fmt::Display for BlobAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.schema)?;
        encode_component(f, &self.identifier, IDENTIFIER_RESERVED)?;
        for (i, (key, value)) in self.parameters.iter().enumerate() {
            f.write_char(if i == 0 { '?' } else { '&' })?;
            encode_component(f, key, PARAMETER_RESERVED)?;
            f.write_char('=')?;
            encode_component(f, value, PARAMETER_RESERVED)?;
        }
        Ok(())
    }
}

impl FromStr for BlobAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_schema_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.' | '_')
}

const IDENTIFIER_RESERVED: &[char] = &['?'];
const PARAMETER_RESERVED: &[char] = &['&', '=', '?'];

fn encode_component(out: &mut impl Write, raw: &str, reserved: &[char]) -> fmt::Result {
    for c in raw.chars() {
        if c == '%' || c.is_whitespace() || reserved.contains(&c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                write!(out, "%{byte:02X}")?;
            }
        } else {
            out.write_char(c)?;
        }
    }
    Ok(())
}

/// Decode `%XX` escapes. A `%` not followed by two hex digits is kept as is.
/// Returns `None` if the decoded bytes are not UTF-8.
fn decode_component(raw: &str) -> Option<String> {
    if !raw.contains('%') {
        return Some(raw.to_string());
    }

    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).ok()
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

fn parse_query(query: &str) -> Option<Vec<(String, String)>> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Some((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn parse_text_id(identifier: &str) -> Option<u64> {
    if identifier.is_empty() || !identifier.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    identifier.parse::<u64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_row_address() {
        let addr = BlobAddress::parse("tt:123").unwrap();
        assert_eq!(addr.schema(), "tt");
        assert_eq!(addr.identifier(), "123");
        assert!(addr.parameters().is_empty());
    }

    #[test]
    fn parse_with_parameters() {
        let addr = BlobAddress::parse("bad:foo?x=y").unwrap();
        assert_eq!(addr.schema(), "bad");
        assert_eq!(addr.identifier(), "foo");
        assert_eq!(addr.parameters(), &[("x".to_string(), "y".to_string())]);
    }

    #[test]
    fn parse_url_like_identifier() {
        let addr = BlobAddress::parse("http://test.com/foo/bar?a=b").unwrap();
        assert_eq!(addr.schema(), "http");
        assert_eq!(addr.identifier(), "//test.com/foo/bar");
        assert_eq!(addr.parameter("a"), Some("b"));
    }

    #[test]
    fn parse_external_pointer_identifier() {
        let addr = BlobAddress::parse("es:DB://cluster1/12345?flags=gzip").unwrap();
        assert_eq!(addr.schema(), "es");
        assert_eq!(addr.identifier(), "DB://cluster1/12345");
        assert_eq!(addr.parameter("flags"), Some("gzip"));
    }

    #[test]
    fn schema_is_lowercased() {
        let addr = BlobAddress::parse("TT:5").unwrap();
        assert_eq!(addr.schema(), "tt");
        assert_eq!(addr.row_id().unwrap(), 5);
    }

    #[test]
    fn reject_malformed() {
        for bad in ["", "xy", ":17", "tt:", "tt:?a=b", "t t:1", "tt:1 2", "a/b:1"] {
            let err = BlobAddress::parse(bad).unwrap_err();
            assert!(
                matches!(err, AddressError::Malformed { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn format_preserves_parameter_order() {
        let addr = BlobAddress::new("bad", "lost")
            .unwrap()
            .with_parameter("z", "1")
            .with_parameter("a", "2");
        assert_eq!(addr.to_string(), "bad:lost?z=1&a=2");
        assert_eq!(BlobAddress::parse(&addr.to_string()).unwrap(), addr);
    }

    #[test]
    fn separators_in_parameters_are_escaped() {
        let addr = BlobAddress::new("bad", "lost")
            .unwrap()
            .with_parameter("error", "a&b=c")
            .with_parameter("note", "50% off?");
        assert_eq!(
            addr.to_string(),
            "bad:lost?error=a%26b%3Dc&note=50%25%20off%3F"
        );
        let parsed = BlobAddress::parse(&addr.to_string()).unwrap();
        assert_eq!(parsed.parameter("error"), Some("a&b=c"));
        assert_eq!(parsed.parameter("note"), Some("50% off?"));
        assert_eq!(parsed, addr);
    }

    #[test]
    fn question_mark_in_identifier_is_escaped() {
        let addr = BlobAddress::new("http", "//host/a?b").unwrap();
        assert_eq!(addr.to_string(), "http://host/a%3Fb");
        assert_eq!(BlobAddress::parse(&addr.to_string()).unwrap(), addr);
    }

    #[test]
    fn stray_percent_is_kept_literally() {
        let addr = BlobAddress::parse("bad:50%?x=%zz").unwrap();
        assert_eq!(addr.identifier(), "50%");
        assert_eq!(addr.parameter("x"), Some("%zz"));
    }

    #[test]
    fn escapes_must_decode_to_utf8() {
        let err = BlobAddress::parse("bad:%FF").unwrap_err();
        assert!(matches!(err, AddressError::Malformed { .. }));
    }

    #[test]
    fn new_rejects_unformattable_parts() {
        assert!(BlobAddress::new("tt", "").is_err());
        assert!(BlobAddress::new("", "1").is_err());
        assert!(BlobAddress::new("a/b", "1").is_err());
        assert_eq!(BlobAddress::new("TT", "1").unwrap().schema(), "tt");
    }

    #[test]
    fn from_text_id_uses_row_schema() {
        assert_eq!(BlobAddress::from_text_id(17).to_string(), "tt:17");
    }

    #[test]
    fn row_id_of_valid_address() {
        assert_eq!(BlobAddress::parse("tt:17").unwrap().row_id().unwrap(), 17);
    }

    #[test]
    fn row_id_rejects_invalid_identifiers() {
        for bad in ["tt:0", "tt:-1", "tt:xy", "tt:+3", "tt:1.5", "tt:this_will_not_exist"] {
            let err = BlobAddress::parse(bad).unwrap().row_id().unwrap_err();
            assert!(
                matches!(err, AddressError::InvalidTextId { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn row_id_rejects_other_schemas() {
        let err = BlobAddress::parse("xy:17").unwrap().row_id().unwrap_err();
        assert!(matches!(err, AddressError::WrongSchema { .. }));
    }

    #[test]
    fn row_id_rejects_overflow() {
        let addr = BlobAddress::parse("tt:99999999999999999999999").unwrap();
        assert!(addr.row_id().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let addr = BlobAddress::parse("bad:lost?bug=T12345").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        let back: BlobAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    proptest! {
        #[test]
        fn text_id_roundtrip(id in 1u64..=u64::MAX) {
            let addr = BlobAddress::from_text_id(id);
            let parsed = BlobAddress::parse(&addr.to_string()).unwrap();
            prop_assert_eq!(parsed.row_id().unwrap(), id);
        }

        #[test]
        fn formatted_addresses_parse_back(
            schema in "[a-z][a-z0-9+.-]{0,6}",
            identifier in "[A-Za-z0-9/:?&=% \t._-]{1,24}|\\PC{1,12}",
            params in proptest::collection::vec(
                ("[a-z&=?% ]{0,5}|\\PC{0,5}", "[A-Za-z0-9&=?% ._-]{0,8}|\\PC{0,8}"),
                0..4,
            ),
        ) {
            let mut addr = BlobAddress::new(schema, identifier).unwrap();
            for (k, v) in params {
                addr = addr.with_parameter(k, v);
            }
            let parsed = BlobAddress::parse(&addr.to_string()).unwrap();
            prop_assert_eq!(parsed, addr);
        }
    }
}
