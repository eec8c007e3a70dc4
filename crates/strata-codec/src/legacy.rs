//! Legacy character encodings for rows written before UTF-8 was enforced.

use std::fmt;

use encoding_rs::Encoding;

use crate::error::{CodecError, CodecResult};

/// A resolved legacy encoding such as `windows-1252`.
///
/// Labels follow the WHATWG Encoding Standard, so `iso-8859-1` and `latin1`
/// resolve to `windows-1252`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LegacyEncoding(&'static Encoding);

impl LegacyEncoding {
    /// Resolve an encoding label.
    pub fn for_label(label: &str) -> CodecResult<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(Self)
            .ok_or_else(|| CodecError::UnknownEncoding(label.to_string()))
    }

    /// Canonical name of the resolved encoding.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode legacy bytes into text. Malformed sequences become U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _had_errors) = self.0.decode_without_bom_handling(bytes);
        text.into_owned()
    }

    /// Encode text into this encoding.
    ///
    /// Returns `None` unless the bytes decode back to exactly `text`. This
    /// covers unrepresentable characters as well as one-way mappings such as
    /// `¥` becoming `\` in Shift_JIS.
    pub fn encode(&self, text: &str) -> Option<Vec<u8>> {
        let (bytes, used, had_errors) = self.0.encode(text);
        if had_errors || used != self.0 {
            return None;
        }
        if self.decode(&bytes) != text {
            return None;
        }
        Some(bytes.into_owned())
    }
}

impl fmt::Debug for LegacyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LegacyEncoding({})", self.name())
    }
}
