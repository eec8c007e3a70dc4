//! Storage flags kept alongside raw blob bytes.
//!
//! Flags are stored as a comma-joined list of lowercase tokens. Reading is
//! order-insensitive and ignores tokens it does not know; writing always emits
//! the same canonical order.

use std::fmt;

/// A single storage flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlobFlag {
    /// Payload is UTF-8; without it a configured legacy encoding applies.
    Utf8,
    /// Payload is raw-deflate compressed.
    Gzip,
    /// Payload is a serialized envelope.
    Object,
    /// Payload is a pointer into an external store.
    External,
    /// Payload is known to be corrupt.
    Error,
}

impl BlobFlag {
    /// All flags, in canonical write order.
    pub const ALL: [BlobFlag; 5] = [
        BlobFlag::Utf8,
        BlobFlag::Gzip,
        BlobFlag::Object,
        BlobFlag::External,
        BlobFlag::Error,
    ];

    /// The wire token for this flag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Gzip => "gzip",
            Self::Object => "object",
            Self::External => "external",
            Self::Error => "error",
        }
    }

    /// Look up a flag by wire token (case-insensitive, surrounding whitespace ignored).
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|flag| flag.as_str().eq_ignore_ascii_case(token))
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for BlobFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`BlobFlag`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BlobFlags(u8);

impl BlobFlags {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Parse a comma-joined flag list such as `"gzip,utf-8"`.
    ///
    /// ```
    /// use strata_types::{BlobFlag, BlobFlags};
    ///
    /// let flags = BlobFlags::parse("gzip, UTF-8,,bogus");
    /// assert!(flags.contains(BlobFlag::Gzip));
    /// assert!(flags.contains(BlobFlag::Utf8));
    /// assert_eq!(flags.to_string(), "utf-8,gzip");
    /// ```
    pub fn parse(list: &str) -> Self {
        list.split(',').collect()
    }

    pub fn contains(&self, flag: BlobFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn insert(&mut self, flag: BlobFlag) {
        self.0 |= flag.bit();
    }

    pub fn remove(&mut self, flag: BlobFlag) {
        self.0 &= !flag.bit();
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, flag: BlobFlag) -> Self {
        self.insert(flag);
        self
    }

    /// Union of two flag sets.
    pub fn union(self, other: BlobFlags) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Flags present, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = BlobFlag> + '_ {
        let flags = *self;
        BlobFlag::ALL.into_iter().filter(move |flag| flags.contains(*flag))
    }
}

impl<'a> FromIterator<&'a str> for BlobFlags {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter()
            .filter_map(BlobFlag::from_token)
            .collect()
    }
}

impl FromIterator<BlobFlag> for BlobFlags {
    fn from_iter<I: IntoIterator<Item = BlobFlag>>(iter: I) -> Self {
        let mut flags = Self::empty();
        for flag in iter {
            flags.insert(flag);
        }
        flags
    }
}

impl From<&str> for BlobFlags {
    fn from(list: &str) -> Self {
        Self::parse(list)
    }
}

impl fmt::Display for BlobFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, flag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(flag.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Debug for BlobFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobFlags({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_has_no_flags() {
        assert!(BlobFlags::parse("").is_empty());
        assert_eq!(BlobFlags::empty().to_string(), "");
    }

    #[test]
    fn parse_is_order_insensitive() {
        assert_eq!(BlobFlags::parse("gzip,object"), BlobFlags::parse("object,gzip"));
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let flags = BlobFlags::parse("gzip,frobnicate");
        assert_eq!(flags, BlobFlags::empty().with(BlobFlag::Gzip));
    }

    #[test]
    fn canonical_write_order() {
        let flags: BlobFlags = ["external", "gzip", "utf-8"].into_iter().collect();
        assert_eq!(flags.to_string(), "utf-8,gzip,external");
    }

    #[test]
    fn insert_and_remove() {
        let mut flags = BlobFlags::empty();
        flags.insert(BlobFlag::Object);
        assert!(flags.contains(BlobFlag::Object));
        flags.remove(BlobFlag::Object);
        assert!(!flags.contains(BlobFlag::Object));
    }

    #[test]
    fn union_merges() {
        let a = BlobFlags::parse("gzip");
        let b = BlobFlags::parse("external");
        assert_eq!(a.union(b).to_string(), "gzip,external");
    }

    #[test]
    fn display_parse_roundtrip() {
        for flag in BlobFlag::ALL {
            let flags = BlobFlags::empty().with(flag);
            assert_eq!(BlobFlags::parse(&flags.to_string()), flags);
        }
    }
}
