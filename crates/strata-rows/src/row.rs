use strata_types::{BlobAddress, BlobFlags};

/// One row of the text table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRow {
    pub text_id: u64,
    /// Stored bytes, still compressed/encoded as described by `flags`.
    pub raw: Vec<u8>,
    pub flags: BlobFlags,
}

impl StoredRow {
    pub fn new(text_id: u64, raw: Vec<u8>, flags: BlobFlags) -> Self {
        Self { text_id, raw, flags }
    }

    /// The `tt:` address of this row.
    pub fn address(&self) -> BlobAddress {
        BlobAddress::from_text_id(self.text_id)
    }
}
