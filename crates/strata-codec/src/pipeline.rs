//! Compress text into stored bytes and expand stored bytes back into text.

use std::borrow::Cow;

use strata_types::{BlobFlag, BlobFlags};
use tracing::debug;

use crate::deflate::{deflate, inflate};
use crate::envelope::Envelope;
use crate::error::{CodecError, CodecResult};
use crate::legacy::LegacyEncoding;

/// Prepare `text` for storage.
///
/// Without a legacy encoding the text is stored as UTF-8 and flagged `utf-8`.
/// With one, the text is stored in that encoding with no `utf-8` flag, unless
/// some character cannot be represented there, in which case it falls back to
/// flagged UTF-8. With `gzip` the result is raw deflated and flagged `gzip`.
pub fn compress(
    text: &str,
    gzip: bool,
    legacy_encoding: Option<&str>,
) -> CodecResult<(Vec<u8>, BlobFlags)> {
    let mut flags = BlobFlags::empty();

    let encoded = match legacy_encoding {
        Some(label) => {
            let encoded = LegacyEncoding::for_label(label)?.encode(text);
            if encoded.is_none() {
                debug!(encoding = label, "text not representable, storing as UTF-8");
            }
            encoded
        }
        None => None,
    };
    let mut data = match encoded {
        Some(bytes) => bytes,
        None => {
            flags.insert(BlobFlag::Utf8);
            text.as_bytes().to_vec()
        }
    };

    if gzip {
        data = deflate(&data)?;
        flags.insert(BlobFlag::Gzip);
    }

    Ok((data, flags))
}

/// Recover text from stored bytes.
///
/// Empty input yields empty text before any flag is looked at. Otherwise
/// `error` fails immediately, then `gzip`, `object` and legacy decoding are
/// applied in that order. The `external` flag is ignored: callers resolve
/// pointers before handing the bytes over.
pub fn expand(raw: &[u8], flags: BlobFlags, legacy_encoding: Option<&str>) -> CodecResult<String> {
    if raw.is_empty() {
        return Ok(String::new());
    }
    if flags.contains(BlobFlag::Error) {
        return Err(CodecError::FlaggedCorrupt);
    }

    let mut data = Cow::Borrowed(raw);

    if flags.contains(BlobFlag::Gzip) {
        data = Cow::Owned(inflate(&data)?);
    }

    if flags.contains(BlobFlag::Object) {
        let envelope = Envelope::from_bytes(&data)?;
        data = Cow::Owned(envelope.text()?.to_vec());
    }

    decode_text(data, flags, legacy_encoding)
}

fn decode_text(
    data: Cow<'_, [u8]>,
    flags: BlobFlags,
    legacy_encoding: Option<&str>,
) -> CodecResult<String> {
    match legacy_encoding {
        Some(label) if !flags.contains(BlobFlag::Utf8) => {
            Ok(LegacyEncoding::for_label(label)?.decode(&data))
        }
        _ => String::from_utf8(data.into_owned()).map_err(|_| CodecError::InvalidUtf8),
    }
}
