//! Raw deflate (RFC 1951, no zlib or gzip header) for `gzip`-flagged blobs.

use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::error::{CodecError, CodecResult};

/// Upper bound on inflated output.
///
/// Stops a small corrupt or hostile payload from expanding without limit.
pub const MAX_INFLATED_SIZE: usize = 256 * 1024 * 1024;

/// Compress `data` with raw deflate at the default level.
pub fn deflate(data: &[u8]) -> CodecResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(
        Vec::with_capacity(data.len() / 2 + 16),
        Compression::default(),
    );
    encoder
        .write_all(data)
        .map_err(|e| CodecError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CodecError::Compression(e.to_string()))
}

/// Inflate a raw deflate stream.
///
/// The stream must be complete: truncated input is an error rather than a
/// silently shortened result.
pub fn inflate(data: &[u8]) -> CodecResult<Vec<u8>> {
    let mut decoder = Decompress::new(false);
    let mut out = Vec::with_capacity(data.len().saturating_mul(4).clamp(64, MAX_INFLATED_SIZE));

    loop {
        let before_in = decoder.total_in();
        let before_out = decoder.total_out();
        let input = &data[before_in as usize..];

        let status = decoder
            .decompress_vec(input, &mut out, FlushDecompress::Finish)
            .map_err(|e| CodecError::Decompression(e.to_string()))?;

        if matches!(status, Status::StreamEnd) {
            return Ok(out);
        }

        if out.len() == out.capacity() {
            if out.len() >= MAX_INFLATED_SIZE {
                return Err(CodecError::TooLarge {
                    max: MAX_INFLATED_SIZE,
                });
            }
            let extra = out.capacity().min(MAX_INFLATED_SIZE - out.len());
            out.reserve(extra);
            continue;
        }

        if decoder.total_in() == before_in && decoder.total_out() == before_out {
            return Err(CodecError::Decompression(
                "truncated deflate stream".into(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Raw deflate of "AAAABBAAA" as produced by zlib at the default level.
    const AAAABBAAA: &[u8] = b"sttttr\x02\x12\x00";

    #[test]
    fn inflate_known_vector() {
        assert_eq!(inflate(AAAABBAAA).unwrap(), b"AAAABBAAA");
    }

    #[test]
    fn roundtrip() {
        let text = "Wiki est l'\u{e9}cole superieur !";
        let packed = deflate(text.as_bytes()).unwrap();
        assert_eq!(inflate(&packed).unwrap(), text.as_bytes());
    }

    #[test]
    fn roundtrip_empty() {
        let packed = deflate(b"").unwrap();
        assert!(!packed.is_empty());
        assert!(inflate(&packed).unwrap().is_empty());
    }

    #[test]
    fn large_payload_grows_buffer() {
        let data = vec![0xABu8; 1_000_000];
        let packed = deflate(&data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(inflate(&packed).unwrap(), data);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(inflate(b"DEAD BEEF").is_err());
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let packed = deflate(b"some text that compresses, some text that compresses").unwrap();
        let err = inflate(&packed[..packed.len() / 2]).unwrap_err();
        assert!(matches!(err, CodecError::Decompression(_)));
    }
}
