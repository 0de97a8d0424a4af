use std::io::Cursor;

use crate::error::{GbxError, Result};

/// Byte transformation applied to compressed GBX bodies.
pub trait BodyCodec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompresses `data`, which is expected to expand to exactly `expected_len` bytes.
    fn decompress(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>>;
}

/// MiniLZO-compatible body compression.
#[derive(Copy, Clone, Debug, Default)]
pub struct Lzo;

impl BodyCodec for Lzo {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        lzokay_native::compress(data)
            .map_err(|e| GbxError::CompressionFailed { reason: e.to_string() })
    }

    fn decompress(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        lzokay_native::decompress(&mut Cursor::new(data), Some(expected_len))
            .map_err(|e| GbxError::DecompressionFailed {
                expected: expected_len,
                actual: None,
                reason: e.to_string(),
            })
    }
}

/// Runs `codec` and verifies the output length.
pub fn decompress_buffer<C>(codec: &C, data: &[u8], expected_len: usize) -> Result<Vec<u8>>
where C: BodyCodec + ?Sized {
    let out = codec.decompress(data, expected_len)?;
    if out.len() != expected_len {
        return Err(GbxError::DecompressionFailed {
            expected: expected_len,
            actual: Some(out.len()),
            reason: format!("codec produced {} bytes", out.len()),
        });
    }
    Ok(out)
}
