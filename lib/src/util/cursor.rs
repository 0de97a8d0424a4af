use std::mem::size_of;

use zerocopy::{AsBytes, ByteOrder, FromBytes, LittleEndian};

use crate::error::{GbxError, Result};

/// Forward-only little-endian reader over a byte slice.
///
/// Readers are cheap to create, so callers scope one to exactly the bytes they
/// intend to decode (e.g. a single chunk payload).
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self { Self { data, pos: 0 } }

    #[inline]
    pub fn position(&self) -> usize { self.pos }

    #[inline]
    pub fn remaining(&self) -> usize { self.data.len() - self.pos }

    #[inline]
    pub fn is_empty(&self) -> bool { self.remaining() == 0 }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(GbxError::ShortRead { offset: self.pos, wanted: len, available });
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Consumes everything left in the reader.
    pub fn rest(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }

    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> { Ok(self.read_bytes(1)?[0]) }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> { Ok(LittleEndian::read_u16(self.read_bytes(2)?)) }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> { Ok(LittleEndian::read_u32(self.read_bytes(4)?)) }

    /// Reads a u32 length prefix followed by that many bytes of UTF-8.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let offset = self.pos;
        let bytes = self.read_bytes(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(source) => Err(GbxError::InvalidEncoding { offset, source }),
        }
    }

    /// Borrows a fixed-layout struct directly out of the underlying data.
    pub fn read_ref<T>(&mut self) -> Result<&'a T>
    where T: FromBytes + Sized {
        let offset = self.pos;
        let bytes = self.read_bytes(size_of::<T>())?;
        T::ref_from(bytes).ok_or(GbxError::ShortRead {
            offset,
            wanted: size_of::<T>(),
            available: bytes.len(),
        })
    }
}

/// Append-only little-endian writer.
#[derive(Clone, Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    #[inline]
    pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self { Self { buf: Vec::with_capacity(capacity) } }

    #[inline]
    pub fn position(&self) -> usize { self.buf.len() }

    #[inline]
    pub fn write_bytes(&mut self, data: &[u8]) { self.buf.extend_from_slice(data); }

    #[inline]
    pub fn write_u8(&mut self, value: u8) { self.buf.push(value); }

    pub fn write_u16(&mut self, value: u16) {
        let mut out = [0u8; 2];
        LittleEndian::write_u16(&mut out, value);
        self.buf.extend_from_slice(&out);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut out = [0u8; 4];
        LittleEndian::write_u32(&mut out, value);
        self.buf.extend_from_slice(&out);
    }

    /// Writes a u32 length prefix followed by the string bytes.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_u32(encode_len("string length", value.len())?);
        self.write_bytes(value.as_bytes());
        Ok(())
    }

    #[inline]
    pub fn write_ref<T: AsBytes + ?Sized>(&mut self, value: &T) {
        self.buf.extend_from_slice(value.as_bytes());
    }

    #[inline]
    pub fn into_inner(self) -> Vec<u8> { self.buf }
}

/// Converts an in-memory length into its u32 wire representation.
#[inline]
pub fn encode_len(field: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| GbxError::ValueTooLarge { field, value: len })
}
