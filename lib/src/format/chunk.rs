use std::fmt::{Debug, Formatter};

use zerocopy::{AsBytes, FromBytes, FromZeroes, LittleEndian, U32};

use crate::{
    error::{GbxError, Result},
    util::cursor::{encode_len, Reader, Writer},
};

/// Bit 31 of a chunk size field.
pub const HEAVY_FLAG: u32 = 0x8000_0000;
/// Size of an encoded [`ChunkDescriptor`].
pub const CHUNK_DESCRIPTOR_SIZE: usize = 8;

/// Chunk ID + packed size field, as stored in the header chunk table and in front of
/// each framed body chunk.
#[derive(Clone, Copy, Default, PartialEq, Eq, FromBytes, FromZeroes, AsBytes)]
#[repr(C, packed)]
pub struct ChunkDescriptor {
    pub id: U32<LittleEndian>,
    pub size: U32<LittleEndian>,
}

impl ChunkDescriptor {
    pub fn new(id: u32, len: u32, heavy: bool) -> Self {
        let size = if heavy { len | HEAVY_FLAG } else { len };
        Self { id: U32::new(id), size: U32::new(size) }
    }

    #[inline]
    pub fn read(reader: &mut Reader) -> Result<Self> { reader.read_ref::<Self>().copied() }

    #[inline]
    pub fn write(&self, writer: &mut Writer) { writer.write_ref(self); }

    #[inline]
    pub fn id(&self) -> u32 { self.id.get() }

    /// Raw size field, including the heavy flag.
    #[inline]
    pub fn size_field(&self) -> u32 { self.size.get() }

    /// Payload length in bytes.
    #[inline]
    pub fn len(&self) -> u32 { self.size.get() & !HEAVY_FLAG }

    #[inline]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    #[inline]
    pub fn is_heavy(&self) -> bool { self.size.get() & HEAVY_FLAG != 0 }
}

impl Debug for ChunkDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChunkDescriptor {{ id: {:#010X}, len: {}", self.id(), self.len())?;
        if self.is_heavy() {
            f.write_str(", heavy")?;
        }
        f.write_str(" }")
    }
}

/// A tagged block of opaque bytes.
///
/// The size field is always derived from `data`, so the encoded length can never
/// disagree with the payload.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Chunk {
    pub id: u32,
    pub heavy: bool,
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn new(id: u32, data: Vec<u8>) -> Self { Self { id, heavy: false, data } }

    /// Reads a descriptor followed by its payload.
    pub fn read(reader: &mut Reader) -> Result<Self> {
        let desc = ChunkDescriptor::read(reader)?;
        Self::read_payload(&desc, reader)
    }

    /// Reads the payload for a descriptor that was read separately (header chunk table).
    pub fn read_payload(desc: &ChunkDescriptor, reader: &mut Reader) -> Result<Self> {
        let data = reader.read_bytes(desc.len() as usize)?;
        Ok(Self { id: desc.id(), heavy: desc.is_heavy(), data: data.to_vec() })
    }

    pub fn descriptor(&self) -> Result<ChunkDescriptor> {
        let len = encode_len("chunk payload", self.data.len())?;
        if len & HEAVY_FLAG != 0 {
            return Err(GbxError::ValueTooLarge { field: "chunk payload", value: self.data.len() });
        }
        Ok(ChunkDescriptor::new(self.id, len, self.heavy))
    }

    pub fn write(&self, writer: &mut Writer) -> Result<()> {
        self.descriptor()?.write(writer);
        writer.write_bytes(&self.data);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize { self.data.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Reader scoped to this chunk's payload.
    #[inline]
    pub fn reader(&self) -> Reader<'_> { Reader::new(&self.data) }
}

impl Debug for Chunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Chunk {{ id: {:#010X}, len: {}", self.id, self.data.len())?;
        if self.heavy {
            f.write_str(", heavy")?;
        }
        f.write_str(" }")
    }
}

/// Splits a buffer into consecutive chunks until fewer than
/// [`CHUNK_DESCRIPTOR_SIZE`] bytes remain. Trailing bytes below that are ignored.
pub fn read_chunks(data: &[u8]) -> Result<Vec<Chunk>> {
    let mut reader = Reader::new(data);
    let mut chunks = Vec::new();
    while reader.remaining() >= CHUNK_DESCRIPTOR_SIZE {
        let chunk = Chunk::read(&mut reader)?;
        log::debug!("- {:?}", chunk);
        chunks.push(chunk);
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(id: u32, size: u32, payload: &[u8]) -> Vec<u8> {
        let mut writer = Writer::new();
        ChunkDescriptor { id: U32::new(id), size: U32::new(size) }.write(&mut writer);
        writer.write_bytes(payload);
        writer.into_inner()
    }

    #[test]
    fn heavy_bit_is_split_from_length() {
        for size in [0u32, 3, 0x7FFF_FFFF, HEAVY_FLAG, HEAVY_FLAG | 3] {
            let desc = ChunkDescriptor { id: U32::new(1), size: U32::new(size) };
            assert_eq!(desc.size_field(), size);
            assert_eq!(desc.is_heavy(), size & 0x8000_0000 != 0);
            assert_eq!(desc.len(), size & 0x7FFF_FFFF);
        }
    }

    #[test]
    fn chunk_round_trip_keeps_heavy_flag() {
        let data = encode(0x0304_3008, HEAVY_FLAG | 3, &[1, 2, 3]);
        let mut reader = Reader::new(&data);
        let chunk = Chunk::read(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(chunk.id, 0x0304_3008);
        assert!(chunk.heavy);
        assert_eq!(chunk.data, [1, 2, 3]);
        assert_eq!(chunk.descriptor().unwrap().size_field(), HEAVY_FLAG | 3);

        let mut writer = Writer::new();
        chunk.write(&mut writer).unwrap();
        assert_eq!(writer.into_inner(), data);
    }

    #[test]
    fn payload_overrun_is_short_read() {
        let data = encode(7, 16, &[0; 4]);
        assert!(matches!(
            Chunk::read(&mut Reader::new(&data)),
            Err(GbxError::ShortRead { offset: 8, wanted: 16, available: 4 })
        ));
    }

    #[test]
    fn framing_ignores_trailing_padding() {
        let mut data = encode(1, 2, &[0xAA, 0xBB]);
        data.extend(encode(2, HEAVY_FLAG, &[]));
        data.extend([0u8; 7]);
        let chunks = read_chunks(&data).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].data, [0xAA, 0xBB]);
        assert_eq!(chunks[1].id, 2);
        assert!(chunks[1].heavy && chunks[1].is_empty());
    }
}
