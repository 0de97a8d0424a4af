use serde_derive::Serialize;

use crate::{
    error::{GbxError, Result},
    format::chunk::{Chunk, ChunkDescriptor, CHUNK_DESCRIPTOR_SIZE},
    util::cursor::{encode_len, Reader, Writer},
};

pub const GBX_MAGIC: [u8; 3] = *b"GBX";

/// First version carrying the format/compression flags and the class ID.
pub const VERSION_FLAGS: u16 = 3;
/// First version carrying the reserved byte after the flags.
pub const VERSION_RESERVED: u16 = 4;
/// First version carrying the user data (header chunk) section.
pub const VERSION_USER_DATA: u16 = 6;

/// Written in place of the reserved byte, whose meaning is not decoded.
const RESERVED_PLACEHOLDER: u8 = b'R';

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ByteFormat {
    Binary,
    Text,
}

impl ByteFormat {
    /// Only `B` and `T` are accepted. Any other byte could not be written back as read,
    /// so such files are refused.
    fn from_flag(offset: usize, value: u8) -> Result<Self> {
        match value {
            b'B' => Ok(Self::Binary),
            b'T' => Ok(Self::Text),
            _ => Err(GbxError::InvalidFlag { offset, field: "byte format", value }),
        }
    }

    fn as_flag(self) -> u8 {
        match self {
            Self::Binary => b'B',
            Self::Text => b'T',
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Compression {
    Compressed,
    Uncompressed,
}

impl Compression {
    /// Only `C` and `U` are accepted. Any other byte could not be written back as read,
    /// so such files are refused.
    fn from_flag(offset: usize, field: &'static str, value: u8) -> Result<Self> {
        match value {
            b'C' => Ok(Self::Compressed),
            b'U' => Ok(Self::Uncompressed),
            _ => Err(GbxError::InvalidFlag { offset, field, value }),
        }
    }

    fn as_flag(self) -> u8 {
        match self {
            Self::Compressed => b'C',
            Self::Uncompressed => b'U',
        }
    }

    #[inline]
    pub fn is_compressed(self) -> bool { self == Self::Compressed }
}

/// Flag bytes present from version 3.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HeaderFlags {
    pub byte_format: ByteFormat,
    pub ref_table_compression: Compression,
    pub body_compression: Compression,
}

/// Header chunk section present from version 6.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserData {
    /// Value stored in the file. Recomputed from `chunks` on write.
    pub declared_size: u32,
    pub chunks: Vec<Chunk>,
}

impl UserData {
    /// Encoded size of the section following the size field: the chunk count,
    /// the chunk table and every payload.
    pub fn computed_size(&self) -> Result<u32> {
        let size = self
            .chunks
            .iter()
            .fold(4usize, |acc, chunk| acc + chunk.len() + CHUNK_DESCRIPTOR_SIZE);
        encode_len("user data", size)
    }

    pub fn chunk(&self, id: u32) -> Option<&Chunk> { self.chunks.iter().find(|c| c.id == id) }

    /// Replaces the chunk with the same ID in place, or appends it.
    pub fn set_chunk(&mut self, chunk: Chunk) {
        match self.chunks.iter_mut().find(|c| c.id == chunk.id) {
            Some(existing) => *existing = chunk,
            None => self.chunks.push(chunk),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GbxHeader {
    pub version: u16,
    pub flags: Option<HeaderFlags>,
    pub class_id: Option<u32>,
    pub user_data: Option<UserData>,
    pub node_count: u32,
}

impl GbxHeader {
    pub fn read(reader: &mut Reader) -> Result<Self> {
        let magic = reader.read_array::<3>()?;
        if magic != GBX_MAGIC {
            return Err(GbxError::BadMagic { found: magic });
        }

        let version = reader.read_u16()?;
        log::debug!("version {}", version);

        let mut flags = None;
        let mut class_id = None;
        if version >= VERSION_FLAGS {
            let offset = reader.position();
            let [format, ref_table, body] = reader.read_array::<3>()?;
            let header_flags = HeaderFlags {
                byte_format: ByteFormat::from_flag(offset, format)?,
                ref_table_compression: Compression::from_flag(offset + 1, "ref table", ref_table)?,
                body_compression: Compression::from_flag(offset + 2, "body", body)?,
            };
            log::debug!("flags {:?}", header_flags);
            flags = Some(header_flags);

            if version >= VERSION_RESERVED {
                let reserved = reader.read_u8()?;
                if reserved != RESERVED_PLACEHOLDER {
                    log::warn!(
                        "Reserved header byte {:#04X} will be written back as {:?}",
                        reserved,
                        RESERVED_PLACEHOLDER as char
                    );
                }
            }

            let id = reader.read_u32()?;
            log::debug!("class id {:#010X}", id);
            class_id = Some(id);
        }

        let mut user_data = None;
        if version >= VERSION_USER_DATA {
            let declared_size = reader.read_u32()?;
            let count = reader.read_u32()?;
            log::debug!("user data size {}, {} header chunks", declared_size, count);

            let mut descriptors = Vec::with_capacity((count as usize).min(reader.remaining() / 8));
            for _ in 0..count {
                let desc = ChunkDescriptor::read(reader)?;
                log::debug!("- {:?}", desc);
                descriptors.push(desc);
            }
            let chunks = descriptors
                .iter()
                .map(|desc| Chunk::read_payload(desc, reader))
                .collect::<Result<Vec<_>>>()?;

            let data = UserData { declared_size, chunks };
            let computed = data.computed_size()?;
            if computed != declared_size {
                log::warn!(
                    "User data size {} does not match header chunks ({}), it will be rewritten",
                    declared_size,
                    computed
                );
            }
            user_data = Some(data);
        }

        let node_count = reader.read_u32()?;
        log::debug!("node count {}", node_count);

        Ok(Self { version, flags, class_id, user_data, node_count })
    }

    pub fn write(&self, writer: &mut Writer) -> Result<()> {
        writer.write_bytes(&GBX_MAGIC);
        writer.write_u16(self.version);

        if self.version >= VERSION_FLAGS {
            let flags = self.flags()?;
            writer.write_u8(flags.byte_format.as_flag());
            writer.write_u8(flags.ref_table_compression.as_flag());
            writer.write_u8(flags.body_compression.as_flag());
            if self.version >= VERSION_RESERVED {
                writer.write_u8(RESERVED_PLACEHOLDER);
            }
            writer.write_u32(self.class_id()?);
        }

        if self.version >= VERSION_USER_DATA {
            let user_data = self.user_data()?;
            writer.write_u32(user_data.computed_size()?);
            writer.write_u32(encode_len("header chunk count", user_data.chunks.len())?);
            for chunk in &user_data.chunks {
                chunk.descriptor()?.write(writer);
            }
            for chunk in &user_data.chunks {
                writer.write_bytes(&chunk.data);
            }
        }

        writer.write_u32(self.node_count);
        Ok(())
    }

    #[inline]
    fn missing(&self, field: &'static str) -> GbxError {
        GbxError::MissingField { field, version: self.version }
    }

    pub fn flags(&self) -> Result<&HeaderFlags> {
        self.flags.as_ref().ok_or_else(|| self.missing("flags"))
    }

    pub fn flags_mut(&mut self) -> Result<&mut HeaderFlags> {
        let version = self.version;
        self.flags.as_mut().ok_or(GbxError::MissingField { field: "flags", version })
    }

    pub fn class_id(&self) -> Result<u32> { self.class_id.ok_or_else(|| self.missing("class id")) }

    pub fn user_data(&self) -> Result<&UserData> {
        self.user_data.as_ref().ok_or_else(|| self.missing("user data"))
    }

    pub fn user_data_mut(&mut self) -> Result<&mut UserData> {
        let version = self.version;
        self.user_data.as_mut().ok_or(GbxError::MissingField { field: "user data", version })
    }

    /// Whether the body that follows is compressed. Always false before version 3.
    pub fn body_compressed(&self) -> bool {
        self.flags.map_or(false, |f| f.body_compression.is_compressed())
    }

    /// Header chunks, empty before version 6.
    pub fn chunks(&self) -> &[Chunk] {
        self.user_data.as_ref().map(|u| u.chunks.as_slice()).unwrap_or_default()
    }
}
