use std::path::Path;

use anyhow::Context;

use crate::{
    error::{GbxError, Result},
    format::{
        body::GbxBody,
        chunk::Chunk,
        header::{Compression, GbxHeader},
        reftable::RefTable,
    },
    util::{
        compression::{BodyCodec, Lzo},
        cursor::{Reader, Writer},
        file::{map_file, write_file},
    },
};

/// A parsed GBX container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GbxDocument {
    pub header: GbxHeader,
    pub ref_table: RefTable,
    pub body: GbxBody,
}

impl GbxDocument {
    #[inline]
    pub fn parse(data: &[u8]) -> Result<Self> { Self::parse_with(data, &Lzo) }

    pub fn parse_with<C>(data: &[u8], codec: &C) -> Result<Self>
    where C: BodyCodec + ?Sized {
        let mut reader = Reader::new(data);
        let header = GbxHeader::read(&mut reader)?;
        let ref_table = RefTable::read(&mut reader)?;
        let body = GbxBody::read(&mut reader, header.body_compressed(), codec)?;
        Ok(Self { header, ref_table, body })
    }

    #[inline]
    pub fn to_bytes(&self) -> Result<Vec<u8>> { self.to_bytes_with(&Lzo) }

    pub fn to_bytes_with<C>(&self, codec: &C) -> Result<Vec<u8>>
    where C: BodyCodec + ?Sized {
        let mut writer = Writer::with_capacity(self.body.data().len() + 1024);
        self.header.write(&mut writer)?;
        self.ref_table.write(&mut writer);
        self.body.write(&mut writer, self.header.body_compressed(), codec)?;
        Ok(writer.into_inner())
    }

    pub fn read_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = map_file(&path)?;
        Self::parse(&data)
            .with_context(|| format!("Failed to parse GBX file '{}'", path.as_ref().display()))
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let data = self.to_bytes()?;
        write_file(path, &data)
    }

    #[inline]
    pub fn version(&self) -> u16 { self.header.version }

    #[inline]
    pub fn class_id(&self) -> Result<u32> { self.header.class_id() }

    /// Looks up a header chunk by ID.
    pub fn header_chunk(&self, id: u32) -> Option<&Chunk> {
        self.header.user_data.as_ref()?.chunk(id)
    }

    /// Replaces the header chunk with the same ID, keeping its position, or appends it.
    pub fn set_header_chunk(&mut self, chunk: Chunk) -> Result<()> {
        self.header.user_data_mut()?.set_chunk(chunk);
        Ok(())
    }

    /// Selects whether the body is compressed when written.
    pub fn set_body_compression(&mut self, compression: Compression) -> Result<()> {
        self.header.flags_mut()?.body_compression = compression;
        Ok(())
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut GbxBody { &mut self.body }

    /// Chunks framed from the decompressed body.
    #[inline]
    pub fn body_chunks(&self) -> Result<Vec<Chunk>> { self.body.chunks() }

    /// Fails unless the document's class ID is `expected`. Documents older than
    /// version 3 have no class ID and never match.
    pub fn expect_class(&self, expected: u32) -> Result<()> {
        let actual = self.header.class_id;
        if actual != Some(expected) {
            return Err(GbxError::WrongSchema { expected, actual });
        }
        Ok(())
    }
}
