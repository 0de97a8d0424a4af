use std::borrow::Cow;

use serde_derive::Serialize;

use crate::{
    error::Result,
    format::chunk::{read_chunks, Chunk},
    util::{
        compression::{decompress_buffer, BodyCodec},
        cursor::{encode_len, Reader, Writer},
    },
};

/// Size fields preceding a compressed body.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BodySizes {
    pub decompressed: u32,
    pub compressed: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GbxBody {
    data: Vec<u8>,
    sizes: Option<BodySizes>,
    // Compressed bytes as read from the file, valid while `data` is unmodified
    compressed: Option<Vec<u8>>,
    // Bytes following a compressed body
    trailing: Vec<u8>,
}

impl GbxBody {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, sizes: None, compressed: None, trailing: Vec::new() }
    }

    pub fn read<C>(reader: &mut Reader, compressed: bool, codec: &C) -> Result<Self>
    where C: BodyCodec + ?Sized {
        if !compressed {
            let data = reader.rest().to_vec();
            log::debug!("uncompressed body, {} bytes", data.len());
            return Ok(Self::new(data));
        }

        let sizes = BodySizes { decompressed: reader.read_u32()?, compressed: reader.read_u32()? };
        log::debug!("body sizes {:?}", sizes);
        let compressed_data = reader.read_bytes(sizes.compressed as usize)?;
        let data = decompress_buffer(codec, compressed_data, sizes.decompressed as usize)?;
        let trailing = reader.rest().to_vec();
        if !trailing.is_empty() {
            log::warn!("Keeping {} unknown bytes after compressed body", trailing.len());
        }
        Ok(Self {
            data,
            sizes: Some(sizes),
            compressed: Some(compressed_data.to_vec()),
            trailing,
        })
    }

    pub fn write<C>(&self, writer: &mut Writer, compressed: bool, codec: &C) -> Result<()>
    where C: BodyCodec + ?Sized {
        if !compressed {
            writer.write_bytes(&self.data);
            writer.write_bytes(&self.trailing);
            return Ok(());
        }

        let compressed_data = match &self.compressed {
            Some(data) => Cow::Borrowed(data.as_slice()),
            None => Cow::Owned(codec.compress(&self.data)?),
        };
        writer.write_u32(encode_len("decompressed body", self.data.len())?);
        writer.write_u32(encode_len("compressed body", compressed_data.len())?);
        writer.write_bytes(&compressed_data);
        writer.write_bytes(&self.trailing);
        Ok(())
    }

    /// Decompressed body bytes.
    #[inline]
    pub fn data(&self) -> &[u8] { &self.data }

    /// Replaces the body bytes. The body is recompressed on write if required.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
        self.sizes = None;
        self.compressed = None;
    }

    /// Sizes read from the file, if the body was compressed.
    #[inline]
    pub fn sizes(&self) -> Option<BodySizes> { self.sizes }

    /// Unknown bytes found after a compressed body, written back unchanged.
    #[inline]
    pub fn trailing(&self) -> &[u8] { &self.trailing }

    /// Frames the body bytes into consecutive chunks.
    pub fn chunks(&self) -> Result<Vec<Chunk>> { read_chunks(&self.data) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::GbxError, util::compression::Lzo};

    /// Ignores its input and expands to a fixed buffer.
    struct Fixed(Vec<u8>);

    impl BodyCodec for Fixed {
        fn compress(&self, _data: &[u8]) -> Result<Vec<u8>> { Ok(vec![0xC0; 40]) }

        fn decompress(&self, _data: &[u8], _expected_len: usize) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    fn compressed_stream(decompressed: u32, payload: &[u8]) -> Vec<u8> {
        let mut writer = Writer::new();
        writer.write_u32(decompressed);
        writer.write_u32(payload.len() as u32);
        writer.write_bytes(payload);
        writer.into_inner()
    }

    #[test]
    fn compressed_body_uses_codec() {
        let expected: Vec<u8> = (0..100u8).collect();
        let data = compressed_stream(100, &[0x11; 40]);
        let mut reader = Reader::new(&data);
        let body = GbxBody::read(&mut reader, true, &Fixed(expected.clone())).unwrap();
        assert!(reader.is_empty());
        assert_eq!(body.data(), expected);
        assert_eq!(body.sizes(), Some(BodySizes { decompressed: 100, compressed: 40 }));

        // The original compressed bytes are written back untouched
        let mut writer = Writer::new();
        body.write(&mut writer, true, &Fixed(expected)).unwrap();
        assert_eq!(writer.into_inner(), data);
    }

    #[test]
    fn bytes_after_compressed_body_are_kept() {
        let mut data = compressed_stream(100, &[0x11; 40]);
        data.extend([0xDE, 0xAD]);
        let body = GbxBody::read(&mut Reader::new(&data), true, &Fixed(vec![0; 100])).unwrap();
        assert_eq!(body.trailing(), [0xDEu8, 0xAD]);

        let mut writer = Writer::new();
        body.write(&mut writer, true, &Fixed(vec![0; 100])).unwrap();
        assert_eq!(writer.into_inner(), data);
    }

    #[test]
    fn decompressed_length_mismatch() {
        let data = compressed_stream(100, &[0x11; 40]);
        assert!(matches!(
            GbxBody::read(&mut Reader::new(&data), true, &Fixed(vec![0; 99])),
            Err(GbxError::DecompressionFailed { expected: 100, actual: Some(99), .. })
        ));
    }

    #[test]
    fn truncated_compressed_data() {
        let mut data = compressed_stream(100, &[0x11; 40]);
        data.truncate(30);
        assert!(matches!(
            GbxBody::read(&mut Reader::new(&data), true, &Fixed(vec![0; 100])),
            Err(GbxError::ShortRead { offset: 8, wanted: 40, available: 22 })
        ));
    }

    #[test]
    fn modified_body_is_recompressed() {
        let mut body = GbxBody::new(vec![1, 2, 3]);
        body.set_data(vec![7; 300]);
        let mut writer = Writer::new();
        body.write(&mut writer, true, &Lzo).unwrap();
        let data = writer.into_inner();

        let body = GbxBody::read(&mut Reader::new(&data), true, &Lzo).unwrap();
        assert_eq!(body.data(), [7u8; 300]);
        assert_eq!(body.sizes().unwrap().decompressed, 300);
        assert_eq!(body.sizes().unwrap().compressed as usize, data.len() - 8);
    }

    #[test]
    fn uncompressed_body_is_rest_of_stream() {
        let data = [0xAA, 0xBB, 0xCC];
        let mut reader = Reader::new(&data);
        reader.read_u8().unwrap();
        let body = GbxBody::read(&mut reader, false, &Lzo).unwrap();
        assert_eq!(body.data(), [0xBBu8, 0xCC]);
        assert!(body.sizes().is_none());
        assert!(body.chunks().unwrap().is_empty());
    }
}
