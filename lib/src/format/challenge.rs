use std::io::Cursor;

use binrw::{binread, BinReaderExt};
use image::DynamicImage;
use serde_derive::Serialize;

use crate::{
    error::Result,
    format::{chunk::Chunk, gbx::GbxDocument},
    util::cursor::{Reader, Writer},
};

// Map (CGameCtnChallenge)
pub const CLASS_ID_CHALLENGE: u32 = 0x0304_3000;

// Community XML
pub const K_CHUNK_XML: u32 = 0x0304_3005;
// Thumbnail JPEG
pub const K_CHUNK_THUMBNAIL: u32 = 0x0304_3007;
// Author information
pub const K_CHUNK_AUTHOR: u32 = 0x0304_3008;

/// Thumbnail chunk prefix
#[binread]
#[br(little)]
#[derive(Clone, Debug)]
struct ThumbnailHeader {
    version: u32,
    #[br(if(version != 0))]
    image: Option<ThumbnailImage>,
}

#[binread]
#[br(little)]
#[derive(Clone, Debug)]
struct ThumbnailImage {
    #[br(temp)]
    size: u32,
    #[br(magic = b"<Thumbnail.jpg>", count = size)]
    jpeg: Vec<u8>,
}

/// Author information chunk
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuthorInfo {
    pub map_info_version: u32,
    pub author_version: u32,
    pub login: String,
    pub nickname: String,
    pub zone: String,
    pub extra_info: String,
}

impl AuthorInfo {
    pub fn read(reader: &mut Reader) -> Result<Self> {
        Ok(Self {
            map_info_version: reader.read_u32()?,
            author_version: reader.read_u32()?,
            login: reader.read_string()?,
            nickname: reader.read_string()?,
            zone: reader.read_string()?,
            extra_info: reader.read_string()?,
        })
    }

    pub fn write(&self, writer: &mut Writer) -> Result<()> {
        writer.write_u32(self.map_info_version);
        writer.write_u32(self.author_version);
        writer.write_string(&self.login)?;
        writer.write_string(&self.nickname)?;
        writer.write_string(&self.zone)?;
        writer.write_string(&self.extra_info)?;
        Ok(())
    }
}

/// Map-specific view over a document's header chunks.
pub struct ChallengeMap<'a> {
    doc: &'a mut GbxDocument,
    author: Option<AuthorInfo>,
    // Bytes following the known author fields
    author_trailing: Vec<u8>,
    author_modified: bool,
}

impl<'a> ChallengeMap<'a> {
    pub fn new(doc: &'a mut GbxDocument) -> Result<Self> {
        doc.expect_class(CLASS_ID_CHALLENGE)?;
        Ok(Self { doc, author: None, author_trailing: Vec::new(), author_modified: false })
    }

    #[inline]
    pub fn document(&self) -> &GbxDocument { &*self.doc }

    /// Raw thumbnail chunk payload.
    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.doc.header_chunk(K_CHUNK_THUMBNAIL).map(|c| c.data.as_slice())
    }

    /// Embedded JPEG bytes, if the map has a thumbnail.
    pub fn thumbnail_jpeg(&self) -> Result<Option<Vec<u8>>> {
        let Some(data) = self.thumbnail() else { return Ok(None) };
        let header: ThumbnailHeader = Cursor::new(data).read_le()?;
        log::debug!("thumbnail version {}", header.version);
        Ok(header.image.map(|image| image.jpeg))
    }

    /// Decoded thumbnail, rotated and mirrored into display orientation.
    pub fn thumbnail_image(&self) -> Result<Option<DynamicImage>> {
        let Some(jpeg) = self.thumbnail_jpeg()? else { return Ok(None) };
        let image = image::load_from_memory(&jpeg)?;
        Ok(Some(orient_thumbnail(image)))
    }

    /// Community XML text.
    pub fn xml(&self) -> Result<Option<String>> {
        match self.doc.header_chunk(K_CHUNK_XML) {
            Some(chunk) => Ok(Some(chunk.reader().read_string()?)),
            None => Ok(None),
        }
    }

    /// Author information, decoded on first access.
    pub fn author(&mut self) -> Result<Option<&AuthorInfo>> {
        self.load_author()?;
        Ok(self.author.as_ref())
    }

    /// Mutable author information. Changes are written back by [`Self::save`].
    pub fn author_mut(&mut self) -> Result<Option<&mut AuthorInfo>> {
        self.load_author()?;
        self.author_modified |= self.author.is_some();
        Ok(self.author.as_mut())
    }

    pub fn set_author(&mut self, author: AuthorInfo) {
        self.author = Some(author);
        self.author_modified = true;
    }

    pub fn author_login(&mut self) -> Result<Option<&str>> {
        Ok(self.author()?.map(|a| a.login.as_str()))
    }

    pub fn author_nickname(&mut self) -> Result<Option<&str>> {
        Ok(self.author()?.map(|a| a.nickname.as_str()))
    }

    pub fn author_zone(&mut self) -> Result<Option<&str>> {
        Ok(self.author()?.map(|a| a.zone.as_str()))
    }

    pub fn author_extra_info(&mut self) -> Result<Option<&str>> {
        Ok(self.author()?.map(|a| a.extra_info.as_str()))
    }

    pub fn map_info_version(&mut self) -> Result<Option<u32>> {
        Ok(self.author()?.map(|a| a.map_info_version))
    }

    pub fn author_version(&mut self) -> Result<Option<u32>> {
        Ok(self.author()?.map(|a| a.author_version))
    }

    /// Writes modified fields back into the document's header chunks.
    pub fn save(&mut self) -> Result<()> {
        if !self.author_modified {
            return Ok(());
        }
        let Some(author) = &self.author else { return Ok(()) };
        let mut writer = Writer::new();
        author.write(&mut writer)?;
        writer.write_bytes(&self.author_trailing);
        let heavy = self.doc.header_chunk(K_CHUNK_AUTHOR).map_or(false, |c| c.heavy);
        self.doc.set_header_chunk(Chunk { id: K_CHUNK_AUTHOR, heavy, data: writer.into_inner() })?;
        self.author_modified = false;
        Ok(())
    }

    fn load_author(&mut self) -> Result<()> {
        if self.author.is_some() {
            return Ok(());
        }
        if let Some(chunk) = self.doc.header_chunk(K_CHUNK_AUTHOR) {
            let mut reader = chunk.reader();
            let author = AuthorInfo::read(&mut reader)?;
            if !reader.is_empty() {
                log::warn!("Keeping {} unknown bytes after author information", reader.remaining());
            }
            self.author_trailing = reader.rest().to_vec();
            self.author = Some(author);
        }
        Ok(())
    }
}

/// Thumbnails are stored upside down and mirrored.
pub fn orient_thumbnail(image: DynamicImage) -> DynamicImage { image.rotate180().fliph() }
