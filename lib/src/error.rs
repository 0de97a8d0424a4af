use std::str::Utf8Error;

pub type Result<T, E = GbxError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum GbxError {
    #[error("Not a GBX file (magic {found:02X?})")]
    BadMagic { found: [u8; 3] },

    #[error("Unexpected end of data at offset {offset:#X}: wanted {wanted} bytes, {available} available")]
    ShortRead { offset: usize, wanted: usize, available: usize },

    #[error("Invalid UTF-8 string at offset {offset:#X}")]
    InvalidEncoding {
        offset: usize,
        #[source]
        source: Utf8Error,
    },

    #[error("Invalid {field} flag {value:#04X} at offset {offset:#X}")]
    InvalidFlag { offset: usize, field: &'static str, value: u8 },

    #[error("File references {count} external nodes, which is not supported")]
    UnsupportedExternalReferences { count: u32 },

    /// The codec rejected the stream (`actual` is `None`) or produced the wrong length.
    #[error("Body decompression to {expected} bytes failed: {reason}")]
    DecompressionFailed { expected: usize, actual: Option<usize>, reason: String },

    #[error("Body compression failed: {reason}")]
    CompressionFailed { reason: String },

    /// `actual` is `None` for versions without a class ID.
    #[error("Class ID {actual:X?} does not match {expected:#010X}")]
    WrongSchema { expected: u32, actual: Option<u32> },

    #[error("Field '{field}' is not present in GBX version {version}")]
    MissingField { field: &'static str, version: u16 },

    #[error("{field} is too large to encode ({value})")]
    ValueTooLarge { field: &'static str, value: usize },

    #[error("Invalid thumbnail data")]
    Thumbnail(#[from] binrw::Error),

    #[error("Failed to decode thumbnail image")]
    Image(#[from] image::ImageError),
}
