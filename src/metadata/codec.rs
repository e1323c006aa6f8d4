//! JPEG + Exif codec
//!
//! A decoded `JpegImage` keeps the file's segments untouched and holds the
//! Exif block as an editable `TagTable`. Encoding only swaps the Exif APP1
//! segment, so the compressed pixel data comes back out byte for byte.

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Exif, Field, In, Reader, Tag, Value};
use image::ImageFormat;
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};

use super::tags::{RawTag, TagId, ASCII_TYPE};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("file content is not JPEG")]
    NotJpeg,

    #[error("malformed JPEG structure: {0}")]
    Container(String),

    #[error("malformed Exif block: {0}")]
    Exif(#[source] exif::Error),

    #[error("failed to write Exif block: {0}")]
    Encode(#[source] exif::Error),

    #[error("tag 0x{0:04x} is not a date tag")]
    UnknownTag(u16),

    #[error("tag 0x{id:04x} has type code {type_code}; only ASCII tags can be written")]
    UnsupportedType { id: u16, type_code: u16 },
}

/// Decoded Exif tags plus what's needed to write them back the same way
///
/// An empty table is big-endian, so new Exif blocks come out in Motorola
/// byte order like most cameras write them.
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    fields: Vec<Field>,
    little_endian: bool,
    /// Embedded thumbnail JPEG (IFD1), carried across a rewrite
    thumbnail: Option<Vec<u8>>,
}

impl TagTable {
    fn parse(tiff: Vec<u8>) -> Result<Self, CodecError> {
        let exif = Reader::new().read_raw(tiff).map_err(CodecError::Exif)?;
        let thumbnail = thumbnail_bytes(&exif);

        Ok(TagTable {
            fields: exif.fields().cloned().collect(),
            little_endian: exif.little_endian(),
            thumbnail,
        })
    }

    fn find(&self, tag: Tag) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.tag == tag && field.ifd_num == In::PRIMARY)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialize back to a TIFF block (without the "Exif\0\0" prefix)
    fn to_tiff(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = Writer::new();
        for field in &self.fields {
            writer.push_field(field);
        }
        if let Some(thumbnail) = &self.thumbnail {
            writer.set_jpeg(thumbnail, In::THUMBNAIL);
        }

        let mut buf = Cursor::new(Vec::new());
        writer
            .write(&mut buf, self.little_endian)
            .map_err(CodecError::Encode)?;
        Ok(buf.into_inner())
    }
}

/// A JPEG file split into its segments, with the Exif block decoded
pub struct JpegImage {
    jpeg: Jpeg,
    tags: TagTable,
}

impl JpegImage {
    /// Decode a whole JPEG file
    ///
    /// A JPEG without an Exif segment decodes to an empty tag table.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, CodecError> {
        match image::guess_format(&bytes) {
            Ok(ImageFormat::Jpeg) => {}
            _ => return Err(CodecError::NotJpeg),
        }

        let jpeg = Jpeg::from_bytes(Bytes::from(bytes))
            .map_err(|e| CodecError::Container(e.to_string()))?;

        let tags = match jpeg.exif() {
            Some(tiff) => TagTable::parse(tiff.to_vec())?,
            None => TagTable::default(),
        };

        Ok(JpegImage { jpeg, tags })
    }

    /// Raw bytes of a date tag in the primary image, if the file has it
    pub fn get_tag(&self, id: TagId) -> Option<RawTag> {
        self.tags
            .find(id.exif_tag())
            .map(|field| raw_tag(id, &field.value))
    }

    /// Insert or replace a date tag
    pub fn set_tag(&mut self, tag: RawTag) -> Result<(), CodecError> {
        let id = TagId::from_number(tag.id).ok_or(CodecError::UnknownTag(tag.id))?;
        if tag.type_code != ASCII_TYPE {
            return Err(CodecError::UnsupportedType {
                id: tag.id,
                type_code: tag.type_code,
            });
        }

        // The writer adds the terminator back on its own
        let payload = &tag.value[..tag.len.min(tag.value.len())];
        let text = payload.strip_suffix(b"\0").unwrap_or(payload).to_vec();

        let field = Field {
            tag: id.exif_tag(),
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![text]),
        };

        let existing = self
            .tags
            .fields
            .iter_mut()
            .find(|f| f.tag == field.tag && f.ifd_num == In::PRIMARY);
        match existing {
            Some(slot) => *slot = field,
            None => self.tags.fields.push(field),
        }

        Ok(())
    }

    /// Re-serialize the full image with the current tag table
    pub fn encode(self) -> Result<Vec<u8>, CodecError> {
        let JpegImage { mut jpeg, tags } = self;

        if !tags.is_empty() {
            jpeg.set_exif(Some(Bytes::from(tags.to_tiff()?)));
        }

        let mut out = Vec::new();
        jpeg.encoder()
            .write_to(&mut out)
            .map_err(|e| CodecError::Container(e.to_string()))?;
        Ok(out)
    }
}

/// Locate the IFD1 thumbnail inside the TIFF buffer
pub(crate) fn thumbnail_bytes(exif: &Exif) -> Option<Vec<u8>> {
    let offset = exif
        .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    let len = exif
        .get_field(Tag::JPEGInterchangeFormatLength, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;

    exif.buf()
        .get(offset..offset.checked_add(len)?)
        .map(<[u8]>::to_vec)
}

/// Turn a decoded value back into payload bytes
///
/// ASCII components each get their NUL back. Anything else is rendered as
/// text, which the date parser will then reject.
fn raw_tag(id: TagId, value: &Value) -> RawTag {
    let bytes: Vec<u8> = match value {
        Value::Ascii(strings) => strings
            .iter()
            .flat_map(|s| s.iter().copied().chain(std::iter::once(0)))
            .collect(),
        Value::Byte(bytes) | Value::Undefined(bytes, _) => bytes.clone(),
        other => format!("{}\0", other.display_as(id.exif_tag())).into_bytes(),
    };

    RawTag {
        id: id.number(),
        type_code: type_code(value),
        len: bytes.len(),
        value: bytes,
    }
}

fn type_code(value: &Value) -> u16 {
    match value {
        Value::Byte(_) => 1,
        Value::Ascii(_) => ASCII_TYPE,
        Value::Short(_) => 3,
        Value::Long(_) => 4,
        Value::Rational(_) => 5,
        Value::SByte(_) => 6,
        Value::Undefined(..) => 7,
        Value::SShort(_) => 8,
        Value::SLong(_) => 9,
        Value::SRational(_) => 10,
        Value::Float(_) => 11,
        Value::Double(_) => 12,
        Value::Unknown(code, ..) => *code,
    }
}
