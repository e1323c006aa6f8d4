//! Exif date tag vocabulary and the raw tag record
//!
//! Only the three textual date tags are known here. The offset-time tags
//! (0x9010..0x9012) that usually travel with them are left alone.

use std::fmt;

use exif::Tag;
use serde::{Deserialize, Serialize};

/// Exif type code for a NUL-terminated ASCII string
pub const ASCII_TYPE: u16 = 2;

/// Date tags this tool can read or write
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TagId {
    /// 0x0132 in IFD0. Exif calls this the date the file was changed.
    DateTime,
    /// 0x9003 in the Exif IFD. When the picture was taken.
    DateTimeOriginal,
    /// 0x9004 in the Exif IFD. When the image was stored as digital data.
    DateTimeDigitized,
}

impl TagId {
    /// Every date tag, in the order the legacy behaviour wrote them
    pub const ALL_DATES: [TagId; 3] = [
        TagId::DateTime,
        TagId::DateTimeOriginal,
        TagId::DateTimeDigitized,
    ];

    /// Numeric Exif identifier
    pub fn number(self) -> u16 {
        match self {
            TagId::DateTime => 0x0132,
            TagId::DateTimeOriginal => 0x9003,
            TagId::DateTimeDigitized => 0x9004,
        }
    }

    pub fn from_number(number: u16) -> Option<Self> {
        Self::ALL_DATES.into_iter().find(|id| id.number() == number)
    }

    /// The matching tag in the Exif library, which also carries its IFD context
    pub fn exif_tag(self) -> Tag {
        match self {
            TagId::DateTime => Tag::DateTime,
            TagId::DateTimeOriginal => Tag::DateTimeOriginal,
            TagId::DateTimeDigitized => Tag::DateTimeDigitized,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TagId::DateTime => "DateTime",
            TagId::DateTimeOriginal => "DateTimeOriginal",
            TagId::DateTimeDigitized => "DateTimeDigitized",
        }
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04x})", self.name(), self.number())
    }
}

/// A tag as stored in the file: identifier, type code, byte length, payload
///
/// Plain data, no invariants beyond its four fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    pub id: u16,
    pub type_code: u16,
    pub len: usize,
    pub value: Vec<u8>,
}

impl RawTag {
    /// Build an ASCII tag whose payload is `text` followed by one NUL byte
    pub fn ascii(id: TagId, text: &str) -> Self {
        let mut value = Vec::with_capacity(text.len() + 1);
        value.extend_from_slice(text.as_bytes());
        value.push(0);

        RawTag {
            id: id.number(),
            type_code: ASCII_TYPE,
            len: value.len(),
            value,
        }
    }

    /// Payload as text with exactly the last byte (the terminator) dropped
    ///
    /// A zero-length payload gives an empty string.
    pub fn text(&self) -> String {
        let end = self.len.saturating_sub(1).min(self.value.len());
        String::from_utf8_lossy(&self.value[..end]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_payload_has_single_terminator() {
        let tag = RawTag::ascii(TagId::DateTimeOriginal, "2022:12:25 09:15:00");

        assert_eq!(tag.id, 0x9003);
        assert_eq!(tag.type_code, ASCII_TYPE);
        assert_eq!(tag.value, b"2022:12:25 09:15:00\0".to_vec());
        assert_eq!(tag.len, 20);
        assert_eq!(tag.text(), "2022:12:25 09:15:00");
    }

    #[test]
    fn test_text_of_empty_payload() {
        let tag = RawTag {
            id: 0x9003,
            type_code: ASCII_TYPE,
            len: 0,
            value: Vec::new(),
        };

        assert_eq!(tag.text(), "");
    }

    #[test]
    fn test_text_strips_only_last_byte() {
        // Whatever the last byte is, it goes; nothing else does
        let tag = RawTag {
            id: 0x9003,
            type_code: ASCII_TYPE,
            len: 4,
            value: b"abcd".to_vec(),
        };

        assert_eq!(tag.text(), "abc");
    }

    #[test]
    fn test_number_lookup() {
        for id in TagId::ALL_DATES {
            assert_eq!(TagId::from_number(id.number()), Some(id));
        }
        assert_eq!(TagId::from_number(0x9010), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TagId::DateTimeOriginal).unwrap();
        assert_eq!(json, "\"date_time_original\"");

        let parsed: TagId = serde_json::from_str("\"date_time_digitized\"").unwrap();
        assert_eq!(parsed, TagId::DateTimeDigitized);
    }
}
