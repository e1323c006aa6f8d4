//! Exif metadata handling
//!
//! - `tags.rs` names the date tags and the raw tag record
//! - `codec.rs` reads and rewrites the Exif block inside a JPEG

pub mod codec;
pub mod tags;

pub use codec::{CodecError, JpegImage};
pub use tags::{RawTag, TagId};
