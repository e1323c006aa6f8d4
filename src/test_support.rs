//! Fixture images for tests

use std::io::Cursor;
use std::path::{Path, PathBuf};

use exif::experimental::Writer;
use exif::{Exif, Field, In, Reader, Tag, Value};
use image::{ImageFormat, Rgb, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};

use crate::clock;
use crate::datetime;
use crate::metadata::{JpegImage, RawTag, TagId};

fn gradient() -> RgbImage {
    RgbImage::from_fn(32, 24, |x, y| Rgb([(x * 8) as u8, (y * 10) as u8, 128]))
}

/// A small JPEG straight from the encoder, with no Exif segment
pub fn blank_jpeg_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient()
        .write_to(&mut buf, ImageFormat::Jpeg)
        .expect("encode fixture JPEG");
    buf.into_inner()
}

pub fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient()
        .write_to(&mut buf, ImageFormat::Png)
        .expect("encode fixture PNG");
    buf.into_inner()
}

pub fn blank_jpeg(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, blank_jpeg_bytes()).expect("write fixture JPEG");
    path
}

/// A JPEG whose Exif block holds `value` as DateTimeOriginal
pub fn jpeg_with_capture_date(dir: &Path, name: &str, value: &str) -> PathBuf {
    let mut image = JpegImage::decode(blank_jpeg_bytes()).expect("decode fixture JPEG");
    image
        .set_tag(RawTag::ascii(TagId::DateTimeOriginal, value))
        .expect("set fixture tag");

    let path = dir.join(name);
    std::fs::write(&path, image.encode().expect("encode fixture Exif")).expect("write fixture JPEG");
    path
}

/// Set a file's mtime from an Exif-style local date string
pub fn set_mtime_exif(path: &Path, value: &str) {
    let time = datetime::parse_exif(value).expect("fixture date");
    clock::set_mtime(path, time).expect("set fixture mtime");
}

/// A JPEG with a little-endian Exif block the way a camera writes one:
/// Make in IFD0, ISO in the Exif IFD, a thumbnail in IFD1, no capture date
pub fn jpeg_with_camera_exif(dir: &Path, name: &str, make: &str, thumbnail: &[u8]) -> PathBuf {
    let make = Field {
        tag: Tag::Make,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![make.as_bytes().to_vec()]),
    };
    let iso = Field {
        tag: Tag::PhotographicSensitivity,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![200]),
    };

    let mut writer = Writer::new();
    writer.push_field(&make);
    writer.push_field(&iso);
    writer.set_jpeg(thumbnail, In::THUMBNAIL);
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, true).expect("write fixture Exif");

    let mut jpeg = Jpeg::from_bytes(Bytes::from(blank_jpeg_bytes())).expect("parse fixture JPEG");
    jpeg.set_exif(Some(Bytes::from(tiff.into_inner())));
    let mut out = Vec::new();
    jpeg.encoder().write_to(&mut out).expect("encode fixture JPEG");

    let path = dir.join(name);
    std::fs::write(&path, out).expect("write fixture JPEG");
    path
}

/// Parse the Exif block of a JPEG on disk, bypassing `JpegImage`
pub fn read_exif(path: &Path) -> Exif {
    let bytes = std::fs::read(path).expect("read JPEG");
    let jpeg = Jpeg::from_bytes(Bytes::from(bytes)).expect("parse JPEG");
    let tiff = jpeg.exif().expect("Exif segment");
    Reader::new().read_raw(tiff.to_vec()).expect("parse Exif")
}
