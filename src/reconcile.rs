//! Capture date / modification time reconciliation
//!
//! Each JPEG goes down exactly one of two paths, picked by whether it carries
//! an Exif DateTimeOriginal tag:
//! - tag present: the file's mtime is moved to the capture date; the file
//!   content is never touched
//! - tag absent: the mtime is written into the Exif block, the file is
//!   rewritten, and the original mtime is put back

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::clock;
use crate::config::{MalformedDatePolicy, ReconcileConfig};
use crate::datetime;
use crate::error::{Error, Result};
use crate::metadata::{JpegImage, RawTag, TagId};

/// What happened to one file
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The mtime was changed to match DateTimeOriginal
    Synced {
        /// DateTimeOriginal as stored in the file
        captured: String,
        previous: SystemTime,
        applied: SystemTime,
        /// The stored value didn't parse and the default timestamp was used
        fell_back: bool,
    },
    /// DateTimeOriginal and mtime already agree; nothing was written
    Unchanged { captured: String, fell_back: bool },
    /// The file had no DateTimeOriginal; it was written from the mtime
    Tagged { written: String, tags: Vec<TagId> },
}

impl Outcome {
    /// Whether an unparseable date was replaced by the default timestamp
    pub fn fell_back(&self) -> bool {
        match self {
            Outcome::Synced { fell_back, .. } | Outcome::Unchanged { fell_back, .. } => *fell_back,
            Outcome::Tagged { .. } => false,
        }
    }
}

/// Reconcile one JPEG's mtime with its capture date
pub fn reconcile(path: &Path, config: &ReconcileConfig) -> Result<Outcome> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let image = JpegImage::decode(bytes).map_err(|source| Error::UnsupportedFormat {
        path: path.to_path_buf(),
        source,
    })?;

    match image.get_tag(TagId::DateTimeOriginal) {
        Some(tag) => {
            debug!(path = %path.display(), "DateTimeOriginal present");
            sync_mtime_to_tag(path, &tag, config)
        }
        None => {
            debug!(path = %path.display(), "DateTimeOriginal missing");
            write_tag_from_mtime(path, image, config)
        }
    }
}

/// Move the file's mtime to the stored capture date
fn sync_mtime_to_tag(path: &Path, tag: &RawTag, config: &ReconcileConfig) -> Result<Outcome> {
    let captured = tag.text();

    let (applied, fell_back) = match datetime::parse_exif(&captured) {
        Ok(time) => (time, false),
        Err(err) => match config.malformed_dates {
            MalformedDatePolicy::Error => return Err(err),
            MalformedDatePolicy::Fallback => {
                let fallback = datetime::fallback_time();
                warn!(
                    path = %path.display(),
                    value = %captured,
                    error = %err,
                    fallback = %datetime::format_exif(fallback),
                    "unparseable DateTimeOriginal, using default timestamp"
                );
                (fallback, true)
            }
        },
    };

    let previous = clock::get_mtime(path)?;
    if datetime::same_second(previous, applied) {
        debug!(path = %path.display(), "mtime already matches capture date");
        return Ok(Outcome::Unchanged { captured, fell_back });
    }

    clock::set_mtime(path, applied)?;
    info!(
        path = %path.display(),
        from = %datetime::format_exif(previous),
        to = %datetime::format_exif(applied),
        "mtime updated from capture date"
    );

    Ok(Outcome::Synced {
        captured,
        previous,
        applied,
        fell_back,
    })
}

/// Store the file's mtime as its capture date, then restore the mtime
fn write_tag_from_mtime(path: &Path, mut image: JpegImage, config: &ReconcileConfig) -> Result<Outcome> {
    let mtime = clock::get_mtime(path)?;
    let written = datetime::format_exif(mtime);

    let tags = config.populate_tags();
    for id in &tags {
        image
            .set_tag(RawTag::ascii(*id, &written))
            .map_err(|source| Error::Encode {
                path: path.to_path_buf(),
                source,
            })?;
    }

    let encoded = image.encode().map_err(|source| Error::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    replace_contents(path, &encoded)?;

    // Rewriting bumped the mtime; put the captured one back
    clock::set_mtime(path, mtime)?;
    info!(path = %path.display(), value = %written, ?tags, "capture date written from mtime");

    Ok(Outcome::Tagged { written, tags })
}

/// Swap in new file contents without ever leaving a half-written photo
///
/// The bytes go to a temp file next to the original, which is synced and
/// then renamed over it with the original's permissions.
fn replace_contents(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let permissions = fs::metadata(path)
        .map_err(|e| Error::io(path, e))?
        .permissions();

    let mut temp = NamedTempFile::new_in(&parent).map_err(|e| Error::io(&parent, e))?;
    temp.write_all(bytes).map_err(|e| Error::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::io(temp.path(), e))?;
    temp.as_file()
        .set_permissions(permissions)
        .map_err(|e| Error::io(temp.path(), e))?;

    temp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
