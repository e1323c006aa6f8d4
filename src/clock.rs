//! File modification time access

use std::fs::{self, File};
use std::path::Path;
use std::time::SystemTime;

use crate::error::{Error, Result};

/// Last-modified time of a file
pub fn get_mtime(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|e| Error::io(path, e))
}

/// Overwrite a file's last-modified time without touching its content
///
/// On Unix the file is opened read-only: changing timestamps needs ownership,
/// not write permission. Windows needs a writable handle for this.
pub fn set_mtime(path: &Path, time: SystemTime) -> Result<()> {
    let file = timestamp_handle(path).map_err(|e| Error::io(path, e))?;

    file.set_modified(time).map_err(|e| Error::io(path, e))
}

#[cfg(unix)]
fn timestamp_handle(path: &Path) -> std::io::Result<File> {
    File::open(path)
}

#[cfg(not(unix))]
fn timestamp_handle(path: &Path) -> std::io::Result<File> {
    File::options().write(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        fs::write(&path, b"contents").unwrap();

        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_684_333_800);
        set_mtime(&path, time).unwrap();

        assert_eq!(get_mtime(&path).unwrap(), time);
        assert_eq!(fs::read(&path).unwrap(), b"contents");
    }

    #[cfg(unix)]
    #[test]
    fn test_set_mtime_on_read_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.jpg");
        fs::write(&path, b"contents").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
        set_mtime(&path, time).unwrap();

        assert_eq!(get_mtime(&path).unwrap(), time);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jpg");

        assert!(matches!(get_mtime(&path), Err(Error::Io { .. })));
        assert!(matches!(
            set_mtime(&path, SystemTime::now()),
            Err(Error::Io { .. })
        ));
    }
}
