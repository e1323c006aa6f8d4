//! Exif date strings (`YYYY:MM:DD HH:MM:SS`) in host local time

use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::error::{Error, Result};

/// chrono format for Exif date/time values
pub const EXIF_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Render a timestamp the way Exif stores it (local time, whole seconds)
pub fn format_exif(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(EXIF_FORMAT).to_string()
}

/// Parse an Exif date string as local time
///
/// An ambiguous local time (clocks going back) resolves to the earlier
/// instant. A local time that doesn't exist (clocks going forward) is an error.
pub fn parse_exif(value: &str) -> Result<SystemTime> {
    let naive = NaiveDateTime::parse_from_str(value, EXIF_FORMAT).map_err(|e| Error::DateParse {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    from_local(naive).ok_or_else(|| Error::DateParse {
        value: value.to_string(),
        reason: "time does not exist in the local timezone".to_string(),
    })
}

/// What an unparseable date degrades to: chrono's default date/time
/// (1970-01-01 00:00:00) read as local time
pub fn fallback_time() -> SystemTime {
    from_local(NaiveDateTime::default()).unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Whether two timestamps fall in the same whole second
pub fn same_second(a: SystemTime, b: SystemTime) -> bool {
    DateTime::<Utc>::from(a).timestamp() == DateTime::<Utc>::from(b).timestamp()
}

fn from_local(naive: NaiveDateTime) -> Option<SystemTime> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(SystemTime::from)
}
