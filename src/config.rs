//! Reconcile settings
//!
//! Settings can come from a JSON file, e.g.
//!
//! ```json
//! { "populate": ["date_time", "date_time_original", "date_time_digitized"],
//!   "malformed_dates": "error" }
//! ```
//!
//! Missing keys take their defaults. Command-line flags are applied on top.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metadata::TagId;

/// Tags written when a file has no capture date
const DEFAULT_POPULATE: &[TagId] = &[TagId::DateTimeOriginal];

/// What to do when a DateTimeOriginal value can't be parsed
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MalformedDatePolicy {
    /// Log a warning and use the default timestamp (1970-01-01 00:00:00 local)
    #[default]
    Fallback,
    /// Fail the file
    Error,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Tag identifiers filled in from the file's mtime when DateTimeOriginal
    /// is missing
    pub populate: Vec<TagId>,

    pub malformed_dates: MalformedDatePolicy,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            populate: DEFAULT_POPULATE.to_vec(),
            malformed_dates: MalformedDatePolicy::Fallback,
        }
    }
}

impl ReconcileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write all three date tags, like the first version of the tool did
    pub fn all_dates() -> Self {
        Self {
            populate: TagId::ALL_DATES.to_vec(),
            ..Self::default()
        }
    }

    /// Tags to write, without duplicates; an empty list means the default
    pub fn populate_tags(&self) -> Vec<TagId> {
        if self.populate.is_empty() {
            return DEFAULT_POPULATE.to_vec();
        }

        let mut tags: Vec<TagId> = Vec::with_capacity(self.populate.len());
        for id in &self.populate {
            if !tags.contains(id) {
                tags.push(*id);
            }
        }
        tags
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        Self::from_json(&json).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
