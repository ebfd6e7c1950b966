//! Roster CSV reading.
//!
//! The roster has one row per tracked item: an `item_name` column plus one
//! column per platform. Header names are matched case-insensitively and
//! unknown columns are ignored.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{debug, warn};

use crate::platform::Platform;

/// Column every roster must have.
pub const ITEM_NAME_COLUMN: &str = "item_name";

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Cannot open roster {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed roster: {0}")]
    Csv(#[from] csv::Error),

    #[error("Roster has no {column:?} column")]
    MissingColumn { column: &'static str },
}

/// One roster row. Blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    /// 1-indexed data row number (the header is row 0).
    #[serde(skip)]
    pub row: usize,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub item_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub github: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub gist: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub gitlab: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub bitbucket: Option<String>,
    /// Why the row could not be decoded. Such rows carry no cells.
    #[serde(skip)]
    pub unreadable: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

impl RosterEntry {
    /// The cell for `platform`, if filled.
    #[must_use]
    pub fn field(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::GitHub => self.github.as_deref(),
            Platform::Gist => self.gist.as_deref(),
            Platform::GitLab => self.gitlab.as_deref(),
            Platform::Bitbucket => self.bitbucket.as_deref(),
        }
    }

    /// Every filled platform cell, in resolution order.
    #[must_use]
    pub fn targets(&self) -> Vec<(Platform, &str)> {
        Platform::PRIORITY
            .iter()
            .filter_map(|p| self.field(*p).map(|value| (*p, value)))
            .collect()
    }

    /// The platform cell that decides where this item is fetched from.
    #[must_use]
    pub fn target(&self) -> Option<(Platform, &str)> {
        self.targets().into_iter().next()
    }
}

/// Read a roster file.
pub fn read_roster(path: &Path) -> Result<Vec<RosterEntry>, RosterError> {
    let file = std::fs::File::open(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_roster_from(file)
}

/// Read a roster from any CSV source.
///
/// A row that cannot be decoded (bad UTF-8, an unparseable cell) is kept as
/// an entry with `unreadable` set, so the run can skip it and carry on. Only
/// I/O errors and a bad header fail the whole read.
pub fn read_roster_from<R: Read>(source: R) -> Result<Vec<RosterEntry>, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers: csv::StringRecord = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    if !headers.iter().any(|h| h == ITEM_NAME_COLUMN) {
        return Err(RosterError::MissingColumn {
            column: ITEM_NAME_COLUMN,
        });
    }

    let ignored: Vec<&str> = headers
        .iter()
        .filter(|h| *h != ITEM_NAME_COLUMN && h.parse::<Platform>().is_err())
        .collect();
    if !ignored.is_empty() {
        debug!(columns = ?ignored, "Ignoring extra roster columns");
    }
    reader.set_headers(headers.clone());

    let mut entries = Vec::new();
    for (index, record) in reader.deserialize::<RosterEntry>().enumerate() {
        let row = index + 1;
        let entry = match record {
            Ok(entry) => RosterEntry { row, ..entry },
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!(row, error = %e, "Unreadable roster row");
                RosterEntry {
                    row,
                    unreadable: Some(e.to_string()),
                    ..RosterEntry::default()
                }
            }
        };
        entries.push(entry);
    }

    Ok(entries)
}
