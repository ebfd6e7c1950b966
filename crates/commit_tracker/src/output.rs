//! CSV output: one commit file per item plus a failure ledger.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::platform::{CommitRecord, Platform};

/// Column order of every commit file.
pub const COMMIT_HEADER: [&str; 5] = ["item_name", "date", "message", "sha", "author"];

/// Column order of the failure ledger.
pub const FAILURE_HEADER: [&str; 4] = ["item_name", "platform", "repository", "error"];

/// Subdirectory of the output directory holding the failure ledger.
///
/// Kept apart from the commit files so no item name can collide with it.
pub const FAILURE_LEDGER_DIR: &str = "errors";

/// File name of the failure ledger inside [`FAILURE_LEDGER_DIR`].
pub const FAILURE_LEDGER_FILE: &str = "errors.csv";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl OutputError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Turn an item name into a safe file stem.
///
/// Path separators, characters Windows rejects, and control characters
/// become `_`. Names that would resolve to the directory itself are replaced.
pub fn sanitize_file_name(item_name: &str) -> String {
    let cleaned: String = item_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Path of the failure ledger for a run writing to `output_dir`.
pub fn failure_ledger_path(output_dir: &Path) -> PathBuf {
    output_dir.join(FAILURE_LEDGER_DIR).join(FAILURE_LEDGER_FILE)
}

/// Path of the commit file for `item_name` inside `output_dir`.
pub fn commit_file_path(output_dir: &Path, item_name: &str) -> PathBuf {
    output_dir.join(format!("{}.csv", sanitize_file_name(item_name)))
}

/// Write `records` to `<output_dir>/<item_name>.csv`, replacing any old file.
///
/// The file is written to a temporary file in the same directory and renamed
/// into place, so readers never see a partial file. Zero records still
/// produce a file with just the header.
pub fn write_commits(
    output_dir: &Path,
    item_name: &str,
    records: &[CommitRecord],
) -> Result<PathBuf, OutputError> {
    std::fs::create_dir_all(output_dir).map_err(|e| OutputError::io(output_dir, e))?;
    let path = commit_file_path(output_dir, item_name);

    let mut tmp = NamedTempFile::new_in(output_dir).map_err(|e| OutputError::io(output_dir, e))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut tmp);
        writer
            .write_record(COMMIT_HEADER)
            .map_err(|e| OutputError::csv(&path, e))?;
        for record in records {
            writer
                .serialize(record)
                .map_err(|e| OutputError::csv(&path, e))?;
        }
        writer.flush().map_err(|e| OutputError::io(&path, e))?;
    }

    tmp.persist(&path)
        .map_err(|e| OutputError::io(&path, e.error))?;
    info!(path = %path.display(), records = records.len(), "Wrote commit file");
    Ok(path)
}

/// One row of the failure ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub item_name: String,
    pub platform: Platform,
    /// The roster cell as written.
    pub repository: String,
    pub error: String,
}

/// Append-only CSV of rows that could not be fetched.
#[derive(Debug, Clone)]
pub struct FailureLedger {
    path: PathBuf,
}

impl FailureLedger {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: failure_ledger_path(output_dir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a failure, writing the header first if the ledger is new.
    pub fn record(&self, failure: &FailureRecord) -> Result<(), OutputError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| OutputError::io(&self.path, e))?;
        let is_new = file
            .metadata()
            .map_err(|e| OutputError::io(&self.path, e))?
            .len()
            == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer
                .write_record(FAILURE_HEADER)
                .map_err(|e| OutputError::csv(&self.path, e))?;
        }
        writer
            .serialize(failure)
            .map_err(|e| OutputError::csv(&self.path, e))?;
        writer
            .flush()
            .map_err(|e| OutputError::io(&self.path, e))?;

        debug!(path = %self.path.display(), item = %failure.item_name, "Recorded failure");
        Ok(())
    }
}
