//! Seed pipeline error types.

use std::path::PathBuf;

use menuseed_proto::{BucketRef, TableRef};
use thiserror::Error;

use crate::seed::Phase;

/// Errors that abort a seed run.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Clearing the existing catalog failed.
    #[error("reset failed: {0}")]
    Reset(#[from] ResetError),

    /// Creating a row failed.
    #[error("{phase}: failed to create row for {name:?} in table {table}: {source}")]
    RowCreate {
        /// Phase in which the failure occurred.
        phase: Phase,
        /// Table the row was destined for.
        table: TableRef,
        /// Name of the offending dataset entity.
        name: String,
        /// Underlying store error.
        #[source]
        source: menuseed_client::Error,
    },
}

impl SeedError {
    /// Phase in which the run aborted.
    pub fn phase(&self) -> Phase {
        match self {
            SeedError::Reset(_) => Phase::Reset,
            SeedError::RowCreate { phase, .. } => *phase,
        }
    }
}

/// Errors raised while clearing the catalog.
#[derive(Debug, Error)]
pub enum ResetError {
    /// Listing the rows of a table failed.
    #[error("failed to list rows of table {table}: {source}")]
    ListRows {
        table: TableRef,
        #[source]
        source: menuseed_client::Error,
    },

    /// A row could not be deleted within the retry budget.
    #[error("failed to delete row {id} of table {table} after {attempts} attempts: {source}")]
    DeleteRow {
        table: TableRef,
        id: String,
        attempts: usize,
        #[source]
        source: menuseed_client::Error,
    },

    /// Listing the files of a bucket failed.
    #[error("failed to list files of bucket {bucket}: {source}")]
    ListFiles {
        bucket: BucketRef,
        #[source]
        source: menuseed_client::Error,
    },

    /// A file could not be deleted within the retry budget.
    #[error("failed to delete file {id} of bucket {bucket} after {attempts} attempts: {source}")]
    DeleteFile {
        bucket: BucketRef,
        id: String,
        attempts: usize,
        #[source]
        source: menuseed_client::Error,
    },
}

/// Reasons an image kept its source URL.
///
/// These never escape the pipeline; they are logged and counted.
#[derive(Debug, Error)]
pub enum AssetMigrationError {
    /// The source could not be reached.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The source answered with a non-success status.
    #[error("fetch returned status {0}")]
    Status(u16),

    /// The blob store rejected the upload.
    #[error("upload failed: {0}")]
    Upload(#[source] menuseed_client::Error),

    /// Image migration is turned off.
    #[error("image migration disabled")]
    Disabled,
}

/// Errors raised while loading or validating a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be read.
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset is not valid JSON of the expected shape.
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// An entity has an empty name.
    #[error("{kind} #{index} has an empty name")]
    EmptyName {
        /// Entity kind ("category", "customization" or "menu item").
        kind: &'static str,
        /// Position in the dataset.
        index: usize,
    },

    /// Two entities of the same kind share a name.
    #[error("duplicate {kind} name {name:?}")]
    DuplicateName { kind: &'static str, name: String },

    /// A numeric field is negative or not finite.
    #[error("{kind} {name:?} has invalid {field}: {value}")]
    InvalidNumber {
        kind: &'static str,
        name: String,
        field: &'static str,
        value: f64,
    },
}
