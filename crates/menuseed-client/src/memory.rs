//! In-memory catalog store.
//!
//! [`MemoryCatalog`] keeps tables and buckets in process. It backs dry runs and
//! lets tests inject failures into row creation, row deletion and uploads.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use uuid::Uuid;

use menuseed_proto::{BucketRef, Fields, FileId, FileUpload, RemoteFile, RemoteRow, RowId, TableRef};

use crate::error::Error;
use crate::store::{BlobStore, RowStore};

/// Default base used to build file view URLs.
pub const DEFAULT_VIEW_BASE: &str = "memory://catalog";

/// A stored file and its content.
#[derive(Debug, Clone)]
struct StoredFile {
    file: RemoteFile,
    data: Bytes,
}

/// Failures to inject into store operations.
#[derive(Debug, Default)]
struct FailurePlan {
    /// Row creations to reject, keyed by table and the row's `name` column.
    create_row: Vec<(TableRef, String)>,
    /// Remaining row creations to reject per table, whatever their columns.
    create_row_any: HashMap<TableRef, usize>,
    /// Remaining row deletions to reject per table.
    delete_row: HashMap<TableRef, usize>,
    /// Remaining file deletions to reject.
    delete_file: usize,
    /// Remaining uploads to reject.
    create_file: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<TableRef, Vec<RemoteRow>>,
    buckets: HashMap<BucketRef, Vec<StoredFile>>,
    failures: FailurePlan,
}

/// An in-process catalog store.
#[derive(Debug)]
pub struct MemoryCatalog {
    state: Mutex<MemoryState>,
    view_base: String,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            view_base: DEFAULT_VIEW_BASE.to_string(),
        }
    }

    /// Set the base used for file view URLs.
    pub fn with_view_base(mut self, base: impl Into<String>) -> Self {
        self.view_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Snapshot of the rows in a table, in creation order.
    pub fn rows(&self, table: &TableRef) -> Vec<RemoteRow> {
        self.state
            .lock()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of rows in a table.
    pub fn row_count(&self, table: &TableRef) -> usize {
        self.state.lock().tables.get(table).map_or(0, Vec::len)
    }

    /// Find a row by its `name` column.
    pub fn row_named(&self, table: &TableRef, name: &str) -> Option<RemoteRow> {
        self.state
            .lock()
            .tables
            .get(table)?
            .iter()
            .find(|row| row.get_str("name") == Some(name))
            .cloned()
    }

    /// Snapshot of the files in a bucket.
    pub fn files(&self, bucket: &BucketRef) -> Vec<RemoteFile> {
        self.state
            .lock()
            .buckets
            .get(bucket)
            .map(|files| files.iter().map(|stored| stored.file.clone()).collect())
            .unwrap_or_default()
    }

    /// Content of a stored file.
    pub fn file_data(&self, bucket: &BucketRef, id: &str) -> Option<Bytes> {
        self.state
            .lock()
            .buckets
            .get(bucket)?
            .iter()
            .find(|stored| stored.file.id == id)
            .map(|stored| stored.data.clone())
    }

    /// Insert a row directly, bypassing failure injection.
    pub fn insert_row(&self, table: &TableRef, fields: Fields) -> RemoteRow {
        let row = RemoteRow::new(generate_id(), fields);
        self.state
            .lock()
            .tables
            .entry(table.clone())
            .or_default()
            .push(row.clone());
        row
    }

    /// Insert a file directly, bypassing failure injection.
    pub fn insert_file(&self, bucket: &BucketRef, upload: FileUpload) -> RemoteFile {
        let stored = stored_file(generate_id(), upload);
        let file = stored.file.clone();
        self.state
            .lock()
            .buckets
            .entry(bucket.clone())
            .or_default()
            .push(stored);
        file
    }

    /// Reject creation of the row whose `name` column equals `name`.
    pub fn fail_row_create(&self, table: &TableRef, name: impl Into<String>) {
        self.state
            .lock()
            .failures
            .create_row
            .push((table.clone(), name.into()));
    }

    /// Reject the next `times` row creations in a table.
    pub fn fail_row_creates(&self, table: &TableRef, times: usize) {
        *self
            .state
            .lock()
            .failures
            .create_row_any
            .entry(table.clone())
            .or_default() += times;
    }

    /// Reject the next `times` row deletions in a table.
    pub fn fail_row_deletes(&self, table: &TableRef, times: usize) {
        *self
            .state
            .lock()
            .failures
            .delete_row
            .entry(table.clone())
            .or_default() += times;
    }

    /// Reject the next `times` file deletions.
    pub fn fail_file_deletes(&self, times: usize) {
        self.state.lock().failures.delete_file += times;
    }

    /// Reject the next `times` uploads.
    pub fn fail_file_uploads(&self, times: usize) {
        self.state.lock().failures.create_file += times;
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowStore for MemoryCatalog {
    async fn list_rows(&self, table: &TableRef) -> Result<Vec<RemoteRow>, Error> {
        Ok(self.rows(table))
    }

    async fn create_row(
        &self,
        table: &TableRef,
        id: RowId,
        fields: Fields,
    ) -> Result<RemoteRow, Error> {
        let mut state = self.state.lock();

        let name = fields.get("name").and_then(|value| value.as_str());
        let rejected = state
            .failures
            .create_row
            .iter()
            .any(|(failing, failing_name)| failing == table && Some(failing_name.as_str()) == name);
        if rejected {
            return Err(Error::Injected(format!(
                "create row {:?} in table {}",
                name.unwrap_or_default(),
                table
            )));
        }
        if let Some(remaining) = state.failures.create_row_any.get_mut(table) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Injected(format!("create row in table {}", table)));
            }
        }

        let rows = state.tables.entry(table.clone()).or_default();
        let id = match id {
            RowId::Unique => generate_id(),
            RowId::Custom(id) => {
                if rows.iter().any(|row| row.id == id) {
                    return Err(Error::Conflict(format!("row {} already exists", id)));
                }
                id
            }
        };

        let row = RemoteRow::new(id, fields);
        rows.push(row.clone());
        Ok(row)
    }

    async fn delete_row(&self, table: &TableRef, id: &str) -> Result<(), Error> {
        let mut state = self.state.lock();

        if let Some(remaining) = state.failures.delete_row.get_mut(table) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Injected(format!("delete row {} in table {}", id, table)));
            }
        }

        let rows = state
            .tables
            .get_mut(table)
            .ok_or_else(|| Error::NotFound(format!("table {}", table)))?;
        let position = rows
            .iter()
            .position(|row| row.id == id)
            .ok_or_else(|| Error::NotFound(format!("row {}", id)))?;
        rows.remove(position);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryCatalog {
    async fn list_files(&self, bucket: &BucketRef) -> Result<Vec<RemoteFile>, Error> {
        Ok(self.files(bucket))
    }

    async fn create_file(
        &self,
        bucket: &BucketRef,
        id: FileId,
        upload: FileUpload,
    ) -> Result<RemoteFile, Error> {
        let mut state = self.state.lock();

        if state.failures.create_file > 0 {
            state.failures.create_file -= 1;
            return Err(Error::Injected(format!("upload {}", upload.name)));
        }

        let files = state.buckets.entry(bucket.clone()).or_default();
        let id = match id {
            FileId::Unique => generate_id(),
            FileId::Custom(id) => {
                if files.iter().any(|stored| stored.file.id == id) {
                    return Err(Error::Conflict(format!("file {} already exists", id)));
                }
                id
            }
        };

        let stored = stored_file(id, upload);
        let file = stored.file.clone();
        files.push(stored);
        Ok(file)
    }

    async fn delete_file(&self, bucket: &BucketRef, id: &str) -> Result<(), Error> {
        let mut state = self.state.lock();

        if state.failures.delete_file > 0 {
            state.failures.delete_file -= 1;
            return Err(Error::Injected(format!("delete file {}", id)));
        }

        let files = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::NotFound(format!("bucket {}", bucket)))?;
        let position = files
            .iter()
            .position(|stored| stored.file.id == id)
            .ok_or_else(|| Error::NotFound(format!("file {}", id)))?;
        files.remove(position);
        Ok(())
    }

    fn file_view_url(&self, bucket: &BucketRef, id: &str) -> String {
        format!("{}/buckets/{}/files/{}/view", self.view_base, bucket, id)
    }
}

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn stored_file(id: String, upload: FileUpload) -> StoredFile {
    StoredFile {
        file: RemoteFile {
            id,
            name: upload.name,
            mime_type: upload.content_type,
            size: upload.data.len() as u64,
        },
        data: upload.data,
    }
}
