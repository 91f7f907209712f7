//! Store traits consumed by the seed pipeline.

use async_trait::async_trait;

use menuseed_proto::{BucketRef, Fields, FileId, FileUpload, RemoteFile, RemoteRow, RowId, TableRef};

use crate::error::Error;

/// Row operations on named tables.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// List every row in a table.
    async fn list_rows(&self, table: &TableRef) -> Result<Vec<RemoteRow>, Error>;

    /// Create a row and return it with its assigned identifier.
    async fn create_row(&self, table: &TableRef, id: RowId, fields: Fields)
        -> Result<RemoteRow, Error>;

    /// Delete a row by identifier.
    async fn delete_row(&self, table: &TableRef, id: &str) -> Result<(), Error>;
}

/// File operations on named buckets.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// List every file in a bucket.
    async fn list_files(&self, bucket: &BucketRef) -> Result<Vec<RemoteFile>, Error>;

    /// Upload a file and return it with its assigned identifier.
    async fn create_file(
        &self,
        bucket: &BucketRef,
        id: FileId,
        upload: FileUpload,
    ) -> Result<RemoteFile, Error>;

    /// Delete a file by identifier.
    async fn delete_file(&self, bucket: &BucketRef, id: &str) -> Result<(), Error>;

    /// URL under which a stored file can be viewed.
    fn file_view_url(&self, bucket: &BucketRef, id: &str) -> String;
}

/// A store providing both rows and files.
pub trait CatalogStore: RowStore + BlobStore {}

impl<T: RowStore + BlobStore + ?Sized> CatalogStore for T {}
