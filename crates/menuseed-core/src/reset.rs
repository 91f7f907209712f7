//! Catalog reset.
//!
//! Clears every row of the catalog tables and every file of the asset bucket
//! before a seed run populates them again. Deletions within one table (or the
//! bucket) run concurrently up to [`ResetConfig::concurrency`] and are joined
//! before the next table starts.

use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use menuseed_client::{BlobStore, CatalogStore, RowStore};
use menuseed_proto::{BucketRef, TableRef};

use crate::config::ResetConfig;
use crate::error::ResetError;

/// Counts of what a reset removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetSummary {
    pub rows_deleted: usize,
    pub files_deleted: usize,
}

/// Clears tables and buckets.
pub struct CatalogReset<'a> {
    store: &'a dyn CatalogStore,
    config: &'a ResetConfig,
}

impl<'a> CatalogReset<'a> {
    /// Create a reset over `store`.
    pub fn new(store: &'a dyn CatalogStore, config: &'a ResetConfig) -> Self {
        Self { store, config }
    }

    /// Clear every table in `tables`, one at a time, then the bucket.
    pub async fn reset(
        &self,
        tables: &[TableRef],
        bucket: &BucketRef,
    ) -> Result<ResetSummary, ResetError> {
        let mut summary = ResetSummary::default();
        for table in tables {
            summary.rows_deleted += self.clear_table(table).await?;
        }
        summary.files_deleted = self.clear_bucket(bucket).await?;
        Ok(summary)
    }

    /// Delete every row of a table. Returns the number of rows deleted.
    pub async fn clear_table(&self, table: &TableRef) -> Result<usize, ResetError> {
        let rows = self
            .store
            .list_rows(table)
            .await
            .map_err(|source| ResetError::ListRows {
                table: table.clone(),
                source,
            })?;
        let total = rows.len();

        let results: Vec<Result<(), ResetError>> = stream::iter(rows)
            .map(|row| async move {
                retry(self.config, || self.store.delete_row(table, &row.id))
                    .await
                    .map_err(|(attempts, source)| ResetError::DeleteRow {
                        table: table.clone(),
                        id: row.id.clone(),
                        attempts,
                        source,
                    })
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        first_failure(results)?;
        info!(table = %table, rows = total, "cleared table");
        Ok(total)
    }

    /// Delete every file of a bucket. Returns the number of files deleted.
    pub async fn clear_bucket(&self, bucket: &BucketRef) -> Result<usize, ResetError> {
        let files = self
            .store
            .list_files(bucket)
            .await
            .map_err(|source| ResetError::ListFiles {
                bucket: bucket.clone(),
                source,
            })?;
        let total = files.len();

        let results: Vec<Result<(), ResetError>> = stream::iter(files)
            .map(|file| async move {
                retry(self.config, || self.store.delete_file(bucket, &file.id))
                    .await
                    .map_err(|(attempts, source)| ResetError::DeleteFile {
                        bucket: bucket.clone(),
                        id: file.id.clone(),
                        attempts,
                        source,
                    })
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        first_failure(results)?;
        info!(bucket = %bucket, files = total, "cleared bucket");
        Ok(total)
    }
}

/// Run a deletion until it succeeds or the retry budget is spent.
///
/// A deletion reporting the target as already gone counts as success. On
/// failure returns the number of attempts made and the last error.
async fn retry<F, Fut>(config: &ResetConfig, mut delete: F) -> Result<(), (usize, menuseed_client::Error)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), menuseed_client::Error>>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match delete().await {
            Ok(()) => return Ok(()),
            Err(menuseed_client::Error::NotFound(what)) => {
                debug!(what = %what, "already deleted");
                return Ok(());
            }
            Err(e) if attempts <= config.retries => {
                warn!(attempt = attempts, error = %e, "delete failed, retrying");
                tokio::time::sleep(config.backoff).await;
            }
            Err(e) => return Err((attempts, e)),
        }
    }
}

fn first_failure(results: Vec<Result<(), ResetError>>) -> Result<(), ResetError> {
    let mut failures = results.into_iter().filter_map(Result::err);
    match failures.next() {
        Some(first) => {
            let others = failures.count();
            if others > 0 {
                warn!(others, "additional deletions failed");
            }
            Err(first)
        }
        None => Ok(()),
    }
}
