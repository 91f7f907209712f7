//! Seed pipeline configuration.

use std::time::Duration;

use menuseed_proto::{BucketRef, TableRef};

/// Default number of concurrent deletions while clearing a table or bucket.
pub const DEFAULT_DELETE_CONCURRENCY: usize = 8;

/// Default number of extra attempts for a failed deletion.
pub const DEFAULT_DELETE_RETRIES: usize = 2;

/// Default pause between deletion attempts.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Default column holding a menu item's rating.
pub const DEFAULT_RATING_COLUMN: &str = "rating";

/// Identifiers of the catalog tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTables {
    pub categories: TableRef,
    pub customizations: TableRef,
    pub menu: TableRef,
    /// Junction table linking menu items and customizations.
    pub menu_customizations: TableRef,
}

impl CatalogTables {
    /// All tables, in the order they are cleared.
    pub fn all(&self) -> Vec<TableRef> {
        vec![
            self.categories.clone(),
            self.customizations.clone(),
            self.menu.clone(),
            self.menu_customizations.clone(),
        ]
    }
}

impl Default for CatalogTables {
    fn default() -> Self {
        Self {
            categories: TableRef::new("categories"),
            customizations: TableRef::new("customizations"),
            menu: TableRef::new("menu"),
            menu_customizations: TableRef::new("menu_customizations"),
        }
    }
}

/// Catalog reset configuration.
#[derive(Debug, Clone)]
pub struct ResetConfig {
    /// Maximum deletions in flight at once.
    pub concurrency: usize,
    /// Extra attempts after a failed deletion.
    pub retries: usize,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl ResetConfig {
    /// Set the deletion concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the number of retries.
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Set the pause between attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_DELETE_CONCURRENCY,
            retries: DEFAULT_DELETE_RETRIES,
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

/// Seed run configuration.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Catalog tables.
    pub tables: CatalogTables,
    /// Bucket receiving migrated images.
    pub bucket: BucketRef,
    /// Reset behavior.
    pub reset: ResetConfig,
    /// Column the menu item rating is written to.
    pub rating_column: String,
    /// Whether images are copied into the bucket.
    pub migrate_images: bool,
}

impl SeedConfig {
    /// Create a configuration for the given tables and bucket.
    pub fn new(tables: CatalogTables, bucket: BucketRef) -> Self {
        Self {
            tables,
            bucket,
            reset: ResetConfig::default(),
            rating_column: DEFAULT_RATING_COLUMN.to_string(),
            migrate_images: true,
        }
    }

    /// Set the reset configuration.
    pub fn with_reset(mut self, reset: ResetConfig) -> Self {
        self.reset = reset;
        self
    }

    /// Set the rating column.
    pub fn with_rating_column(mut self, column: impl Into<String>) -> Self {
        self.rating_column = column.into();
        self
    }

    /// Keep source image URLs instead of copying images into the bucket.
    pub fn without_image_migration(mut self) -> Self {
        self.migrate_images = false;
        self
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self::new(CatalogTables::default(), BucketRef::new("assets"))
    }
}
