//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use menuseed_client::config::{DEFAULT_ENDPOINT, DEFAULT_PAGE_SIZE};
use menuseed_client::ClientConfig;
use menuseed_core::config::{
    DEFAULT_DELETE_CONCURRENCY, DEFAULT_DELETE_RETRIES, DEFAULT_RATING_COLUMN,
};
use menuseed_core::{CatalogTables, ResetConfig, SeedConfig};
use menuseed_proto::{BucketRef, TableRef};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default pause between deletion attempts in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "menuseed")]
#[command(version, about = "Replace a remote menu catalog with a dataset", long_about = None)]
pub struct Args {
    /// API endpoint of the catalog backend.
    #[arg(long, env = "APPWRITE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Project identifier.
    #[arg(long, env = "APPWRITE_PROJECT_ID")]
    pub project: Option<String>,

    /// API key.
    #[arg(long, env = "APPWRITE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Database holding the catalog tables.
    #[arg(long, env = "APPWRITE_DATABASE_ID")]
    pub database: Option<String>,

    /// Bucket receiving menu images.
    #[arg(long, env = "APPWRITE_BUCKET_ID", default_value = "assets")]
    pub bucket: String,

    /// Categories table.
    #[arg(long, env = "APPWRITE_CATEGORIES_TABLE_ID", default_value = "categories")]
    pub categories_table: String,

    /// Customizations table.
    #[arg(long, env = "APPWRITE_CUSTOMIZATIONS_TABLE_ID", default_value = "customizations")]
    pub customizations_table: String,

    /// Menu table.
    #[arg(long, env = "APPWRITE_MENU_TABLE_ID", default_value = "menu")]
    pub menu_table: String,

    /// Menu/customization junction table.
    #[arg(
        long,
        env = "APPWRITE_MENU_CUSTOMIZATIONS_TABLE_ID",
        default_value = "menu_customizations"
    )]
    pub menu_customizations_table: String,

    /// Dataset file. The bundled sample is used when omitted.
    #[arg(short, long)]
    pub dataset: Option<PathBuf>,

    /// Request timeout in seconds, for the backend and for image downloads.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Rows requested per page when listing.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Deletions in flight at once while clearing the catalog.
    #[arg(long, default_value_t = DEFAULT_DELETE_CONCURRENCY)]
    pub delete_concurrency: usize,

    /// Extra attempts for a failed deletion.
    #[arg(long, default_value_t = DEFAULT_DELETE_RETRIES)]
    pub delete_retries: usize,

    /// Pause (ms) between deletion attempts.
    #[arg(long, default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    pub retry_backoff_ms: u64,

    /// Column the menu item rating is written to.
    #[arg(long, default_value = DEFAULT_RATING_COLUMN)]
    pub rating_column: String,

    /// Keep source image URLs instead of copying images into the bucket.
    #[arg(long)]
    pub skip_images: bool,

    /// Seed an in-memory catalog instead of the backend.
    #[arg(long)]
    pub dry_run: bool,
}

/// Invalid argument combinations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A backend setting required outside dry runs is missing.
    #[error("--{flag} (or {env}) is required unless --dry-run is given")]
    Missing {
        flag: &'static str,
        env: &'static str,
    },
}

/// Resolved run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Backend connection. `None` for dry runs.
    pub client: Option<ClientConfig>,
    pub seed: SeedConfig,
    /// Dataset file, or `None` for the bundled sample.
    pub dataset: Option<PathBuf>,
    /// Timeout for image downloads.
    pub fetch_timeout: Duration,
}

impl Args {
    /// Convert command-line arguments to run configuration.
    pub fn into_config(self) -> Result<RunConfig, ConfigError> {
        let timeout = Duration::from_secs(self.timeout);

        let client = if self.dry_run {
            None
        } else {
            let project = self.project.ok_or(ConfigError::Missing {
                flag: "project",
                env: "APPWRITE_PROJECT_ID",
            })?;
            let database = self.database.ok_or(ConfigError::Missing {
                flag: "database",
                env: "APPWRITE_DATABASE_ID",
            })?;

            let mut client = ClientConfig::new(self.endpoint, project, database)
                .with_timeout(timeout)
                .with_page_size(self.page_size);
            if let Some(key) = self.api_key {
                client = client.with_api_key(key);
            }
            Some(client)
        };

        let tables = CatalogTables {
            categories: TableRef::new(self.categories_table),
            customizations: TableRef::new(self.customizations_table),
            menu: TableRef::new(self.menu_table),
            menu_customizations: TableRef::new(self.menu_customizations_table),
        };
        let reset = ResetConfig::default()
            .with_concurrency(self.delete_concurrency)
            .with_retries(self.delete_retries)
            .with_backoff(Duration::from_millis(self.retry_backoff_ms));

        let mut seed = SeedConfig::new(tables, BucketRef::new(self.bucket))
            .with_reset(reset)
            .with_rating_column(self.rating_column);
        if self.skip_images {
            seed = seed.without_image_migration();
        }

        Ok(RunConfig {
            client,
            seed,
            dataset: self.dataset,
            fetch_timeout: timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("menuseed").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_backend_config() {
        let config = parse(&[
            "--endpoint",
            "https://appwrite.test/v1/",
            "--project",
            "food",
            "--database",
            "catalog",
            "--api-key",
            "secret",
            "--timeout",
            "5",
        ])
        .into_config()
        .unwrap();

        let client = config.client.unwrap();
        assert_eq!(client.endpoint, "https://appwrite.test/v1");
        assert_eq!(client.project_id, "food");
        assert_eq!(client.database_id, "catalog");
        assert_eq!(client.api_key.as_deref(), Some("secret"));
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert!(config.dataset.is_none());
    }

    #[test]
    fn test_seed_options() {
        let config = parse(&[
            "--dry-run",
            "--menu-table",
            "dishes",
            "--bucket",
            "images",
            "--delete-concurrency",
            "0",
            "--delete-retries",
            "4",
            "--retry-backoff-ms",
            "10",
            "--rating-column",
            "ration",
            "--skip-images",
            "--dataset",
            "menu.json",
        ])
        .into_config()
        .unwrap();

        assert!(config.client.is_none());
        let seed = config.seed;
        assert_eq!(seed.tables.menu.id(), "dishes");
        assert_eq!(seed.tables.categories.id(), "categories");
        assert_eq!(seed.bucket.id(), "images");
        assert_eq!(seed.reset.concurrency, 1);
        assert_eq!(seed.reset.retries, 4);
        assert_eq!(seed.reset.backoff, Duration::from_millis(10));
        assert_eq!(seed.rating_column, "ration");
        assert!(!seed.migrate_images);
        assert_eq!(config.dataset, Some(PathBuf::from("menu.json")));
    }

    #[test]
    fn test_missing_database_rejected() {
        let err = parse(&["--project", "food"])
            .into_config()
            .map(|_| ())
            .unwrap_err();
        assert!(err.to_string().contains("--database"));
    }
}
