//! menuseed core - catalog reset, asset migration and seed orchestration.
//!
//! A [`Seeder`] replaces the contents of a remote catalog with a [`Dataset`](proto::Dataset):
//!
//! 1. [`CatalogReset`] empties the catalog tables and the asset bucket.
//! 2. Categories and customizations are created, recording the identifiers
//!    the store assigns to each name.
//! 3. Menu items are created with their images copied into the bucket by the
//!    [`AssetMigrator`], then linked to their customizations.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use menuseed_client::MemoryCatalog;
//! use menuseed_core::{sample_dataset, HttpFetcher, SeedConfig, Seeder};
//!
//! let store = Arc::new(MemoryCatalog::new());
//! let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(30))?);
//! let seeder = Seeder::new(store, fetcher, sample_dataset()?, SeedConfig::default());
//! let summary = seeder.run().await?;
//! ```

pub mod asset;
pub mod config;
pub mod dataset;
pub mod error;
pub mod reset;
pub mod seed;

pub use asset::{AssetFetcher, AssetMigration, AssetMigrator, FetchedAsset, HttpFetcher};
pub use config::{CatalogTables, ResetConfig, SeedConfig};
pub use dataset::{dangling_references, load_dataset, parse_dataset, sample_dataset, DanglingReference};
pub use error::{AssetMigrationError, DatasetError, ResetError, SeedError};
pub use reset::{CatalogReset, ResetSummary};
pub use seed::{Phase, SeedSummary, Seeder};

/// Re-export protocol types.
pub use menuseed_proto as proto;
