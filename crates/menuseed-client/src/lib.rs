//! menuseed client - row and blob store access for the catalog pipeline.
//!
//! The pipeline talks to the remote catalog only through the [`RowStore`] and
//! [`BlobStore`] traits. Two implementations ship with this crate:
//!
//! - [`HttpCatalogClient`] for an Appwrite-compatible REST backend
//! - [`MemoryCatalog`] for dry runs and tests
//!
//! # Quick Start
//!
//! ```ignore
//! use menuseed_client::{ClientConfig, HttpCatalogClient, RowStore};
//! use menuseed_proto::TableRef;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("https://cloud.appwrite.io/v1", "my-project", "my-database")
//!         .with_api_key(std::env::var("APPWRITE_API_KEY")?);
//!     let client = HttpCatalogClient::new(config)?;
//!
//!     let rows = client.list_rows(&TableRef::new("categories")).await?;
//!     println!("Found {} categories", rows.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod store;

pub use client::HttpCatalogClient;
pub use config::ClientConfig;
pub use error::Error;
pub use memory::MemoryCatalog;
pub use store::{BlobStore, CatalogStore, RowStore};

/// Re-export protocol types.
pub use menuseed_proto as proto;
