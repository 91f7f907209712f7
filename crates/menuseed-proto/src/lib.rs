//! menuseed protocol types.
//!
//! This crate defines the shapes shared by the rest of the workspace: the local
//! catalog dataset and the rows and files that live in the remote store.
//!
//! # Modules
//!
//! - [`dataset`] - Categories, customizations and menu items as authored locally
//! - [`row`] - Remote table rows and their field maps
//! - [`file`] - Remote blob-store files and uploads
//!
//! # Example
//!
//! ```ignore
//! use menuseed_proto::{Category, Dataset};
//!
//! let dataset = Dataset {
//!     categories: vec![Category::new("Burgers", "Stacked and grilled")],
//!     ..Dataset::default()
//! };
//! assert_eq!(dataset.categories.len(), 1);
//! ```

pub mod dataset;
pub mod file;
pub mod row;

// Re-export commonly used types at crate root
pub use dataset::{Category, Customization, CustomizationKind, Dataset, MenuItem};
pub use file::{BucketRef, FileId, FileUpload, RemoteFile};
pub use row::{Fields, RemoteRow, RowId, TableRef};

/// Content type assumed for uploaded assets when the source does not report one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";
