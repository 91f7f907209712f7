//! Remote blob-store files.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Reference to a blob-store bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketRef(String);

impl BucketRef {
    /// Create a bucket reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The store identifier of the bucket.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier requested when creating a file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FileId {
    #[default]
    Unique,
    Custom(String),
}

impl FileId {
    /// Wire form of the identifier.
    pub fn as_wire(&self) -> &str {
        match self {
            FileId::Unique => "unique()",
            FileId::Custom(id) => id,
        }
    }
}

/// A file as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(rename = "sizeOriginal", default)]
    pub size: u64,
}

/// Binary content to upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// File name stored alongside the content.
    pub name: String,
    /// MIME type of the content.
    pub content_type: String,
    pub data: Bytes,
}

impl FileUpload {
    /// Create an upload.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the content is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
