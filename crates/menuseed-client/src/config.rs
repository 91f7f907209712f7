//! Client configuration.

use std::time::Duration;

/// Default Appwrite Cloud endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of rows or files requested per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API endpoint including the version path (e.g., "https://cloud.appwrite.io/v1").
    pub endpoint: String,

    /// Project identifier sent with every request.
    pub project_id: String,

    /// Server API key. Seeding needs write access to tables and buckets.
    pub api_key: Option<String>,

    /// Database holding the catalog tables.
    pub database_id: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Page size used when listing rows and files.
    pub page_size: usize,
}

impl ClientConfig {
    /// Create a new client configuration.
    pub fn new(
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            api_key: None,
            database_id: database_id.into(),
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the listing page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}
