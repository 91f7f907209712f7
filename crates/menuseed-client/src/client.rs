//! HTTP catalog client.
//!
//! This module provides [`HttpCatalogClient`], which speaks the Appwrite REST
//! API for tables and storage buckets.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use menuseed_proto::{BucketRef, Fields, FileId, FileUpload, RemoteFile, RemoteRow, RowId, TableRef};

use crate::config::ClientConfig;
use crate::error::Error;
use crate::store::{BlobStore, RowStore};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";

/// A client for an Appwrite-compatible catalog backend.
///
/// # Example
///
/// ```ignore
/// use menuseed_client::{ClientConfig, HttpCatalogClient, BlobStore};
/// use menuseed_proto::BucketRef;
///
/// let client = HttpCatalogClient::new(ClientConfig::new(endpoint, project, database))?;
/// let url = client.file_view_url(&BucketRef::new("assets"), "file-id");
/// ```
pub struct HttpCatalogClient {
    http: reqwest::Client,
    config: ClientConfig,
}

/// One page of a row listing.
#[derive(Debug, Deserialize)]
struct RowPage {
    total: usize,
    rows: Vec<RemoteRow>,
}

/// One page of a file listing.
#[derive(Debug, Deserialize)]
struct FilePage {
    total: usize,
    files: Vec<RemoteFile>,
}

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpCatalogClient {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(PROJECT_HEADER, header_value(&config.project_id)?);
        if let Some(key) = &config.api_key {
            let mut value = header_value(key)?;
            value.set_sensitive(true);
            headers.insert(KEY_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn rows_url(&self, table: &TableRef) -> String {
        format!(
            "{}/tablesdb/{}/tables/{}/rows",
            self.config.endpoint,
            self.config.database_id,
            table.id()
        )
    }

    fn files_url(&self, bucket: &BucketRef) -> String {
        format!("{}/storage/buckets/{}/files", self.config.endpoint, bucket.id())
    }

    /// Query parameters selecting one page of a listing.
    fn page_queries(&self, offset: usize) -> Vec<(&'static str, String)> {
        vec![
            (
                "queries[]",
                json!({"method": "limit", "values": [self.config.page_size]}).to_string(),
            ),
            (
                "queries[]",
                json!({"method": "offset", "values": [offset]}).to_string(),
            ),
        ]
    }

    /// Decode a JSON response, converting error statuses.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Convert error statuses, discarding a successful body.
    async fn handle_empty(response: Response) -> Result<(), Error> {
        Self::check_status(response).await.map(|_| ())
    }

    async fn check_status(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status.as_u16(), body))
    }
}

/// Items of a paged listing, accumulated page by page.
#[derive(Debug)]
struct Listing<T> {
    items: Vec<T>,
}

impl<T> Listing<T> {
    fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Offset of the next page.
    fn offset(&self) -> usize {
        self.items.len()
    }

    /// Append a page. Returns `true` once the listing is complete: the
    /// reported total is reached or the backend returned an empty page.
    fn push(&mut self, page: Vec<T>, total: usize) -> bool {
        let fetched = page.len();
        self.items.extend(page);
        fetched == 0 || self.items.len() >= total
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Map an error response to an [`Error`], preferring the body's `message`.
fn error_from_body(code: u16, body: String) -> Error {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|error| error.message)
        .unwrap_or(body);
    Error::from_status(code, message)
}

#[async_trait]
impl RowStore for HttpCatalogClient {
    async fn list_rows(&self, table: &TableRef) -> Result<Vec<RemoteRow>, Error> {
        let url = self.rows_url(table);
        let mut rows: Listing<RemoteRow> = Listing::new();

        loop {
            let response = self
                .http
                .get(&url)
                .query(&self.page_queries(rows.offset()))
                .send()
                .await?;
            let page: RowPage = Self::handle_response(response).await?;
            let total = page.total;
            let fetched = page.rows.len();

            debug!(table = %table, fetched, total, "listed rows page");
            if rows.push(page.rows, total) {
                break;
            }
        }

        Ok(rows.into_items())
    }

    async fn create_row(
        &self,
        table: &TableRef,
        id: RowId,
        fields: Fields,
    ) -> Result<RemoteRow, Error> {
        let body = json!({
            "rowId": id.as_wire(),
            "data": fields,
        });

        let response = self.http.post(self.rows_url(table)).json(&body).send().await?;
        Self::handle_response(response).await
    }

    async fn delete_row(&self, table: &TableRef, id: &str) -> Result<(), Error> {
        let url = format!("{}/{}", self.rows_url(table), id);
        let response = self.http.delete(url).send().await?;
        Self::handle_empty(response).await
    }
}

#[async_trait]
impl BlobStore for HttpCatalogClient {
    async fn list_files(&self, bucket: &BucketRef) -> Result<Vec<RemoteFile>, Error> {
        let url = self.files_url(bucket);
        let mut files: Listing<RemoteFile> = Listing::new();

        loop {
            let response = self
                .http
                .get(&url)
                .query(&self.page_queries(files.offset()))
                .send()
                .await?;
            let page: FilePage = Self::handle_response(response).await?;
            let total = page.total;
            let fetched = page.files.len();

            debug!(bucket = %bucket, fetched, total, "listed files page");
            if files.push(page.files, total) {
                break;
            }
        }

        Ok(files.into_items())
    }

    async fn create_file(
        &self,
        bucket: &BucketRef,
        id: FileId,
        upload: FileUpload,
    ) -> Result<RemoteFile, Error> {
        let part = Part::bytes(upload.data.to_vec())
            .file_name(upload.name)
            .mime_str(&upload.content_type)?;
        let form = Form::new()
            .text("fileId", id.as_wire().to_string())
            .part("file", part);

        let response = self
            .http
            .post(self.files_url(bucket))
            .multipart(form)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn delete_file(&self, bucket: &BucketRef, id: &str) -> Result<(), Error> {
        let url = format!("{}/{}", self.files_url(bucket), id);
        let response = self.http.delete(url).send().await?;
        Self::handle_empty(response).await
    }

    fn file_view_url(&self, bucket: &BucketRef, id: &str) -> String {
        format!(
            "{}/{}/view?project={}",
            self.files_url(bucket),
            id,
            self.config.project_id
        )
    }
}

impl std::fmt::Debug for HttpCatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalogClient")
            .field("endpoint", &self.config.endpoint)
            .field("project_id", &self.config.project_id)
            .field("database_id", &self.config.database_id)
            .finish()
    }
}

fn header_value(value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::Config(format!("invalid header value: {}", e)))
}
