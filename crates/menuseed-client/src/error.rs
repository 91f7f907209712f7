//! Client error types.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure or undecodable response.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("server error {code}: {message}")]
    Server { code: u16, message: String },

    /// The addressed row, file, table or bucket does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A row or file with the requested identifier already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Failure injected into a [`MemoryCatalog`](crate::MemoryCatalog).
    #[error("injected failure: {0}")]
    Injected(String),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Map a non-success HTTP status and message to an error.
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            404 => Error::NotFound(message),
            409 => Error::Conflict(message),
            _ => Error::Server { code, message },
        }
    }
}
