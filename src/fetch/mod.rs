//! Network collaborator
//!
//! The pipeline's only suspension points are the two container fetches. The
//! [`ContainerFetcher`] trait keeps that surface narrow and mockable;
//! [`HttpFetcher`] is the production implementation, locating the container
//! through an Omaha update check before downloading it.

mod http;
mod omaha;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpFetcher;

/// Transport-level errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error status {0} from {1}")]
    Status(reqwest::StatusCode, String),

    #[error("update check gave no usable download URL: {0}")]
    UpdateCheck(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("update response is not valid XML: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("timeout while fetching container")]
    Timeout,
}

/// Convenient Result type alias
pub type FetchResult<T> = Result<T, FetchError>;

/// Obtains raw signed-container bytes for the update pipeline.
#[async_trait]
pub trait ContainerFetcher: Send + Sync {
    /// Download the complete signed container.
    async fn fetch_full_container(&self) -> FetchResult<Vec<u8>>;

    /// Download at most `max_bytes` from the start of the container, enough
    /// for the container framing plus the snapshot's header prefix.
    async fn fetch_partial_container(&self, max_bytes: usize) -> FetchResult<Vec<u8>>;
}
