//! Client for the motorinci motorcycle catalog backend.
//!
//! [`ApiClient`] talks to the REST backend with a bearer token it manages
//! itself, and the [`catalog`] types map every collection the backend
//! exposes. [`list::ListController`] drives an admin list screen on top of
//! it: paged loading, long-press selection and bulk delete.
//!
//! ```no_run
//! use motorinci::{catalog::{Brand, ListQuery}, ApiClient, Config, MemoryTokenStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), motorinci::ApiError> {
//! let config = Config::from_env()?;
//! let client = ApiClient::from_config(&config, Arc::new(MemoryTokenStore::new()))?;
//! let brands = client.list::<Brand>(&ListQuery::new(), None).await?;
//! println!("{:#?}", brands.data);
//! # Ok(())
//! # }
//! ```

pub mod abort;
pub mod calculator;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod list;
pub mod session;

use header::{HeaderMap, HeaderValue};
use reqwest::header;

pub use abort::{AbortController, AbortSignal};
pub use client::{ApiClient, ApiRequest, HttpTransport, Transport};
pub use config::{Config, Credentials};
pub use error::ApiError;
pub use session::{AuthSession, FileTokenStore, MemoryTokenStore, TokenStore};

/// Builds the default headers for the client.
fn build_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_static(concat!("motorinci/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}
