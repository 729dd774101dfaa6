//! `ise-http` is an async HTTP client for the Cisco ISE ERS REST API.
//!
//! Requests are sent with basic authentication and JSON headers, and
//! transient failures (connection errors, unreadable bodies, statuses 408
//! and 502-504) are retried with jittered exponential backoff. Responses
//! come back as a [`Document`] queried with dot-paths:
//!
//! ```no_run
//! # async fn run() -> ise_http::Result<()> {
//! use ise_http::IseClient;
//!
//! let client = IseClient::new("https://10.0.0.1:9060", "admin", "secret")?;
//! let res = client.get("/ers/config/internaluser").await?;
//! for name in res.get("SearchResult.resources.#.name").array() {
//!     println!("{}", name.str());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Entry points:
//! - [`IseClient::get`], [`IseClient::post`], [`IseClient::put`],
//!   [`IseClient::delete`]
//! - [`IseClient::execute`] for requests built with [`IseClient::request`]
//! - [`Body`] for building request payloads

mod backoff;
mod body;
mod client;
mod document;
mod error;
mod options;
mod path;
mod request;

pub use backoff::{should_retry, BackoffPolicy};
pub use body::Body;
pub use client::{is_retryable_status, join_url, IseClient, ERROR_MESSAGE_PATH};
pub use document::{Document, Value};
pub use error::IseError;
pub use options::{ClientBuilder, ClientOptions};
pub use request::Request;
pub use reqwest::{header, Method};

pub type Result<T> = std::result::Result<T, IseError>;
