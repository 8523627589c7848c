//! # Native Bridge Implementations
//!
//! Default implementations of bridge traits for server and desktop hosts.
//!
//! - `HttpClient` using `reqwest` with rustls
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_native::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::with_timeout(Duration::from_secs(10))?);
//! ```

mod http;

pub use http::ReqwestHttpClient;
