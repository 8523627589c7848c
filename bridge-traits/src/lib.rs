//! # Host Bridge Traits
//!
//! Capability seams between the catalog core and the host it runs in.
//!
//! The core never talks to the network directly. It receives an
//! [`HttpClient`](http::HttpClient) and the host decides how requests are carried
//! (`bridge-native` ships the `reqwest` implementation, tests ship fakes).
//!
//! All bridge traits require `Send + Sync` so a single instance can be shared
//! across concurrent requests.

pub mod error;
pub mod http;

pub use error::BridgeError;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
