//! REST collaborators of the CaviarScout client.
//!
//! - [`api`]: the remote resource traits consumed by the store layer.
//! - [`http`]: [`HttpBackend`], the `reqwest` implementation of those traits.
//! - [`error`]: [`ApiError`], returned by every remote call.

pub mod api;
pub mod error;
pub mod http;

pub use api::{ModerationApi, ProdigeApi, VideoApi};
pub use error::ApiError;
pub use http::HttpBackend;
