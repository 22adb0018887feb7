//! Client for the question backend
//!
//! [`StudioClient`] wraps the backend's `/api` routes. Every response body goes through the
//! fail-closed parsers in [`crate::parsers`]; every non-success status becomes an
//! [`ApiError`] whose display text is fit for the chat pane or the terminal.

pub mod client;
pub mod error;
pub mod http;
pub mod validation;

pub use client::{SimilarRequest, StudioClient};
pub use error::ApiError;
