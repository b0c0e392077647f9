//! REST API client module for the AdVision backend.
//!
//! This module provides the `ApiClient` request primitive, the request
//! descriptors it sends, and the typed call groups built on top of it.
//!
//! The API uses bearer token authentication; the token comes from the
//! `SessionStore` the client was constructed with.

pub mod client;
pub mod error;
pub mod groups;
pub mod request;
pub mod routes;

pub use client::{ApiClient, SessionInvalidated};
pub use error::{ApiError, Result};
pub use groups::{AnalyticsApi, AuthApi, CampaignApi, ChatApi, CreativeApi, DocumentsApi, MlApi};
pub use request::{FileUpload, RequestBody, RequestSpec};
pub use routes::DEFAULT_QUERY_RESULTS;
