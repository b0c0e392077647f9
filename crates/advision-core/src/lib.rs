//! AdVision core library.
//!
//! Client side of the AdVision marketing-analytics API:
//!
//! - `api`: the `ApiClient` request primitive and the typed call groups
//!   (auth, campaigns, creatives, analytics, ml, documents, chat)
//! - `auth`: session token storage and keychain credentials
//! - `config`: base URL resolution and persisted settings
//! - `models`: request bodies the client builds itself
//! - `utils`: client-side campaign metrics and display helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, SessionInvalidated};
pub use auth::{FileSessionStore, MemorySessionStore, SessionStore};
pub use config::Config;
