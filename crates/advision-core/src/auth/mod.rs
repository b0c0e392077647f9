//! Authentication module for managing session tokens and credentials.
//!
//! This module provides:
//! - `SessionStore`: the token store injected into `ApiClient`
//! - `FileSessionStore` / `MemorySessionStore`: the two store implementations
//! - `CredentialStore`: optional OS-level password storage via keyring
//!
//! Tokens expire 7 days after they are written.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{FileSessionStore, MemorySessionStore, SessionData, SessionStore};
