//! Three-legged OAuth 1.0 (RSA-SHA1) against Jira for axum applications.
//!
//! [`routes::oauth_router`] exposes the authorize and callback endpoints, and
//! [`handlers::require_jira_access_token`] guards routes that need the resulting
//! access token. Tokens live in the user's session under the keys in
//! [`models::oauth`].

pub mod error;
pub mod handlers;
pub mod jira_client;
pub mod models;
pub mod oauth1;
pub mod routes;
pub mod session;

pub use error::{ConfigurationError, Error, Result, TokenError};
pub use session::{MemorySession, SessionStore};
