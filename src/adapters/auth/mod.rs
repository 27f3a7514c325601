//! Authentication adapters.
//!
//! Implementations of the `AuthGateway` port:
//!
//! - `client_credentials` - OAuth2 client-credentials flow with token caching
//! - `static_token` - Fixed token for tests and local development

mod client_credentials;
mod static_token;

pub use client_credentials::{ClientCredentialsAuth, ClientCredentialsConfig, DEFAULT_AUTHORITY};
pub use static_token::StaticTokenAuth;
