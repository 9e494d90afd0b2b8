//! # mkto-auth
//!
//! Marketo authentication: OAuth 2.0 client-credentials grant against the
//! instance identity endpoint, plus a time-bounded token cache.
//!
//! ## Security
//!
//! - Secrets and tokens are redacted in Debug output
//! - Tracing spans skip credential parameters
//! - Error messages never include request URLs (tokens ride in query strings)
//!
//! ## Example
//!
//! ```rust,ignore
//! use mkto_auth::{Credentials, TokenCache, TokenProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mkto_auth::Error> {
//!     let creds = Credentials::from_env()?;
//!     let cache = TokenCache::new(TokenProvider::new(creds));
//!
//!     // One identity round trip; later calls reuse the cached token.
//!     let token = cache.get_or_fetch().await?;
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod token;

pub use credentials::{
    Credentials, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_MUNCHKIN_ID,
};
pub use error::{Error, ErrorKind, IdentityError, Result};
pub use token::{TokenCache, TokenProvider, TokenResponse};
