//! Authentication module.
//!
//! Local username/password accounts with HS256 JWTs. Tokens are accepted
//! from the Authorization header or, for WebSocket connections, a `token`
//! query parameter.

mod claims;
mod config;
mod error;
mod middleware;

pub use claims::Claims;
pub use config::{AuthConfig, ConfigValidationError};
pub use error::AuthError;
pub use middleware::{auth_middleware, AuthState, CurrentUser};
