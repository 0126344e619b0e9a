//! # pulse-auth
//!
//! Stateless identity tokens for Pulse.
//!
//! ## Modules
//!
//! - `jwt`: HS256 token issuance and validation with a fixed lifetime
//! - `bearer`: `Authorization: Bearer <token>` header parsing
//! - `password`: Argon2id password hashing
//! - `accounts`: credential lookup backing the login endpoint
//! - `error`: the authentication failure taxonomy

pub mod accounts;
pub mod bearer;
pub mod error;
pub mod jwt;
pub mod password;

pub use accounts::{Account, AccountDirectory, StaticAccountDirectory};
pub use bearer::parse_bearer;
pub use error::AuthError;
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenAuthenticator};
pub use password::PasswordHasher;
