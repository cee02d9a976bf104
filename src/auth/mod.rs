//! Authentication module for the loan console
//!
//! - Session context with the super-admin flag computed once
//! - Bearer token payload decoding
//! - File-backed persistence of the token and convenience keys

mod jwt;
mod session;
mod store;

pub use jwt::{decode_claims, email_from_token, Claims, JwtError};
pub use session::Session;
pub use store::{SessionStore, StoredSession};
