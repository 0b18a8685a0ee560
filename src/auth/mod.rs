//! Caller identification
//!
//! Sessions are issued by an external auth provider as HS256 JWTs. A request
//! with a valid bearer token belongs to that user; anything else is a guest
//! identified by client IP.

mod caller;
mod jwt;

pub use caller::{client_ip, Caller};
pub use jwt::{Claims, JwtVerifier};
