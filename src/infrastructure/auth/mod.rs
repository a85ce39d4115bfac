//! Authentication infrastructure module
//!
//! Session tokens for signed-in users.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
