//! Staff authentication
//!
//! - [`JwtService`] - bearer token validation
//! - [`StaffUser`] - extractor guarding the staff endpoints

pub mod extractor;
pub mod jwt;

pub use extractor::StaffUser;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, STAFF_ROLES};
