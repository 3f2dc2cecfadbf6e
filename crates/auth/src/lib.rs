//! `wolfshield-auth`: authentication/authorization boundary for ledger callers.
//!
//! This crate is intentionally decoupled from HTTP and storage. The ledger engine
//! never calls into it: callers authorize first, then hand the engine a trusted
//! `created_by`.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use policy::permissions_for_roles;
pub use principal::OrganizationMembership;
pub use roles::Role;
