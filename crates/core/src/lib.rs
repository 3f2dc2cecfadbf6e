//! `wolfshield-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod tail;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{OrganizationId, PropertyId, ResidentId, UnitId, UserId};
pub use tail::{ChainTail, ExpectedTail, GENESIS_HASH};
pub use value_object::ValueObject;
