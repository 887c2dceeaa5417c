//! `shopgate-core`: shared identifiers, ownership and error primitives.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod ownership;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError, StoreResult};
pub use id::{OrderId, ProductId, SubjectId};
pub use ownership::Owned;
