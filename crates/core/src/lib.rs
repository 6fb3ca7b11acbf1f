//! `chapel-core`: shared building blocks (ids, errors, entity trait).
//!
//! This crate contains no infrastructure concerns.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError, StoreResult};
pub use id::{ContentId, TenantId, UserId};
