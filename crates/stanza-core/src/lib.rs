//! Stanza core — pure domain types and gate logic for the multi-tenant
//! content lifecycle.
//!
//! Everything here is storage-free: entities, principals, organizations,
//! visibility rules, and the field-schema gate are plain value types plus
//! predicates, so the same logic works against any repository adapter or a
//! test double. Orchestration (the transition engine, the repository port)
//! lives in `stanza-lifecycle`.

pub mod entity;
pub mod error;
pub mod ids;
pub mod org;
pub mod principal;
pub mod schema;
pub mod visibility;

pub use entity::{CreateRequest, Entity, EntityStatus, UpdateRequest, Visibility};
pub use error::{DuplicateNameWarning, StanzaError};
pub use ids::{slugify, validate_slug, EntityId};
pub use org::{Organization, PermissionMatrix};
pub use principal::{Principal, PrincipalClaims, Role};
pub use schema::{
    EntityTypeSchema, FieldConstraint, FieldDef, FieldViolation, PermissiveGate, SchemaGate,
    SchemaRegistry,
};
pub use visibility::{can_read, can_read_with, ReadOptions};

pub type Result<T> = std::result::Result<T, StanzaError>;
