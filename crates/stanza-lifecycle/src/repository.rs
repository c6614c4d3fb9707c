//! The durable-storage port.
//!
//! Adapters must provide two atomic guarantees at write time: the version
//! compare-and-write (`VersionConflict` on mismatch) and the scope+slug
//! constraint (`DuplicateSlug` on collision). The uniqueness scan in
//! [`crate::uniqueness`] is only a precheck; this port is where the
//! invariant actually holds under concurrency.

use async_trait::async_trait;

use stanza_core::{Entity, EntityId, Result};

use crate::uniqueness::Scope;

/// Durable storage keyed by entity id, with versioned compare-and-write and
/// scoped listing.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Fetch by id. `Ok(None)` when absent — visibility filtering is the
    /// engine's job, not the store's.
    async fn get(&self, id: &EntityId) -> Result<Option<Entity>>;

    /// All entities in a uniqueness scope, in the adapter's stable
    /// iteration order (the duplicate scan commits to the first match in
    /// this order).
    async fn list_scope(&self, scope: &Scope) -> Result<Vec<Entity>>;

    /// Insert a new entity. Fails with `DuplicateSlug` when the scope+slug
    /// constraint is violated, `InvalidInput` when the id already exists.
    async fn insert(&self, entity: Entity) -> Result<Entity>;

    /// Replace the stored entity iff its version equals `expected_version`.
    /// Enforces the same slug constraint as `insert` (a rename can collide
    /// too). Fails with `VersionConflict` on a losing write, `NotFound`
    /// when the entity no longer exists.
    async fn compare_and_write(&self, entity: Entity, expected_version: u64) -> Result<Entity>;

    /// Permanently remove all versions of an entity. Irreversible;
    /// failures (including `NotFound`) must be surfaced verbatim, never
    /// swallowed.
    async fn purge(&self, id: &EntityId) -> Result<()>;
}
