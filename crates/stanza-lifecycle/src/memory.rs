//! In-memory repository adapter.
//!
//! Backs tests and embedders without a database. A `BTreeMap` keyed by
//! entity id gives the stable scope-iteration order the duplicate scan
//! relies on; both write paths hold the write lock across their
//! check-then-write, which is what makes the slug constraint and the
//! version compare-and-write atomic here.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use stanza_core::{Entity, EntityId, Result, StanzaError};

use crate::repository::EntityRepository;
use crate::uniqueness::Scope;

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    entities: RwLock<BTreeMap<EntityId, Entity>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

fn slug_collision<'a>(
    entities: &'a BTreeMap<EntityId, Entity>,
    candidate: &Entity,
) -> Option<&'a Entity> {
    let scope = Scope::of(candidate);
    entities
        .values()
        .filter(|e| e.id != candidate.id && scope.contains(e))
        .find(|e| e.slug.trim().eq_ignore_ascii_case(candidate.slug.trim()))
}

#[async_trait]
impl EntityRepository for InMemoryRepository {
    async fn get(&self, id: &EntityId) -> Result<Option<Entity>> {
        Ok(self.entities.read().await.get(id).cloned())
    }

    async fn list_scope(&self, scope: &Scope) -> Result<Vec<Entity>> {
        Ok(self
            .entities
            .read()
            .await
            .values()
            .filter(|e| scope.contains(e))
            .cloned()
            .collect())
    }

    async fn insert(&self, entity: Entity) -> Result<Entity> {
        let mut entities = self.entities.write().await;
        if entities.contains_key(&entity.id) {
            return Err(StanzaError::InvalidInput(format!(
                "entity id {} already exists",
                entity.id
            )));
        }
        if let Some(existing) = slug_collision(&entities, &entity) {
            return Err(StanzaError::DuplicateSlug {
                slug: entity.slug.clone(),
                existing: existing.id.clone(),
            });
        }
        entities.insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    async fn compare_and_write(&self, entity: Entity, expected_version: u64) -> Result<Entity> {
        let mut entities = self.entities.write().await;
        let stored = entities
            .get(&entity.id)
            .ok_or_else(|| StanzaError::NotFound(format!("entity {}", entity.id)))?;
        if stored.version != expected_version {
            return Err(StanzaError::VersionConflict {
                expected: expected_version,
                stored: stored.version,
            });
        }
        if let Some(existing) = slug_collision(&entities, &entity) {
            return Err(StanzaError::DuplicateSlug {
                slug: entity.slug.clone(),
                existing: existing.id.clone(),
            });
        }
        entities.insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    async fn purge(&self, id: &EntityId) -> Result<()> {
        let mut entities = self.entities.write().await;
        entities
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StanzaError::NotFound(format!("entity {id}")))
    }
}
