//! Uniqueness precheck for name and slug.
//!
//! This scan is the fast, user-facing half of the duplicate story: it gives
//! early, friendly errors before a write is attempted. The hard guarantee
//! for slug uniqueness under concurrency lives in the repository adapter,
//! which enforces the scope+slug constraint atomically at write time. The
//! scan is a precheck, not a security boundary.

use serde::Serialize;

use stanza_core::{Entity, EntityId, Result};

use crate::repository::EntityRepository;

/// The scope a name/slug must be unique within: one tenant and one entity
/// type, or the platform-global side of that type when `organization_id`
/// is `None`. Global and org-scoped entities are never compared against
/// each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Scope {
    pub organization_id: Option<String>,
    pub entity_type_id: String,
}

impl Scope {
    pub fn of(entity: &Entity) -> Self {
        Self {
            organization_id: entity.organization_id.clone(),
            entity_type_id: entity.entity_type_id.clone(),
        }
    }

    pub fn contains(&self, entity: &Entity) -> bool {
        entity.organization_id == self.organization_id
            && entity.entity_type_id == self.entity_type_id
    }
}

/// Result of a duplicate scan. Name and slug matches are independent; both
/// may be present at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateCheck {
    pub name_match: Option<EntityId>,
    pub slug_match: Option<EntityId>,
}

fn eq_folded(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Scan `scope` for the first entity whose slug equals `slug` and,
/// independently, the first whose name equals `name` — case-insensitive,
/// trimmed, first match in scope-iteration order, skipping `exclude` (the
/// entity being edited must not collide with itself).
pub async fn check_duplicates(
    repo: &dyn EntityRepository,
    scope: &Scope,
    name: &str,
    slug: &str,
    exclude: Option<&EntityId>,
) -> Result<DuplicateCheck> {
    let mut check = DuplicateCheck::default();
    for entity in repo.list_scope(scope).await? {
        if exclude == Some(&entity.id) {
            continue;
        }
        if check.slug_match.is_none() && eq_folded(&entity.slug, slug) {
            check.slug_match = Some(entity.id.clone());
        }
        if check.name_match.is_none() && eq_folded(&entity.name, name) {
            check.name_match = Some(entity.id.clone());
        }
        if check.slug_match.is_some() && check.name_match.is_some() {
            break;
        }
    }
    Ok(check)
}
