//! The lifecycle engine.
//!
//! Every operation runs the same sequence: load, guard pipeline,
//! action-specific gates (uniqueness, schema), then a single versioned
//! write. On any guard failure the typed error is returned before anything
//! is written; a successful mutation bumps `version`, refreshes
//! `updated_at`, and yields a `TransitionRecord` for the external audit
//! trail.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use stanza_core::{
    can_read_with, slugify, validate_slug, CreateRequest, DuplicateNameWarning, Entity, EntityId,
    EntityStatus, Organization, Principal, ReadOptions, Result, SchemaGate, StanzaError,
    UpdateRequest, Visibility,
};

use crate::action::Action;
use crate::guards;
use crate::repository::EntityRepository;
use crate::uniqueness::{check_duplicates, DuplicateCheck, Scope};

/// One row of the append-only audit trail, returned alongside the updated
/// entity on every successful mutation. `to_status = None` records a purge.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRecord {
    pub entity_id: EntityId,
    pub from_status: Option<EntityStatus>,
    pub to_status: Option<EntityStatus>,
    pub action: Action,
    pub principal_id: uuid::Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CreateOutcome {
    pub entity: Entity,
    pub record: TransitionRecord,
    pub name_warning: Option<DuplicateNameWarning>,
}

#[derive(Debug)]
pub struct UpdateOutcome {
    pub entity: Entity,
    pub record: TransitionRecord,
    pub name_warning: Option<DuplicateNameWarning>,
}

#[derive(Debug)]
pub struct TransitionOutcome {
    /// `None` after `superDelete` — the entity no longer exists.
    pub entity: Option<Entity>,
    pub record: TransitionRecord,
}

/// The transition engine. Holds the repository and schema-gate ports;
/// organization/permission data is passed into each call, never cached, so
/// stale-permission bugs cannot accumulate here.
pub struct LifecycleEngine {
    repo: Arc<dyn EntityRepository>,
    schema_gate: Arc<dyn SchemaGate>,
}

impl LifecycleEngine {
    pub fn new(repo: Arc<dyn EntityRepository>, schema_gate: Arc<dyn SchemaGate>) -> Self {
        Self { repo, schema_gate }
    }

    /// Create a new draft entity.
    ///
    /// `org` is the caller-supplied permission record for the target tenant;
    /// non-superadmins fail closed without one. Superadmins may create in
    /// any organization or globally and bypass the matrix.
    pub async fn create(
        &self,
        principal: &Principal,
        org: Option<&Organization>,
        req: CreateRequest,
    ) -> Result<CreateOutcome> {
        let target_org = match req.organization_id.clone() {
            Some(o) => Some(o),
            None => principal.organization_id.clone(),
        };

        if !principal.acts_for(target_org.as_deref()) {
            return Err(StanzaError::CrossTenantAccessDenied(
                "cannot create in another organization".into(),
            ));
        }

        if !principal.is_superadmin() {
            // target_org is the principal's own org here; the matrix still
            // has to grant the type. Absent permission data fails closed.
            let permitted = org
                .filter(|o| Some(o.id.as_str()) == target_org.as_deref())
                .map(|o| o.permissions.can_create(&req.entity_type_id))
                .unwrap_or(false);
            if !permitted {
                warn!(
                    type_id = %req.entity_type_id,
                    org = ?target_org,
                    "create denied by permission matrix"
                );
                return Err(StanzaError::Unauthorized(format!(
                    "organization may not create '{}' entities",
                    req.entity_type_id
                )));
            }
        }

        let slug = match &req.slug {
            Some(s) => s.clone(),
            None => slugify(&req.name),
        };
        validate_slug(&slug)?;

        let scope = Scope {
            organization_id: target_org.clone(),
            entity_type_id: req.entity_type_id.clone(),
        };
        let check = check_duplicates(self.repo.as_ref(), &scope, &req.name, &slug, None).await?;
        if let Some(existing) = check.slug_match {
            return Err(StanzaError::DuplicateSlug { slug, existing });
        }
        let name_warning = check.name_match.map(|existing| DuplicateNameWarning {
            name: req.name.clone(),
            existing,
        });

        let now = Utc::now();
        let entity = Entity {
            id: EntityId::generate(),
            organization_id: target_org,
            entity_type_id: req.entity_type_id,
            name: req.name,
            slug,
            status: EntityStatus::Draft,
            visibility: req.visibility.unwrap_or(Visibility::Public),
            data: req.data,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        let entity = self.repo.insert(entity).await?;

        info!(entity_id = %entity.id, org = ?entity.organization_id, "entity created");
        let record = self.record(&entity.id, None, Some(EntityStatus::Draft), Action::Create, principal);
        Ok(CreateOutcome {
            entity,
            record,
            name_warning,
        })
    }

    /// Apply field changes to a draft.
    pub async fn update(
        &self,
        principal: &Principal,
        id: &EntityId,
        req: UpdateRequest,
    ) -> Result<UpdateOutcome> {
        let mut entity = self.load(id).await?;
        self.guard(Action::Update, principal, &entity)?;

        let mut name_warning = None;
        if req.renames() {
            let name = req.name.as_deref().unwrap_or(&entity.name);
            let slug = match &req.slug {
                Some(s) => s.clone(),
                None => entity.slug.clone(),
            };
            validate_slug(&slug)?;
            let check = check_duplicates(
                self.repo.as_ref(),
                &Scope::of(&entity),
                name,
                &slug,
                Some(&entity.id),
            )
            .await?;
            if let Some(existing) = check.slug_match {
                return Err(StanzaError::DuplicateSlug { slug, existing });
            }
            name_warning = check.name_match.map(|existing| DuplicateNameWarning {
                name: name.to_string(),
                existing,
            });
        }

        if let Some(name) = req.name {
            entity.name = name;
        }
        if let Some(slug) = req.slug {
            entity.slug = slug;
        }
        if let Some(visibility) = req.visibility {
            entity.visibility = visibility;
        }
        if let Some(data) = req.data {
            entity.data = data;
        }

        let entity = self.write_bumped(entity).await?;
        info!(entity_id = %entity.id, version = entity.version, "draft updated");
        let record = self.record(
            &entity.id,
            Some(EntityStatus::Draft),
            Some(EntityStatus::Draft),
            Action::Update,
            principal,
        );
        Ok(UpdateOutcome {
            entity,
            record,
            name_warning,
        })
    }

    /// Run a lifecycle action against an existing entity.
    ///
    /// `Action::Create` needs a payload and is rejected here;
    /// `Action::Update` is accepted as a guard-checked touch (the
    /// draft→draft edge with no field changes).
    pub async fn transition(
        &self,
        principal: &Principal,
        id: &EntityId,
        action: Action,
    ) -> Result<TransitionOutcome> {
        if action == Action::Create {
            return Err(StanzaError::InvalidInput(
                "create requires a payload; use LifecycleEngine::create".into(),
            ));
        }

        let mut entity = self.load(id).await?;
        self.guard(action, principal, &entity)?;

        if action == Action::SubmitForApproval {
            let violations = self.schema_gate.violations(&entity);
            if !violations.is_empty() {
                warn!(entity_id = %entity.id, count = violations.len(), "submit blocked by schema gate");
                return Err(StanzaError::SchemaValidationFailed(violations));
            }
        }

        let from = entity.status;
        match action.target() {
            None => {
                // Hard purge: irreversible, errors surfaced verbatim.
                self.repo.purge(&entity.id).await?;
                info!(entity_id = %entity.id, from = %from, "entity purged");
                let record = self.record(&entity.id, Some(from), None, action, principal);
                Ok(TransitionOutcome {
                    entity: None,
                    record,
                })
            }
            Some(to) => {
                entity.status = to;
                let entity = self.write_bumped(entity).await?;
                info!(entity_id = %entity.id, from = %from, to = %to, action = %action, "transition applied");
                let record = self.record(&entity.id, Some(from), Some(to), action, principal);
                Ok(TransitionOutcome {
                    entity: Some(entity),
                    record,
                })
            }
        }
    }

    /// Read one entity, applying visibility rules. Anything the caller may
    /// not see answers `NotFound` — read paths never reveal that a record
    /// exists in another tenant.
    pub async fn get(
        &self,
        principal: Option<&Principal>,
        id: &EntityId,
        opts: ReadOptions,
    ) -> Result<Entity> {
        let entity = self.load(id).await?;
        if can_read_with(principal, &entity, opts) {
            Ok(entity)
        } else {
            Err(StanzaError::NotFound(format!("entity {id}")))
        }
    }

    /// All entities in a scope the caller may read, in scope order.
    pub async fn list_visible(
        &self,
        principal: Option<&Principal>,
        scope: &Scope,
        opts: ReadOptions,
    ) -> Result<Vec<Entity>> {
        let entities = self.repo.list_scope(scope).await?;
        Ok(entities
            .into_iter()
            .filter(|e| can_read_with(principal, e, opts))
            .collect())
    }

    /// Duplicate precheck passthrough, for form-level feedback before a
    /// save is attempted.
    pub async fn check_duplicates(
        &self,
        scope: &Scope,
        name: &str,
        slug: &str,
        exclude: Option<&EntityId>,
    ) -> Result<DuplicateCheck> {
        check_duplicates(self.repo.as_ref(), scope, name, slug, exclude).await
    }

    async fn load(&self, id: &EntityId) -> Result<Entity> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| StanzaError::NotFound(format!("entity {id}")))
    }

    fn guard(&self, action: Action, principal: &Principal, entity: &Entity) -> Result<()> {
        guards::check(action, principal, entity).inspect_err(|err| {
            warn!(
                entity_id = %entity.id,
                action = %action,
                role = %principal.role,
                %err,
                "guard rejected action"
            );
        })
    }

    async fn write_bumped(&self, mut entity: Entity) -> Result<Entity> {
        let expected = entity.version;
        entity.version += 1;
        entity.updated_at = Utc::now();
        self.repo.compare_and_write(entity, expected).await
    }

    fn record(
        &self,
        entity_id: &EntityId,
        from: Option<EntityStatus>,
        to: Option<EntityStatus>,
        action: Action,
        principal: &Principal,
    ) -> TransitionRecord {
        TransitionRecord {
            entity_id: entity_id.clone(),
            from_status: from,
            to_status: to,
            action,
            principal_id: principal.user_id,
            timestamp: Utc::now(),
        }
    }
}
