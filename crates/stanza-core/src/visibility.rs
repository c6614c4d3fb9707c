//! Read-visibility resolver.
//!
//! Status rules and visibility rules compose with logical AND, never OR.
//! Deleted entities are treated as not-found for everyone except the owning
//! org_admin explicitly requesting the deleted view, or superadmin — the
//! read path must answer `NotFound`, not access-denied, so existence never
//! leaks across tenants.

use crate::entity::{Entity, EntityStatus, Visibility};
use crate::principal::{Principal, Role};

/// Options for a read. `include_deleted` is the recovery-UI switch: only
/// there does the owning org_admin see soft-deleted records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    pub include_deleted: bool,
}

/// May this principal (or anonymous caller, `None`) read this entity?
pub fn can_read(principal: Option<&Principal>, entity: &Entity) -> bool {
    can_read_with(principal, entity, ReadOptions::default())
}

pub fn can_read_with(principal: Option<&Principal>, entity: &Entity, opts: ReadOptions) -> bool {
    if let Some(p) = principal {
        if p.is_superadmin() {
            return true;
        }
    }

    // Status gate first; the visibility gate still has to pass afterwards.
    match entity.status {
        EntityStatus::Deleted => {
            let Some(p) = principal else { return false };
            let owning_admin =
                p.role == Role::OrgAdmin && p.acts_for(entity.organization_id.as_deref());
            if !(owning_admin && opts.include_deleted) {
                return false;
            }
        }
        EntityStatus::Published => {}
        EntityStatus::Draft | EntityStatus::Pending | EntityStatus::Archived => {
            // Working statuses are an owning-org concern only.
            let Some(p) = principal else { return false };
            if !p.acts_for(entity.organization_id.as_deref()) {
                return false;
            }
        }
    }

    match entity.visibility {
        Visibility::Public => true,
        Visibility::Authenticated => principal.is_some(),
        Visibility::Members => principal
            .map(|p| p.acts_for(entity.organization_id.as_deref()))
            .unwrap_or(false),
    }
}
