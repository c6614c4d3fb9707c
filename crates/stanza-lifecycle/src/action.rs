//! The edge table.
//!
//! Each action names its allowed source statuses, its target status, the
//! minimum role, and whether the principal's organization must match the
//! entity's. Keeping this as data on the enum (rather than conditionals
//! spread across call sites) means every endpoint evaluates the identical
//! table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use stanza_core::{EntityStatus, Role};

/// Lifecycle actions. `Create` is listed for completeness of the table but
/// enters through `LifecycleEngine::create`, which also needs the payload
/// and the tenant's permission matrix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Action {
    Create,
    Update,
    SubmitForApproval,
    Approve,
    Reject,
    Delete,
    Restore,
    SuperDelete,
}

pub const ALL_STATUSES: [EntityStatus; 5] = [
    EntityStatus::Draft,
    EntityStatus::Pending,
    EntityStatus::Published,
    EntityStatus::Archived,
    EntityStatus::Deleted,
];

impl Action {
    /// Statuses this action may fire from. `Create` has no source entity.
    pub fn allowed_sources(self) -> &'static [EntityStatus] {
        match self {
            Self::Create => &[],
            Self::Update => &[EntityStatus::Draft],
            Self::SubmitForApproval => &[EntityStatus::Draft],
            Self::Approve | Self::Reject => &[EntityStatus::Pending],
            Self::Delete => &[
                EntityStatus::Draft,
                EntityStatus::Pending,
                EntityStatus::Published,
                EntityStatus::Archived,
            ],
            Self::Restore => &[EntityStatus::Deleted],
            Self::SuperDelete => &ALL_STATUSES,
        }
    }

    /// Status the entity lands in. `None` means the entity is purged
    /// outright — hard delete is an operation, not a state.
    pub fn target(self) -> Option<EntityStatus> {
        match self {
            Self::Create => Some(EntityStatus::Draft),
            Self::Update => Some(EntityStatus::Draft),
            Self::SubmitForApproval => Some(EntityStatus::Pending),
            Self::Approve => Some(EntityStatus::Published),
            Self::Reject => Some(EntityStatus::Draft),
            Self::Delete => Some(EntityStatus::Deleted),
            Self::Restore => Some(EntityStatus::Draft),
            Self::SuperDelete => None,
        }
    }

    /// Minimum role for the action. `Delete` is status-dependent (an
    /// org_admin may only delete drafts); the guard pipeline applies that
    /// refinement on top of this floor.
    pub fn min_role(self) -> Role {
        match self {
            Self::Create | Self::Update => Role::OrgMember,
            Self::SubmitForApproval | Self::Delete => Role::OrgAdmin,
            Self::Approve | Self::Reject | Self::Restore | Self::SuperDelete => Role::Superadmin,
        }
    }

    /// Whether the principal's organization must match the entity's.
    /// Superadmin-only actions never check it — superadmin bypasses the
    /// org match everywhere.
    pub fn requires_org_match(self) -> bool {
        match self {
            Self::Create | Self::Update | Self::SubmitForApproval | Self::Delete => true,
            Self::Approve | Self::Reject | Self::Restore | Self::SuperDelete => false,
        }
    }

    /// Actions legal from a given status for a given role, for rendering
    /// action menus. This consults the table only — tenancy still applies.
    pub fn available(from: EntityStatus, role: Role) -> Vec<Action> {
        use strum::IntoEnumIterator;
        Action::iter()
            .filter(|a| *a != Action::Create)
            .filter(|a| a.allowed_sources().contains(&from))
            .filter(|a| role.at_least(a.min_role()))
            .filter(|a| {
                // Non-superadmin delete is draft-only.
                !(*a == Action::Delete && role != Role::Superadmin && from != EntityStatus::Draft)
            })
            .collect()
    }
}
