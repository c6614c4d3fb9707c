//! The ordered guard pipeline.
//!
//! Every mutating action on an existing entity passes through [`check`] —
//! role sufficiency, then tenancy, then source-status membership — each
//! guard short-circuiting with its own error kind. Consolidating the checks
//! here (instead of inline conditionals per endpoint) keeps the order
//! identical everywhere.

use stanza_core::{Entity, EntityStatus, Principal, Result, Role, StanzaError};

use crate::action::Action;

/// Run the full guard set for `action` against `entity`. Uniqueness and
/// schema preconditions are separate, action-specific gates on top.
pub fn check(action: Action, principal: &Principal, entity: &Entity) -> Result<()> {
    check_role(action, principal, entity)?;
    check_tenancy(action, principal, entity)?;
    check_status(action, entity)?;
    Ok(())
}

/// Guard 1: role sufficiency, including the status-dependent refinement on
/// `Delete` (an org_admin may only delete drafts; any other status needs
/// superadmin).
fn check_role(action: Action, principal: &Principal, entity: &Entity) -> Result<()> {
    if !principal.role.at_least(action.min_role()) {
        return Err(StanzaError::Unauthorized(format!(
            "{} requires at least {}",
            action,
            action.min_role()
        )));
    }
    if action == Action::Delete
        && principal.role != Role::Superadmin
        && entity.status != EntityStatus::Draft
    {
        return Err(StanzaError::Unauthorized(format!(
            "delete of a {} entity requires superadmin",
            entity.status
        )));
    }
    Ok(())
}

/// Guard 2: organization match. Superadmin bypasses; superadmin-only
/// actions never reach the check.
fn check_tenancy(action: Action, principal: &Principal, entity: &Entity) -> Result<()> {
    if !action.requires_org_match() || principal.is_superadmin() {
        return Ok(());
    }
    if principal.acts_for(entity.organization_id.as_deref()) {
        Ok(())
    } else {
        Err(StanzaError::CrossTenantAccessDenied(format!(
            "entity {} belongs to a different organization",
            entity.id
        )))
    }
}

/// Guard 3: the current status must be in the action's allowed source set.
fn check_status(action: Action, entity: &Entity) -> Result<()> {
    if action.allowed_sources().contains(&entity.status) {
        Ok(())
    } else {
        Err(StanzaError::InvalidTransition {
            action: action.to_string(),
            from: entity.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stanza_core::Visibility;
    use uuid::Uuid;

    fn entity(org: Option<&str>, status: EntityStatus) -> Entity {
        Entity {
            id: "abc1234".parse().unwrap(),
            organization_id: org.map(String::from),
            entity_type_id: "articles".into(),
            name: "Hello".into(),
            slug: "hello".into(),
            status,
            visibility: Visibility::Public,
            data: serde_json::Map::new(),
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn principal(role: Role, org: Option<&str>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "u@example.com".into(),
            role,
            organization_id: org.map(String::from),
        }
    }

    #[test]
    fn member_cannot_approve() {
        let err = check(
            Action::Approve,
            &principal(Role::OrgMember, Some("org_1")),
            &entity(Some("org_1"), EntityStatus::Pending),
        )
        .unwrap_err();
        assert!(matches!(err, StanzaError::Unauthorized(_)));
    }

    #[test]
    fn role_guard_runs_before_tenancy_guard() {
        // Wrong org AND wrong role: role failure wins because it runs first.
        let err = check(
            Action::SubmitForApproval,
            &principal(Role::OrgMember, Some("org_2")),
            &entity(Some("org_1"), EntityStatus::Draft),
        )
        .unwrap_err();
        assert!(matches!(err, StanzaError::Unauthorized(_)));
    }

    #[test]
    fn tenancy_guard_runs_before_status_guard() {
        // Wrong org AND wrong status: tenancy failure wins.
        let err = check(
            Action::Update,
            &principal(Role::OrgAdmin, Some("org_2")),
            &entity(Some("org_1"), EntityStatus::Published),
        )
        .unwrap_err();
        assert!(matches!(err, StanzaError::CrossTenantAccessDenied(_)));
    }

    #[test]
    fn cross_tenant_admin_is_denied() {
        let err = check(
            Action::SubmitForApproval,
            &principal(Role::OrgAdmin, Some("org_1")),
            &entity(Some("org_2"), EntityStatus::Draft),
        )
        .unwrap_err();
        assert!(matches!(err, StanzaError::CrossTenantAccessDenied(_)));
    }

    #[test]
    fn tenant_admin_cannot_touch_global_entities() {
        let err = check(
            Action::Update,
            &principal(Role::OrgAdmin, Some("org_1")),
            &entity(None, EntityStatus::Draft),
        )
        .unwrap_err();
        assert!(matches!(err, StanzaError::CrossTenantAccessDenied(_)));
    }

    #[test]
    fn status_outside_source_set_is_invalid_transition() {
        let err = check(
            Action::Approve,
            &principal(Role::Superadmin, None),
            &entity(Some("org_1"), EntityStatus::Draft),
        )
        .unwrap_err();
        assert!(matches!(err, StanzaError::InvalidTransition { .. }));
    }

    #[test]
    fn admin_deletes_own_draft() {
        check(
            Action::Delete,
            &principal(Role::OrgAdmin, Some("org_1")),
            &entity(Some("org_1"), EntityStatus::Draft),
        )
        .unwrap();
    }

    #[test]
    fn admin_cannot_delete_published() {
        let err = check(
            Action::Delete,
            &principal(Role::OrgAdmin, Some("org_1")),
            &entity(Some("org_1"), EntityStatus::Published),
        )
        .unwrap_err();
        assert!(matches!(err, StanzaError::Unauthorized(_)));
    }

    #[test]
    fn superadmin_deletes_any_status_any_org() {
        for status in Action::Delete.allowed_sources() {
            check(
                Action::Delete,
                &principal(Role::Superadmin, None),
                &entity(Some("org_1"), *status),
            )
            .unwrap();
        }
    }

    #[test]
    fn superadmin_bypasses_org_match() {
        check(
            Action::Approve,
            &principal(Role::Superadmin, None),
            &entity(Some("org_9"), EntityStatus::Pending),
        )
        .unwrap();
    }

    #[test]
    fn member_updates_own_draft() {
        check(
            Action::Update,
            &principal(Role::OrgMember, Some("org_1")),
            &entity(Some("org_1"), EntityStatus::Draft),
        )
        .unwrap();
    }

    #[test]
    fn member_cannot_submit_for_approval() {
        let err = check(
            Action::SubmitForApproval,
            &principal(Role::OrgMember, Some("org_1")),
            &entity(Some("org_1"), EntityStatus::Draft),
        )
        .unwrap_err();
        assert!(matches!(err, StanzaError::Unauthorized(_)));
    }
}
