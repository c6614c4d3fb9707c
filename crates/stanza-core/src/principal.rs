//! Principals and the role resolver.
//!
//! Tokens are verified upstream (magic-link flow, out of scope); this module
//! only normalizes the already-authenticated claims into a `Principal`.
//! There is no implicit or thread-local identity anywhere in the codebase —
//! every operation takes `&Principal` explicitly.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::StanzaError;

/// Platform roles, least to most privileged.
///
/// Parsing is exact-match: unknown strings and case variants (`ORG_ADMIN`)
/// are rejected rather than mapped to a default, so a mangled token can
/// never silently act as any role at all.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    OrgMember,
    OrgAdmin,
    Superadmin,
}

impl Role {
    /// Privilege rank for minimum-role comparisons.
    pub fn rank(self) -> u8 {
        match self {
            Self::OrgMember => 0,
            Self::OrgAdmin => 1,
            Self::Superadmin => 2,
        }
    }

    pub fn at_least(self, min: Role) -> bool {
        self.rank() >= min.rank()
    }
}

/// A normalized, authenticated caller.
///
/// Invariant (enforced by `from_claims`): `organization_id` is `None` iff
/// the role is `Superadmin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub role: Role,
    pub organization_id: Option<String>,
}

impl Principal {
    /// Normalize verified token claims into an effective `{role, org}` pair.
    ///
    /// Superadmins always resolve to a `None` organization, whatever the
    /// token carried; org-scoped roles must carry one.
    pub fn from_claims(claims: &PrincipalClaims) -> Result<Self, StanzaError> {
        let role: Role = claims
            .role
            .parse()
            .map_err(|_| StanzaError::MalformedPrincipal(format!("unknown role '{}'", claims.role)))?;

        let organization_id = match role {
            Role::Superadmin => {
                if claims.organization_id.is_some() {
                    tracing::warn!(user_id = %claims.user_id, "superadmin token carried an organization id; normalizing to global");
                }
                None
            }
            Role::OrgAdmin | Role::OrgMember => {
                let org = claims.organization_id.clone().filter(|o| !o.is_empty());
                Some(org.ok_or_else(|| {
                    StanzaError::MalformedPrincipal(format!(
                        "role {role} requires an organization id"
                    ))
                })?)
            }
        };

        Ok(Self {
            user_id: claims.user_id,
            email: claims.email.clone(),
            role,
            organization_id,
        })
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == Role::Superadmin
    }

    /// True when the principal may act inside the given entity scope.
    /// Superadmins bypass the org match everywhere in this core.
    pub fn acts_for(&self, organization_id: Option<&str>) -> bool {
        self.is_superadmin() || self.organization_id.as_deref() == organization_id
    }
}

/// Verified token payload as produced by the authentication flow.
#[derive(Debug, Clone, Deserialize)]
pub struct PrincipalClaims {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub organization_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use uuid::Uuid;

    fn claims(role: &str, org: Option<&str>) -> PrincipalClaims {
        PrincipalClaims {
            user_id: Uuid::new_v4(),
            email: "alice@example.com".into(),
            role: role.into(),
            organization_id: org.map(String::from),
        }
    }

    #[test]
    fn org_admin_resolves_with_org() {
        let p = Principal::from_claims(&claims("org_admin", Some("org_1"))).unwrap();
        assert_eq!(p.role, Role::OrgAdmin);
        assert_eq!(p.organization_id.as_deref(), Some("org_1"));
    }

    #[test]
    fn org_member_without_org_is_malformed() {
        let err = Principal::from_claims(&claims("org_member", None)).unwrap_err();
        assert!(matches!(err, StanzaError::MalformedPrincipal(_)));
    }

    #[test]
    fn empty_org_counts_as_missing() {
        let err = Principal::from_claims(&claims("org_admin", Some(""))).unwrap_err();
        assert!(matches!(err, StanzaError::MalformedPrincipal(_)));
    }

    #[test]
    fn superadmin_org_is_forced_to_none() {
        let p = Principal::from_claims(&claims("superadmin", Some("org_1"))).unwrap();
        assert_eq!(p.role, Role::Superadmin);
        assert!(p.organization_id.is_none());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = Principal::from_claims(&claims("owner", Some("org_1"))).unwrap_err();
        assert!(matches!(err, StanzaError::MalformedPrincipal(_)));
    }

    #[test]
    fn case_variant_role_is_rejected() {
        for role in ["SUPERADMIN", "Org_Admin", "ORG_MEMBER", "Superadmin"] {
            let err = Principal::from_claims(&claims(role, Some("org_1"))).unwrap_err();
            assert!(matches!(err, StanzaError::MalformedPrincipal(_)), "{role}");
        }
    }

    #[test]
    fn rank_ordering() {
        assert!(Role::Superadmin.at_least(Role::OrgAdmin));
        assert!(Role::OrgAdmin.at_least(Role::OrgMember));
        assert!(!Role::OrgMember.at_least(Role::OrgAdmin));
        for r in Role::iter() {
            assert!(r.at_least(r));
        }
    }

    #[test]
    fn acts_for_own_org_only_unless_superadmin() {
        let member = Principal::from_claims(&claims("org_member", Some("org_1"))).unwrap();
        assert!(member.acts_for(Some("org_1")));
        assert!(!member.acts_for(Some("org_2")));
        assert!(!member.acts_for(None));

        let root = Principal::from_claims(&claims("superadmin", None)).unwrap();
        assert!(root.acts_for(Some("org_1")));
        assert!(root.acts_for(None));
    }

    #[test]
    fn role_display_is_snake_case() {
        assert_eq!(Role::OrgAdmin.to_string(), "org_admin");
        assert_eq!(Role::Superadmin.to_string(), "superadmin");
        assert_eq!(Role::OrgMember.to_string(), "org_member");
    }
}
