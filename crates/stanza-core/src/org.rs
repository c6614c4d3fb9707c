//! Organizations (tenants) and the per-organization permission matrix.
//!
//! The matrix is fail-closed: any `(org, type)` pair not explicitly granted
//! answers `false`. The creatable ⊆ viewable invariant is enforced here,
//! not at call sites — granting create access auto-grants view access, and
//! deserialized matrices are re-normalized the same way.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A tenant. Entities and permissions are partitioned by organization id;
/// a `None` organization on an entity means platform-global scope, which no
/// tenant owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: PermissionMatrix,
}

/// Which entity types a tenant may see and which it may create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPermissionMatrix")]
pub struct PermissionMatrix {
    viewable: BTreeSet<String>,
    creatable: BTreeSet<String>,
}

impl PermissionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_view(&self, type_id: &str) -> bool {
        self.viewable.contains(type_id)
    }

    pub fn can_create(&self, type_id: &str) -> bool {
        self.creatable.contains(type_id)
    }

    pub fn grant_view(&mut self, type_id: impl Into<String>) {
        self.viewable.insert(type_id.into());
    }

    /// Granting create access implies view access.
    pub fn grant_create(&mut self, type_id: impl Into<String>) {
        let type_id = type_id.into();
        self.viewable.insert(type_id.clone());
        self.creatable.insert(type_id);
    }

    /// Revoking view access also revokes create access, never the reverse.
    pub fn revoke_view(&mut self, type_id: &str) {
        self.viewable.remove(type_id);
        self.creatable.remove(type_id);
    }

    pub fn revoke_create(&mut self, type_id: &str) {
        self.creatable.remove(type_id);
    }

    pub fn viewable(&self) -> impl Iterator<Item = &str> {
        self.viewable.iter().map(String::as_str)
    }

    pub fn creatable(&self) -> impl Iterator<Item = &str> {
        self.creatable.iter().map(String::as_str)
    }
}

/// Serialized shape; conversion repairs creatable ⊆ viewable so the
/// invariant holds even for hand-edited or legacy records.
#[derive(Debug, Default, Deserialize)]
struct RawPermissionMatrix {
    #[serde(default)]
    viewable: BTreeSet<String>,
    #[serde(default)]
    creatable: BTreeSet<String>,
}

impl From<RawPermissionMatrix> for PermissionMatrix {
    fn from(raw: RawPermissionMatrix) -> Self {
        let mut viewable = raw.viewable;
        viewable.extend(raw.creatable.iter().cloned());
        Self {
            viewable,
            creatable: raw.creatable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fail_closed() {
        let m = PermissionMatrix::new();
        assert!(!m.can_view("articles"));
        assert!(!m.can_create("articles"));
    }

    #[test]
    fn grant_view_does_not_grant_create() {
        let mut m = PermissionMatrix::new();
        m.grant_view("articles");
        assert!(m.can_view("articles"));
        assert!(!m.can_create("articles"));
    }

    #[test]
    fn grant_create_implies_view() {
        let mut m = PermissionMatrix::new();
        m.grant_create("articles");
        assert!(m.can_view("articles"));
        assert!(m.can_create("articles"));
    }

    #[test]
    fn revoke_view_also_revokes_create() {
        let mut m = PermissionMatrix::new();
        m.grant_create("articles");
        m.revoke_view("articles");
        assert!(!m.can_view("articles"));
        assert!(!m.can_create("articles"));
    }

    #[test]
    fn revoke_create_keeps_view() {
        let mut m = PermissionMatrix::new();
        m.grant_create("articles");
        m.revoke_create("articles");
        assert!(m.can_view("articles"));
        assert!(!m.can_create("articles"));
    }

    #[test]
    fn deserialization_repairs_subset_invariant() {
        let m: PermissionMatrix = serde_json::from_value(serde_json::json!({
            "viewable": ["pages"],
            "creatable": ["articles"]
        }))
        .unwrap();
        // creatable without viewable is auto-added to viewable
        assert!(m.can_view("articles"));
        assert!(m.can_create("articles"));
        assert!(m.can_view("pages"));
        assert!(!m.can_create("pages"));
    }

    #[test]
    fn invariant_holds_after_any_mutation_sequence() {
        let mut m = PermissionMatrix::new();
        m.grant_create("a");
        m.grant_view("b");
        m.grant_create("b");
        m.revoke_view("a");
        m.grant_create("c");
        m.revoke_create("b");
        for t in m.creatable().collect::<Vec<_>>() {
            assert!(m.can_view(t), "creatable type {t} must be viewable");
        }
    }

    #[test]
    fn organization_permissions_default_empty() {
        let org: Organization = serde_json::from_value(serde_json::json!({
            "id": "org_1",
            "name": "Acme"
        }))
        .unwrap();
        assert!(!org.permissions.can_view("articles"));
    }
}
