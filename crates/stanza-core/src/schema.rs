//! Field-schema gate for `submit_for_approval`.
//!
//! Schema authoring and full validation belong to the type-definition
//! subsystem; this module carries just enough to gate a submit: required
//! fields present, constraint ranges satisfied. Unknown types fail closed.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// A single unresolved validation problem on a dynamic field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Constraint on a dynamic field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FieldConstraint {
    NumberRange { min: f64, max: f64 },
    MaxLength { max: usize },
    OneOf { values: Vec<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub constraint: Option<FieldConstraint>,
}

/// Schema governing one entity type's dynamic field set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTypeSchema {
    pub type_id: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl EntityTypeSchema {
    /// Check `data` against this schema. Empty result means the submit gate
    /// passes.
    pub fn violations(&self, data: &serde_json::Map<String, serde_json::Value>) -> Vec<FieldViolation> {
        let mut out = Vec::new();
        for field in &self.fields {
            let value = data.get(&field.name).filter(|v| !v.is_null());
            let Some(value) = value else {
                if field.required {
                    out.push(FieldViolation {
                        field: field.name.clone(),
                        message: "required field is missing".into(),
                    });
                }
                continue;
            };
            if let Some(constraint) = &field.constraint {
                if let Some(message) = constraint_violation(constraint, value) {
                    out.push(FieldViolation {
                        field: field.name.clone(),
                        message,
                    });
                }
            }
        }
        out
    }
}

fn constraint_violation(constraint: &FieldConstraint, value: &serde_json::Value) -> Option<String> {
    match constraint {
        FieldConstraint::NumberRange { min, max } => {
            let Some(n) = value.as_f64() else {
                return Some("expected a number".into());
            };
            (n < *min || n > *max).then(|| format!("{n} outside range {min}..={max}"))
        }
        FieldConstraint::MaxLength { max } => {
            let Some(s) = value.as_str() else {
                return Some("expected a string".into());
            };
            (s.chars().count() > *max).then(|| format!("longer than {max} characters"))
        }
        FieldConstraint::OneOf { values } => {
            let Some(s) = value.as_str() else {
                return Some("expected a string".into());
            };
            (!values.iter().any(|v| v == s)).then(|| format!("'{s}' is not an allowed value"))
        }
    }
}

/// Port the transition engine gates `submit_for_approval` through.
pub trait SchemaGate: Send + Sync {
    fn violations(&self, entity: &Entity) -> Vec<FieldViolation>;
}

/// In-memory `SchemaGate` over a set of type schemas. A type with no
/// registered schema fails closed — submits for it are blocked until the
/// type-definition subsystem supplies one.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: std::collections::BTreeMap<String, EntityTypeSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: EntityTypeSchema) {
        self.schemas.insert(schema.type_id.clone(), schema);
    }
}

impl SchemaGate for SchemaRegistry {
    fn violations(&self, entity: &Entity) -> Vec<FieldViolation> {
        match self.schemas.get(&entity.entity_type_id) {
            Some(schema) => schema.violations(&entity.data),
            None => vec![FieldViolation {
                field: "entity_type_id".into(),
                message: format!("no schema registered for type '{}'", entity.entity_type_id),
            }],
        }
    }
}

/// Gate that passes everything. For embedders that run schema validation
/// upstream and only need the lifecycle semantics.
#[derive(Debug, Default)]
pub struct PermissiveGate;

impl SchemaGate for PermissiveGate {
    fn violations(&self, _entity: &Entity) -> Vec<FieldViolation> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> EntityTypeSchema {
        EntityTypeSchema {
            type_id: "articles".into(),
            fields: vec![
                FieldDef {
                    name: "title".into(),
                    required: true,
                    constraint: Some(FieldConstraint::MaxLength { max: 10 }),
                },
                FieldDef {
                    name: "rating".into(),
                    required: false,
                    constraint: Some(FieldConstraint::NumberRange { min: 1.0, max: 5.0 }),
                },
                FieldDef {
                    name: "section".into(),
                    required: false,
                    constraint: Some(FieldConstraint::OneOf {
                        values: vec!["news".into(), "opinion".into()],
                    }),
                },
            ],
        }
    }

    fn data(v: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn missing_required_field() {
        let v = schema().violations(&data(json!({})));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].field, "title");
    }

    #[test]
    fn null_counts_as_missing() {
        let v = schema().violations(&data(json!({"title": null})));
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn optional_field_may_be_absent() {
        let v = schema().violations(&data(json!({"title": "ok"})));
        assert!(v.is_empty());
    }

    #[test]
    fn number_range_enforced() {
        let v = schema().violations(&data(json!({"title": "ok", "rating": 9})));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].field, "rating");
        let v = schema().violations(&data(json!({"title": "ok", "rating": 5})));
        assert!(v.is_empty());
    }

    #[test]
    fn max_length_enforced() {
        let v = schema().violations(&data(json!({"title": "way too long title"})));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].field, "title");
    }

    #[test]
    fn one_of_enforced() {
        let v = schema().violations(&data(json!({"title": "ok", "section": "sports"})));
        assert_eq!(v.len(), 1);
        let v = schema().violations(&data(json!({"title": "ok", "section": "news"})));
        assert!(v.is_empty());
    }

    #[test]
    fn wrong_type_is_a_violation() {
        let v = schema().violations(&data(json!({"title": 42})));
        assert_eq!(v.len(), 1);
    }

    fn entity_fixture() -> Entity {
        Entity {
            id: "abc1234".parse().unwrap(),
            organization_id: Some("org_1".into()),
            entity_type_id: "articles".into(),
            name: "Hello".into(),
            slug: "hello".into(),
            status: crate::entity::EntityStatus::Draft,
            visibility: crate::entity::Visibility::Public,
            data: serde_json::Map::new(),
            version: 1,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn registry_fails_closed_for_unknown_type() {
        let registry = SchemaRegistry::new();
        let v = registry.violations(&entity_fixture());
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].field, "entity_type_id");
    }

    #[test]
    fn registry_delegates_to_registered_schema() {
        let mut registry = SchemaRegistry::new();
        registry.register(schema());
        let mut entity = entity_fixture();
        entity.data = data(json!({"title": "ok"}));
        assert!(registry.violations(&entity).is_empty());
    }

    #[test]
    fn permissive_gate_passes_everything() {
        assert!(PermissiveGate.violations(&entity_fixture()).is_empty());
    }
}
