//! Declarative world definitions loaded from TOML.
//!
//! ```toml
//! [enumerations]
//! organization = ["none", "order", "army", "clan"]
//!
//! [classes.character]
//! IS_ALIVE = { kind = "bool", default = true }
//!
//! [classes.player]
//! IS_ALIVE = { kind = "bool", default = true }
//! ALLIANCE = { kind = "organization" }
//!
//! [entities.PLAYER]
//! class = "player"
//!
//! [entities.GENERAL]
//! class = "character"
//! defaults = { IS_ALIVE = false }
//! ```
//!
//! Kinds are `bool`, `int`, `string`, or the name of a declared enumeration.
//! A missing default falls back to `false`, `0`, `""`, or the first variant.

use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::Arc;

use super::Context;
use crate::entities::{EntityClass, Enumeration, Value, ValueKind};
use crate::error::{ModelError, Result};

/// Declaration of one property inside a class table.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDefinition {
    pub kind: String,
    #[serde(default)]
    pub default: Option<toml::Value>,
}

/// Declaration of one entity: its class and optional default overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDefinition {
    pub class: String,
    #[serde(default)]
    pub defaults: IndexMap<String, toml::Value>,
}

/// A complete world declaration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldDefinition {
    #[serde(default)]
    pub enumerations: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub classes: IndexMap<String, IndexMap<String, PropertyDefinition>>,
    #[serde(default)]
    pub entities: IndexMap<String, EntityDefinition>,
}

impl WorldDefinition {
    /// Parse a definition from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Validate the definition and build the declared enumerations.
    pub fn enumerations(&self) -> Result<IndexMap<String, Arc<Enumeration>>> {
        let mut declared = IndexMap::new();
        for (name, variants) in &self.enumerations {
            if matches!(name.as_str(), "bool" | "int" | "string") {
                return Err(ModelError::DuplicateEnumeration(name.clone()));
            }
            declared.insert(name.clone(), Enumeration::new(name.clone(), variants.clone())?);
        }
        Ok(declared)
    }

    /// Validate the definition and build the context it describes.
    pub fn to_context(&self) -> Result<Context> {
        let enumerations = self.enumerations()?;

        let mut classes = IndexMap::new();
        for (class_name, properties) in &self.classes {
            let mut class = EntityClass::new(class_name.clone());
            for (property, definition) in properties {
                let kind = resolve_kind(&definition.kind, &enumerations)?;
                let default = match &definition.default {
                    Some(literal) => convert(property, &kind, literal)?,
                    None => zero_value(&kind),
                };
                class.add_property(property.clone(), kind, default)?;
            }
            classes.insert(class_name.clone(), class);
        }

        let mut context = Context::new();
        for (entity, definition) in &self.entities {
            let class = classes
                .get(&definition.class)
                .ok_or_else(|| ModelError::UnknownClass(definition.class.clone()))?;
            context.add_entity(entity.clone(), class)?;
            for (property, literal) in &definition.defaults {
                let kind = class
                    .property(property)
                    .map(|p| p.kind.clone())
                    .ok_or_else(|| ModelError::UnknownProperty {
                        entity: entity.clone(),
                        property: property.clone(),
                    })?;
                context.set_default(entity, property, convert(property, &kind, literal)?)?;
            }
        }
        Ok(context)
    }
}

impl Context {
    /// Parse and validate a TOML world definition.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        WorldDefinition::from_toml_str(text)?.to_context()
    }
}

fn resolve_kind(name: &str, enumerations: &IndexMap<String, Arc<Enumeration>>) -> Result<ValueKind> {
    match name {
        "bool" => Ok(ValueKind::Bool),
        "int" => Ok(ValueKind::Int),
        "string" => Ok(ValueKind::Str),
        other => enumerations
            .get(other)
            .map(|e| ValueKind::Enum(Arc::clone(e)))
            .ok_or_else(|| ModelError::UnknownKind(other.to_string())),
    }
}

fn zero_value(kind: &ValueKind) -> Value {
    match kind {
        ValueKind::Bool => Value::Bool(false),
        ValueKind::Int => Value::Int(0),
        ValueKind::Str => Value::Str(String::new()),
        ValueKind::Enum(e) => e.first(),
    }
}

fn convert(property: &str, kind: &ValueKind, literal: &toml::Value) -> Result<Value> {
    let invalid = |reason: String| ModelError::InvalidDefault {
        property: property.to_string(),
        reason,
    };
    match (kind, literal) {
        (ValueKind::Bool, toml::Value::Boolean(b)) => Ok(Value::Bool(*b)),
        (ValueKind::Int, toml::Value::Integer(i)) => Ok(Value::Int(*i)),
        (ValueKind::Str, toml::Value::String(s)) => Ok(Value::Str(s.clone())),
        (ValueKind::Enum(e), toml::Value::String(s)) => e.value(s),
        (kind, literal) => Err(invalid(format!(
            "expected a {} literal, found {}",
            kind,
            literal.type_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLEGIANCE: &str = r#"
        [enumerations]
        organization = ["none", "order", "army", "clan"]
        world_status = ["none", "anarchy", "tyranny", "freedom"]

        [classes.character]
        IS_ALIVE = { kind = "bool", default = true }

        [classes.player]
        IS_ALIVE = { kind = "bool", default = true }
        ALLIANCE = { kind = "organization" }

        [classes.world]
        STATUS = { kind = "world_status", default = "none" }

        [entities.PLAYER]
        class = "player"

        [entities.PRECEPTOR]
        class = "character"

        [entities.GENERAL]
        class = "character"
        defaults = { IS_ALIVE = false }

        [entities.WORLD]
        class = "world"
    "#;

    #[test]
    fn test_context_from_toml() {
        let context = Context::from_toml_str(ALLEGIANCE).unwrap();
        let state = context.initial_state();

        assert!(context.has_entity("PRECEPTOR"));
        assert_eq!(state.variant("PLAYER", "ALLIANCE").unwrap(), "none");
        assert!(state.bool("PRECEPTOR", "IS_ALIVE").unwrap());
        assert!(!state.bool("GENERAL", "IS_ALIVE").unwrap());
        assert!(state.is("WORLD", "STATUS", "none").unwrap());
    }

    #[test]
    fn test_unknown_kind() {
        let err = Context::from_toml_str(
            r#"
            [classes.player]
            MOOD = { kind = "feelings" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::UnknownKind(k) if k == "feelings"));
    }

    #[test]
    fn test_unknown_class() {
        let err = Context::from_toml_str(
            r#"
            [entities.PLAYER]
            class = "hero"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::UnknownClass(c) if c == "hero"));
    }

    #[test]
    fn test_default_of_wrong_kind() {
        let err = Context::from_toml_str(
            r#"
            [classes.world]
            DAYS = { kind = "int", default = "five" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidDefault { .. }));
    }

    #[test]
    fn test_override_of_undeclared_property() {
        let err = Context::from_toml_str(
            r#"
            [classes.world]
            DAYS = { kind = "int" }

            [entities.WORLD]
            class = "world"
            defaults = { YEARS = 3 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::UnknownProperty { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Context::from_toml_str("[classes.world\nDAYS = 1").unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }
}
