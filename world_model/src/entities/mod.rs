//! Entity classes: typed property schemas with default values.

mod entity;
mod value;

pub use entity::*;
pub use value::*;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{ModelError, Result};

/// Declaration of a single property: its kind and default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySchema {
    pub name: String,
    pub kind: ValueKind,
    pub default: Value,
}

/// A named, ordered mapping of property name to [`PropertySchema`].
///
/// Defaults are kind-checked when they are declared, so every
/// [`Entity`] instantiated from a class starts out well-typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityClass {
    name: String,
    properties: IndexMap<String, PropertySchema>,
}

impl EntityClass {
    /// Create a new class without properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    /// Copy `parent` under a new name so it can be extended.
    pub fn inherit_from(parent: &EntityClass, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: parent.properties.clone(),
        }
    }

    /// Declare a property of the given kind.
    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        kind: ValueKind,
        default: impl Into<Value>,
    ) -> Result<()> {
        let name = name.into();
        if self.properties.contains_key(&name) {
            return Err(ModelError::DuplicateProperty(name));
        }
        let default = default.into();
        kind.check(&name, &default)?;
        self.properties.insert(
            name.clone(),
            PropertySchema {
                name,
                kind,
                default,
            },
        );
        Ok(())
    }

    /// Builder form of [`add_property`](Self::add_property).
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        kind: ValueKind,
        default: impl Into<Value>,
    ) -> Result<Self> {
        self.add_property(name, kind, default)?;
        Ok(self)
    }

    /// Remove a property declaration.
    pub fn remove_property(&mut self, name: &str) -> Result<PropertySchema> {
        self.properties
            .shift_remove(name)
            .ok_or_else(|| self.unknown(name))
    }

    /// Change the default value of an existing property.
    pub fn set_default(&mut self, name: &str, default: impl Into<Value>) -> Result<()> {
        let default = default.into();
        let unknown = self.unknown(name);
        let schema = self.properties.get_mut(name).ok_or(unknown)?;
        schema.kind.check(name, &default)?;
        schema.default = default;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a property declaration.
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    /// Position of a property in declaration order.
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.get_index_of(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// All property declarations in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertySchema> {
        self.properties.values()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Create an instance holding every default value.
    pub fn instantiate(&self) -> Entity {
        Entity::new(self.clone())
    }

    fn unknown(&self, property: &str) -> ModelError {
        ModelError::UnknownProperty {
            entity: self.name.clone(),
            property: property.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character() -> EntityClass {
        EntityClass::new("character")
            .with_property("IS_ALIVE", ValueKind::Bool, true)
            .unwrap()
    }

    #[test]
    fn test_add_property() {
        let class = character();
        assert!(class.has_property("IS_ALIVE"));
        assert_eq!(class.property("IS_ALIVE").unwrap().default, Value::Bool(true));
        assert_eq!(class.property_count(), 1);
    }

    #[test]
    fn test_default_kind_checked_at_declaration() {
        let mut class = EntityClass::new("world");
        let err = class.add_property("DAYS", ValueKind::Int, "five").unwrap_err();
        assert!(matches!(err, ModelError::KindMismatch { .. }));
        assert!(!class.has_property("DAYS"));
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let mut class = character();
        let err = class
            .add_property("IS_ALIVE", ValueKind::Bool, false)
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateProperty(name) if name == "IS_ALIVE"));
    }

    #[test]
    fn test_inherit_from() {
        let org = Enumeration::new("organization", ["none", "army"]).unwrap();
        let base = character();
        let player = EntityClass::inherit_from(&base, "player")
            .with_property("ALLIANCE", ValueKind::Enum(org.clone()), org.first())
            .unwrap();

        assert_eq!(player.name(), "player");
        assert!(player.has_property("IS_ALIVE"));
        assert!(player.has_property("ALLIANCE"));
        // The parent is untouched.
        assert!(!base.has_property("ALLIANCE"));
    }

    #[test]
    fn test_set_default_and_remove() {
        let mut class = character();
        class.set_default("IS_ALIVE", false).unwrap();
        assert_eq!(class.property("IS_ALIVE").unwrap().default, Value::Bool(false));

        assert!(class.set_default("IS_ALIVE", 3).is_err());
        assert!(class.set_default("MISSING", true).is_err());

        class.remove_property("IS_ALIVE").unwrap();
        assert!(!class.has_property("IS_ALIVE"));
        assert!(class.remove_property("IS_ALIVE").is_err());
    }
}
