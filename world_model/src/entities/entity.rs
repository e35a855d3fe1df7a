//! Entity instances.

use indexmap::IndexMap;

use super::{EntityClass, Value};
use crate::error::{ModelError, Result};

/// An [`EntityClass`] together with a concrete valuation of its properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    class: EntityClass,
    valuation: IndexMap<String, Value>,
}

impl Entity {
    /// Create an entity holding the class defaults.
    pub fn new(class: EntityClass) -> Self {
        let valuation = class
            .properties()
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect();
        Self { class, valuation }
    }

    pub(crate) fn from_values<'a>(
        class: EntityClass,
        values: impl IntoIterator<Item = &'a Value>,
    ) -> Self {
        let valuation = class
            .properties()
            .map(|p| p.name.clone())
            .zip(values.into_iter().cloned())
            .collect();
        Self { class, valuation }
    }

    pub fn class(&self) -> &EntityClass {
        &self.class
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.valuation.contains_key(property)
    }

    /// Read a property value.
    pub fn get(&self, property: &str) -> Result<&Value> {
        self.valuation
            .get(property)
            .ok_or_else(|| self.unknown(property))
    }

    /// Assign a property value. The value must match the declared kind.
    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let schema = self
            .class
            .property(property)
            .ok_or_else(|| self.unknown(property))?;
        schema.kind.check(property, &value)?;
        self.valuation.insert(property.to_string(), value);
        Ok(())
    }

    /// Current values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.valuation.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn unknown(&self, property: &str) -> ModelError {
        ModelError::UnknownProperty {
            entity: self.class.name().to_string(),
            property: property.to_string(),
        }
    }
}
