//! Narrative contexts and the immutable states generated from them.
//!
//! A [`Context`] fixes the shape of the world: which entities exist and which
//! class (with which defaults) each one instantiates. A [`State`] is one
//! valuation of every property of every entity. States are values: they are
//! never mutated, every edit produces a new state, and two states are equal
//! exactly when all their property values are equal, however they were
//! reached.

mod definition;

pub use definition::*;

use indexmap::IndexMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::entities::{Entity, EntityClass, Value, ValueKind};
use crate::error::{ModelError, Result};

/// A named mapping of entity name to [`EntityClass`].
///
/// Each entity keeps its own copy of the class so per-entity default
/// overrides never leak back into the shared class declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    entities: IndexMap<String, EntityClass>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an entity instantiating `class`.
    pub fn add_entity(&mut self, name: impl Into<String>, class: &EntityClass) -> Result<()> {
        let name = name.into();
        if self.entities.contains_key(&name) {
            return Err(ModelError::DuplicateEntity(name));
        }
        self.entities.insert(name, class.clone());
        Ok(())
    }

    /// Builder form of [`add_entity`](Self::add_entity).
    pub fn with_entity(mut self, name: impl Into<String>, class: &EntityClass) -> Result<Self> {
        self.add_entity(name, class)?;
        Ok(self)
    }

    /// Override the default value of one entity's property.
    pub fn set_default(
        &mut self,
        entity: &str,
        property: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.entities
            .get_mut(entity)
            .ok_or_else(|| ModelError::UnknownEntity(entity.to_string()))?
            .set_default(property, value)
    }

    /// Remove an entity declaration.
    pub fn remove_entity(&mut self, name: &str) -> Result<EntityClass> {
        self.entities
            .shift_remove(name)
            .ok_or_else(|| ModelError::UnknownEntity(name.to_string()))
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// The class (with overridden defaults) of an entity.
    pub fn entity_class(&self, name: &str) -> Option<&EntityClass> {
        self.entities.get(name)
    }

    /// Iterate over entity declarations in declaration order.
    pub fn entities(&self) -> impl Iterator<Item = (&str, &EntityClass)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The state holding every entity's default values.
    pub fn initial_state(&self) -> State {
        let layout = Arc::new(StateLayout::from_context(self));
        let values = self
            .entities
            .values()
            .flat_map(|class| class.properties().map(|p| p.default.clone()))
            .collect();
        State::from_parts(layout, values)
    }
}

/// One (entity, property) position in a state's value vector.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    entity: String,
    property: String,
    kind: ValueKind,
}

#[derive(Debug)]
struct EntityLayout {
    class: EntityClass,
    offset: usize,
}

/// Canonical flattening of a context into value slots.
#[derive(Debug)]
struct StateLayout {
    slots: Vec<Slot>,
    entities: IndexMap<String, EntityLayout>,
}

impl StateLayout {
    fn from_context(context: &Context) -> Self {
        let mut slots = Vec::new();
        let mut entities = IndexMap::new();
        for (name, class) in &context.entities {
            entities.insert(
                name.clone(),
                EntityLayout {
                    class: class.clone(),
                    offset: slots.len(),
                },
            );
            slots.extend(class.properties().map(|p| Slot {
                entity: name.clone(),
                property: p.name.clone(),
                kind: p.kind.clone(),
            }));
        }
        Self { slots, entities }
    }

    fn entity(&self, entity: &str) -> Result<&EntityLayout> {
        self.entities
            .get(entity)
            .ok_or_else(|| ModelError::UnknownEntity(entity.to_string()))
    }

    fn slot(&self, entity: &str, property: &str) -> Result<usize> {
        let layout = self.entity(entity)?;
        let index = layout
            .class
            .property_index(property)
            .ok_or_else(|| ModelError::UnknownProperty {
                entity: entity.to_string(),
                property: property.to_string(),
            })?;
        Ok(layout.offset + index)
    }
}

// Defaults do not take part in state identity, only the slot shape does.
impl PartialEq for StateLayout {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

/// One immutable valuation of every entity in a [`Context`].
///
/// The structural hash is computed once on construction. Equality compares
/// the cached hash first and only falls back to a component-wise comparison
/// when the hashes agree.
#[derive(Debug, Clone)]
pub struct State {
    layout: Arc<StateLayout>,
    values: Arc<[Value]>,
    fingerprint: u64,
}

impl State {
    /// The default state of `context`.
    pub fn new(context: &Context) -> Self {
        context.initial_state()
    }

    fn from_parts(layout: Arc<StateLayout>, values: Vec<Value>) -> Self {
        let mut hasher = DefaultHasher::new();
        values.hash(&mut hasher);
        Self {
            layout,
            values: values.into(),
            fingerprint: hasher.finish(),
        }
    }

    /// Cached structural hash of the valuation.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn has_entity(&self, entity: &str) -> bool {
        self.layout.entities.contains_key(entity)
    }

    /// Read a property value.
    pub fn get(&self, entity: &str, property: &str) -> Result<&Value> {
        let slot = self.layout.slot(entity, property)?;
        Ok(&self.values[slot])
    }

    /// Read a boolean property.
    pub fn bool(&self, entity: &str, property: &str) -> Result<bool> {
        let value = self.get(entity, property)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch(property, ValueKind::Bool, value))
    }

    /// Read an integer property.
    pub fn int(&self, entity: &str, property: &str) -> Result<i64> {
        let value = self.get(entity, property)?;
        value
            .as_int()
            .ok_or_else(|| mismatch(property, ValueKind::Int, value))
    }

    /// Read a string property.
    pub fn string(&self, entity: &str, property: &str) -> Result<&str> {
        let value = self.get(entity, property)?;
        value
            .as_str()
            .ok_or_else(|| mismatch(property, ValueKind::Str, value))
    }

    /// Read the variant name of an enumeration property.
    pub fn variant(&self, entity: &str, property: &str) -> Result<&str> {
        let value = self.get(entity, property)?;
        value
            .as_enum()
            .map(|v| v.variant())
            .ok_or_else(|| ModelError::NotAnEnumeration {
                property: property.to_string(),
                found: value.kind(),
            })
    }

    /// Whether an enumeration property currently holds `variant`.
    ///
    /// Fails if `variant` is not declared by the property's enumeration, so a
    /// misspelled variant cannot silently evaluate to `false`.
    pub fn is(&self, entity: &str, property: &str, variant: &str) -> Result<bool> {
        let value = self.get(entity, property)?;
        let current = value.as_enum().ok_or_else(|| ModelError::NotAnEnumeration {
            property: property.to_string(),
            found: value.kind(),
        })?;
        let index = current
            .enumeration()
            .index_of(variant)
            .ok_or_else(|| ModelError::UnknownVariant {
                enumeration: current.enumeration().name().to_string(),
                variant: variant.to_string(),
            })?;
        Ok(current.index() == index)
    }

    /// Snapshot of one entity.
    pub fn entity(&self, entity: &str) -> Result<Entity> {
        let layout = self.layout.entity(entity)?;
        let end = layout.offset + layout.class.property_count();
        Ok(Entity::from_values(
            layout.class.clone(),
            &self.values[layout.offset..end],
        ))
    }

    /// Entity names in declaration order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.layout.entities.keys().map(String::as_str)
    }

    /// Every `(entity, property, value)` triple in canonical order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.layout
            .slots
            .iter()
            .zip(self.values.iter())
            .map(|(slot, value)| (slot.entity.as_str(), slot.property.as_str(), value))
    }

    /// Start building a successor state.
    pub fn edit(&self) -> StateEditor {
        StateEditor {
            layout: Arc::clone(&self.layout),
            values: self.values.to_vec(),
        }
    }

    /// The successor state with a single property changed.
    pub fn with(&self, entity: &str, property: &str, value: impl Into<Value>) -> Result<State> {
        Ok(self.edit().set(entity, property, value)?.finish())
    }

    /// The successor state with an enumeration property set to `variant`.
    pub fn with_variant(&self, entity: &str, property: &str, variant: &str) -> Result<State> {
        Ok(self.edit().set_variant(entity, property, variant)?.finish())
    }
}

fn mismatch(property: &str, expected: ValueKind, value: &Value) -> ModelError {
    ModelError::KindMismatch {
        property: property.to_string(),
        expected,
        found: value.kind(),
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
            && (Arc::ptr_eq(&self.values, &other.values) || self.values == other.values)
            && (Arc::ptr_eq(&self.layout, &other.layout) || self.layout == other.layout)
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint);
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (name, layout)) in self.layout.entities.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{} {{", name)?;
            for (j, p) in layout.class.properties().enumerate() {
                let sep = if j == 0 { " " } else { ", " };
                write!(f, "{}{}: {}", sep, p.name, self.values[layout.offset + j])?;
            }
            write!(f, " }}")?;
        }
        Ok(())
    }
}

/// Accumulates property changes and produces a new [`State`].
#[derive(Debug)]
pub struct StateEditor {
    layout: Arc<StateLayout>,
    values: Vec<Value>,
}

impl StateEditor {
    /// Assign a property. The value must match the declared kind.
    pub fn set(mut self, entity: &str, property: &str, value: impl Into<Value>) -> Result<Self> {
        let slot = self.layout.slot(entity, property)?;
        let value = value.into();
        self.layout.slots[slot].kind.check(property, &value)?;
        self.values[slot] = value;
        Ok(self)
    }

    /// Assign an enumeration property by variant name.
    pub fn set_variant(mut self, entity: &str, property: &str, variant: &str) -> Result<Self> {
        let slot = self.layout.slot(entity, property)?;
        let value = match &self.layout.slots[slot].kind {
            ValueKind::Enum(enumeration) => enumeration.value(variant)?,
            other => {
                return Err(ModelError::NotAnEnumeration {
                    property: property.to_string(),
                    found: other.clone(),
                })
            }
        };
        self.values[slot] = value;
        Ok(self)
    }

    /// Finish editing.
    pub fn finish(self) -> State {
        State::from_parts(self.layout, self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Enumeration;
    use std::collections::HashSet;

    fn crafting_context() -> Context {
        let player = EntityClass::new("player")
            .with_property("WOOD", ValueKind::Int, 0)
            .unwrap()
            .with_property("METAL", ValueKind::Int, 0)
            .unwrap();
        let world = EntityClass::new("world")
            .with_property("REMAINING_DAYS", ValueKind::Int, 5)
            .unwrap();

        Context::new()
            .with_entity("PLAYER", &player)
            .unwrap()
            .with_entity("WORLD", &world)
            .unwrap()
    }

    #[test]
    fn test_initial_state_uses_defaults() {
        let state = crafting_context().initial_state();
        assert_eq!(state.int("PLAYER", "WOOD").unwrap(), 0);
        assert_eq!(state.int("WORLD", "REMAINING_DAYS").unwrap(), 5);
    }

    #[test]
    fn test_entity_default_override() {
        let mut context = crafting_context();
        context.set_default("WORLD", "REMAINING_DAYS", 2).unwrap();

        assert_eq!(context.initial_state().int("WORLD", "REMAINING_DAYS").unwrap(), 2);
        assert!(context.set_default("WORLD", "REMAINING_DAYS", true).is_err());
        assert!(matches!(
            context.set_default("NOBODY", "X", 1),
            Err(ModelError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let mut context = crafting_context();
        let class = EntityClass::new("other");
        assert!(matches!(
            context.add_entity("PLAYER", &class),
            Err(ModelError::DuplicateEntity(_))
        ));
    }

    #[test]
    fn test_edit_produces_new_state() {
        let start = crafting_context().initial_state();
        let next = start.with("PLAYER", "WOOD", 7).unwrap();

        assert_eq!(start.int("PLAYER", "WOOD").unwrap(), 0);
        assert_eq!(next.int("PLAYER", "WOOD").unwrap(), 7);
        assert_ne!(start, next);
    }

    #[test]
    fn test_structural_equality_ignores_history() {
        let start = crafting_context().initial_state();
        let a = start
            .with("PLAYER", "WOOD", 7)
            .unwrap()
            .with("PLAYER", "METAL", 5)
            .unwrap();
        let b = start
            .edit()
            .set("PLAYER", "METAL", 5)
            .unwrap()
            .set("PLAYER", "WOOD", 7)
            .unwrap()
            .finish();

        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());

        let set: HashSet<State> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_states_from_separate_context_builds_are_equal() {
        assert_eq!(
            crafting_context().initial_state(),
            crafting_context().initial_state()
        );
    }

    #[test]
    fn test_kind_mismatch_on_edit() {
        let start = crafting_context().initial_state();
        let err = start.with("PLAYER", "WOOD", "lots").unwrap_err();
        assert!(matches!(err, ModelError::KindMismatch { .. }));
    }

    #[test]
    fn test_unknown_entity_and_property() {
        let start = crafting_context().initial_state();
        assert!(matches!(
            start.get("DRAGON", "HP"),
            Err(ModelError::UnknownEntity(name)) if name == "DRAGON"
        ));
        assert!(matches!(
            start.get("PLAYER", "GOLD"),
            Err(ModelError::UnknownProperty { property, .. }) if property == "GOLD"
        ));
        assert!(start.bool("PLAYER", "WOOD").is_err());
    }

    #[test]
    fn test_enumeration_accessors() {
        let org = Enumeration::new("organization", ["none", "army", "clan"]).unwrap();
        let player = EntityClass::new("player")
            .with_property("ALLIANCE", ValueKind::Enum(org.clone()), org.first())
            .unwrap();
        let context = Context::new().with_entity("PLAYER", &player).unwrap();

        let state = context
            .initial_state()
            .with("PLAYER", "ALLIANCE", org.value("army").unwrap())
            .unwrap();

        assert_eq!(state.variant("PLAYER", "ALLIANCE").unwrap(), "army");
        assert!(state.is("PLAYER", "ALLIANCE", "army").unwrap());
        assert!(!state.is("PLAYER", "ALLIANCE", "clan").unwrap());
        assert!(matches!(
            state.is("PLAYER", "ALLIANCE", "navy"),
            Err(ModelError::UnknownVariant { .. })
        ));

        let clan = state.with_variant("PLAYER", "ALLIANCE", "clan").unwrap();
        assert!(clan.is("PLAYER", "ALLIANCE", "clan").unwrap());
        assert!(state.with_variant("PLAYER", "ALLIANCE", "navy").is_err());
    }

    #[test]
    fn test_entity_snapshot() {
        let state = crafting_context()
            .initial_state()
            .with("PLAYER", "METAL", 5)
            .unwrap();
        let mut player = state.entity("PLAYER").unwrap();
        assert_eq!(player.get("METAL").unwrap().as_int(), Some(5));

        // Mutating the snapshot leaves the state untouched.
        player.set("METAL", 0).unwrap();
        assert_eq!(state.int("PLAYER", "METAL").unwrap(), 5);
    }

    #[test]
    fn test_display() {
        let state = crafting_context().initial_state();
        assert_eq!(
            state.to_string(),
            "PLAYER { WOOD: 0, METAL: 0 } WORLD { REMAINING_DAYS: 5 }"
        );
    }
}
