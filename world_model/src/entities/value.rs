//! Property values and their kinds.

use serde::{Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{ModelError, Result};

/// A closed, named set of variants (e.g. `organization = none | order | army | clan`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enumeration {
    name: String,
    variants: Vec<String>,
}

impl Enumeration {
    /// Declare a new enumeration. At least one variant is required.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Result<Arc<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let variants: Vec<String> = variants.into_iter().map(Into::into).collect();
        if variants.is_empty() {
            return Err(ModelError::EmptyEnumeration(name));
        }
        Ok(Arc::new(Self { name, variants }))
    }

    /// Name of the enumeration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared variants in declaration order.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Position of a variant, if declared.
    pub fn index_of(&self, variant: &str) -> Option<usize> {
        self.variants.iter().position(|v| v == variant)
    }

    /// Build a value holding the named variant.
    pub fn value(self: &Arc<Self>, variant: &str) -> Result<Value> {
        let index = self
            .index_of(variant)
            .ok_or_else(|| ModelError::UnknownVariant {
                enumeration: self.name.clone(),
                variant: variant.to_string(),
            })?;
        Ok(Value::Enum(EnumValue {
            enumeration: Arc::clone(self),
            index,
        }))
    }

    /// Value holding the first declared variant.
    pub fn first(self: &Arc<Self>) -> Value {
        Value::Enum(EnumValue {
            enumeration: Arc::clone(self),
            index: 0,
        })
    }
}

/// One variant of an [`Enumeration`], stored as its index.
#[derive(Debug, Clone)]
pub struct EnumValue {
    enumeration: Arc<Enumeration>,
    index: usize,
}

impl EnumValue {
    /// The enumeration this value belongs to.
    pub fn enumeration(&self) -> &Arc<Enumeration> {
        &self.enumeration
    }

    /// Variant index within the enumeration.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Variant name.
    pub fn variant(&self) -> &str {
        // index is validated on construction
        &self.enumeration.variants[self.index]
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && (Arc::ptr_eq(&self.enumeration, &other.enumeration)
                || self.enumeration == other.enumeration)
    }
}

impl Eq for EnumValue {}

impl Hash for EnumValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.enumeration.name.hash(state);
        self.index.hash(state);
    }
}

impl Serialize for EnumValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.variant())
    }
}

/// Kind of a property value. Declared once per property in its schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValueKind {
    Bool,
    Int,
    Str,
    Enum(Arc<Enumeration>),
}

impl ValueKind {
    /// Whether `value` is of this kind.
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueKind::Bool, Value::Bool(_))
            | (ValueKind::Int, Value::Int(_))
            | (ValueKind::Str, Value::Str(_)) => true,
            (ValueKind::Enum(expected), Value::Enum(v)) => {
                Arc::ptr_eq(expected, &v.enumeration) || **expected == *v.enumeration
            }
            _ => false,
        }
    }

    /// Reject `value` unless it is of this kind.
    pub fn check(&self, property: &str, value: &Value) -> Result<()> {
        if self.admits(value) {
            Ok(())
        } else {
            Err(ModelError::KindMismatch {
                property: property.to_string(),
                expected: self.clone(),
                found: value.kind(),
            })
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Int => write!(f, "int"),
            ValueKind::Str => write!(f, "string"),
            ValueKind::Enum(e) => write!(f, "enum {}", e.name),
        }
    }
}

/// A property value: boolean, integer, string, or enumeration variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    Enum(EnumValue),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Str(_) => ValueKind::Str,
            Value::Enum(v) => ValueKind::Enum(Arc::clone(&v.enumeration)),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Enum(v) => write!(f, "{}", v.variant()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organization() -> Arc<Enumeration> {
        Enumeration::new("organization", ["none", "order", "army", "clan"]).unwrap()
    }

    #[test]
    fn test_enumeration_value() {
        let org = organization();
        let army = org.value("army").unwrap();

        assert_eq!(army.as_enum().unwrap().index(), 2);
        assert_eq!(army.to_string(), "army");
        assert_eq!(org.first().to_string(), "none");
    }

    #[test]
    fn test_unknown_variant() {
        let org = organization();
        let err = org.value("navy").unwrap_err();
        assert!(matches!(err, ModelError::UnknownVariant { variant, .. } if variant == "navy"));
    }

    #[test]
    fn test_empty_enumeration_rejected() {
        let err = Enumeration::new("nothing", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, ModelError::EmptyEnumeration(_)));
    }

    #[test]
    fn test_enum_equality_across_declarations() {
        // Two separately declared but identical enumerations are interchangeable.
        let a = organization().value("clan").unwrap();
        let b = organization().value("clan").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_kind_admits() {
        let org = organization();
        assert!(ValueKind::Int.admits(&Value::from(3)));
        assert!(!ValueKind::Int.admits(&Value::from(true)));
        assert!(ValueKind::Enum(org.clone()).admits(&org.first()));

        let other = Enumeration::new("status", ["none", "anarchy"]).unwrap();
        assert!(!ValueKind::Enum(org).admits(&other.first()));
    }

    #[test]
    fn test_kind_check_reports_mismatch() {
        let err = ValueKind::Bool.check("IS_ALIVE", &Value::from(1)).unwrap_err();
        assert_eq!(err.to_string(), "<IS_ALIVE> must be of kind bool, got int");
    }

    #[test]
    fn test_value_serializes_untagged() {
        let org = organization();
        assert_eq!(serde_json::to_string(&Value::from(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&org.value("order").unwrap()).unwrap(),
            "\"order\""
        );
    }
}
