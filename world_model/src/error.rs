//! Error types for the `world_model` crate.
//!
//! Every failure here is a programmer error in the authored world: a typo in
//! an entity or property name, a value of the wrong kind, or a malformed
//! world definition. They are reported immediately and never retried.

use crate::entities::ValueKind;

/// Errors raised while declaring or manipulating a world model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The entity is not declared in the context.
    #[error("cannot find entity with the name <{0}>")]
    UnknownEntity(String),

    /// The property is not declared on the entity's class.
    #[error("entity <{entity}> has no property named <{property}>")]
    UnknownProperty {
        /// Entity (or class) the lookup was made on.
        entity: String,
        /// The missing property.
        property: String,
    },

    /// A value of the wrong kind was assigned to a property.
    #[error("<{property}> must be of kind {expected}, got {found}")]
    KindMismatch {
        /// The property being assigned.
        property: String,
        /// Declared kind.
        expected: ValueKind,
        /// Kind of the offered value.
        found: ValueKind,
    },

    /// A variant lookup was made on a property that does not hold an
    /// enumeration value.
    #[error("<{property}> holds a {found} value, not an enumeration variant")]
    NotAnEnumeration {
        /// The property being read.
        property: String,
        /// Kind the property actually holds.
        found: ValueKind,
    },

    /// An enumeration variant name that the enumeration does not declare.
    #[error("enumeration <{enumeration}> has no variant <{variant}>")]
    UnknownVariant {
        /// The enumeration.
        enumeration: String,
        /// The requested variant.
        variant: String,
    },

    /// An entity name was declared twice in the same context.
    #[error("entity <{0}> is already declared")]
    DuplicateEntity(String),

    /// A property name was declared twice on the same class.
    #[error("property <{0}> is already declared")]
    DuplicateProperty(String),

    /// An enumeration name was declared twice in a world definition.
    #[error("enumeration <{0}> is already declared")]
    DuplicateEnumeration(String),

    /// An enumeration was declared without variants.
    #[error("enumeration <{0}> declares no variants")]
    EmptyEnumeration(String),

    /// A world definition references a class that was never declared.
    #[error("unknown entity class <{0}>")]
    UnknownClass(String),

    /// A world definition uses a kind name that is neither built in nor a
    /// declared enumeration.
    #[error("unknown value kind <{0}>")]
    UnknownKind(String),

    /// A world definition default could not be read as the declared kind.
    #[error("invalid default for <{property}>: {reason}")]
    InvalidDefault {
        /// The property being declared.
        property: String,
        /// What was wrong with the literal.
        reason: String,
    },

    /// Integer arithmetic on a property overflowed.
    #[error("arithmetic overflow updating <{0}>")]
    ArithmeticOverflow(String),

    /// The world definition text is not valid TOML for the expected shape.
    #[error("failed to parse world definition: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result alias for world model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
