// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for schema-driven IFC entity construction
//!
//! This module defines the identifiers, attribute descriptors and value types
//! shared by the registry, the EXPRESS reader and the export session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe instance identifier
///
/// Wraps the STEP instance number (e.g., `#123` is `EntityId(123)`).
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Dense identifier of an entity type inside one [`SchemaRegistry`](crate::SchemaRegistry)
///
/// Only the registry mints these; an id is meaningless outside the registry
/// that produced it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct EntityTypeId(pub(crate) u16);

impl EntityTypeId {
    /// Position of the type in the registry's type table
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// IFC schema versions with a bundled description
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SchemaVersion {
    Ifc2x3,
    Ifc4,
}

impl SchemaVersion {
    /// Schema identifier as written to `FILE_SCHEMA`
    pub fn identifier(&self) -> &'static str {
        match self {
            SchemaVersion::Ifc2x3 => "IFC2X3",
            SchemaVersion::Ifc4 => "IFC4",
        }
    }

    pub fn is_ifc4(&self) -> bool {
        matches!(self, SchemaVersion::Ifc4)
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "IFC2X3" | "IFC2X3_TC1" => Ok(SchemaVersion::Ifc2x3),
            "IFC4" | "IFC4_ADD1" | "IFC4_ADD2" | "IFC4_ADD2_TC1" => Ok(SchemaVersion::Ifc4),
            other => Err(format!("unsupported schema identifier '{}'", other)),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// EXPRESS three-valued logical
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Logical {
    True,
    False,
    Unknown,
}

impl From<bool> for Logical {
    fn from(b: bool) -> Self {
        if b {
            Logical::True
        } else {
            Logical::False
        }
    }
}

/// Kind of a primitive value, also used for aggregate elements and defined types
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PrimitiveKind {
    String,
    Double,
    Int,
    Bool,
    Logical,
    Enum,
    /// A typed select value such as `IFCLABEL('x')`
    Typed,
    /// Nested aggregate
    Aggregate,
}

/// Value kind of an entity attribute
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum AttributeKind {
    String,
    Double,
    Int,
    Bool,
    Logical,
    Enum,
    /// Reference to another instance
    InstanceRef,
    /// Aggregate of instance references
    AggregateOfInstanceRef,
    /// Aggregate of primitive values of the given element kind
    AggregateOfPrimitive(PrimitiveKind),
    /// Select over defined types; values carry their type name
    Select,
}

impl AttributeKind {
    /// Whether values of this kind are instance references
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            AttributeKind::InstanceRef | AttributeKind::AggregateOfInstanceRef
        )
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            AttributeKind::AggregateOfInstanceRef | AttributeKind::AggregateOfPrimitive(_)
        )
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::AggregateOfPrimitive(inner) => write!(f, "AggregateOf{:?}", inner),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Declaration of one explicit attribute
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name as declared (e.g. `GlobalId`)
    pub name: String,
    /// Value kind
    pub kind: AttributeKind,
    /// Declared OPTIONAL
    pub optional: bool,
    /// Redeclared as DERIVE by a subtype; serialized as `*`
    pub derived: bool,
    /// Declared type name (e.g. `IfcLabel`), empty when unknown
    pub declared_type: String,
    /// Entity names for references, literals for enumerations,
    /// defined-type names for selects. Empty means unconstrained.
    pub allowed: Vec<String>,
}

impl AttributeDef {
    /// Create a mandatory attribute of the given kind
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
            derived: false,
            declared_type: String::new(),
            allowed: Vec::new(),
        }
    }

    /// Mark the attribute OPTIONAL
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Record the declared type name
    pub fn declared_as(mut self, type_name: impl Into<String>) -> Self {
        self.declared_type = type_name.into();
        self
    }

    /// Restrict values to the given entity names, literals or defined types
    pub fn allowing<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = allowed.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a value must be supplied when constructing an instance
    pub fn is_mandatory(&self) -> bool {
        !self.optional && !self.derived
    }

    /// Case-insensitive membership test against `allowed`
    pub fn allows(&self, name: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Attribute value held by an instance slot
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum AttributeValue {
    /// Null value (`$`); never stored, only rejected inside aggregates
    #[default]
    Null,
    /// Derived value (`*`)
    Derived,
    /// Instance reference (`#123`)
    EntityRef(EntityId),
    /// Boolean value
    Bool(bool),
    /// Three-valued logical
    Logical(Logical),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Enumeration literal (`.VALUE.`)
    Enum(String),
    /// Aggregate of values
    List(Vec<AttributeValue>),
    /// Typed value like `IFCLABEL('text')`
    TypedValue(String, Box<AttributeValue>),
}

impl AttributeValue {
    /// Primitive kind of this value, `None` for Null/Derived/EntityRef
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            AttributeValue::Bool(_) => Some(PrimitiveKind::Bool),
            AttributeValue::Logical(_) => Some(PrimitiveKind::Logical),
            AttributeValue::Integer(_) => Some(PrimitiveKind::Int),
            AttributeValue::Float(_) => Some(PrimitiveKind::Double),
            AttributeValue::String(_) => Some(PrimitiveKind::String),
            AttributeValue::Enum(_) => Some(PrimitiveKind::Enum),
            AttributeValue::List(_) => Some(PrimitiveKind::Aggregate),
            AttributeValue::TypedValue(_, _) => Some(PrimitiveKind::Typed),
            AttributeValue::Null | AttributeValue::Derived | AttributeValue::EntityRef(_) => None,
        }
    }

    /// Whether this value may be stored in an attribute of `kind`
    pub fn fits(&self, kind: AttributeKind) -> bool {
        match (kind, self) {
            (AttributeKind::String, AttributeValue::String(_)) => true,
            (AttributeKind::Double, AttributeValue::Float(_)) => true,
            (AttributeKind::Int, AttributeValue::Integer(_)) => true,
            (AttributeKind::Bool, AttributeValue::Bool(_)) => true,
            (AttributeKind::Logical, AttributeValue::Logical(_)) => true,
            (AttributeKind::Enum, AttributeValue::Enum(_)) => true,
            (AttributeKind::InstanceRef, AttributeValue::EntityRef(_)) => true,
            (AttributeKind::Select, AttributeValue::TypedValue(_, _)) => true,
            (AttributeKind::AggregateOfInstanceRef, AttributeValue::List(items)) => items
                .iter()
                .all(|v| matches!(v, AttributeValue::EntityRef(_))),
            (AttributeKind::AggregateOfPrimitive(element), AttributeValue::List(items)) => {
                items.iter().all(|v| v.primitive_kind() == Some(element))
            }
            _ => false,
        }
    }

    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<EntityId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as logical
    pub fn as_logical(&self) -> Option<Logical> {
        match self {
            AttributeValue::Logical(l) => Some(*l),
            _ => None,
        }
    }

    /// Try to get as enum literal
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to get as typed value
    pub fn as_typed(&self) -> Option<(&str, &AttributeValue)> {
        match self {
            AttributeValue::TypedValue(name, inner) => Some((name, inner)),
            _ => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Check if this is a derived value
    pub fn is_derived(&self) -> bool {
        matches!(self, AttributeValue::Derived)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Integer(i)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<EntityId> for AttributeValue {
    fn from(id: EntityId) -> Self {
        AttributeValue::EntityRef(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId(42).to_string(), "#42");
    }

    #[test]
    fn test_schema_version_parse() {
        assert_eq!("ifc2x3".parse::<SchemaVersion>(), Ok(SchemaVersion::Ifc2x3));
        assert_eq!("IFC4".parse::<SchemaVersion>(), Ok(SchemaVersion::Ifc4));
        assert!("IFC5".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn test_value_fits_kind() {
        assert!(AttributeValue::from("x").fits(AttributeKind::String));
        assert!(!AttributeValue::from("x").fits(AttributeKind::Enum));
        assert!(AttributeValue::Float(1.0).fits(AttributeKind::Double));
        assert!(!AttributeValue::Integer(1).fits(AttributeKind::Double));

        let refs = AttributeValue::List(vec![EntityId(1).into(), EntityId(2).into()]);
        assert!(refs.fits(AttributeKind::AggregateOfInstanceRef));
        assert!(!refs.fits(AttributeKind::AggregateOfPrimitive(PrimitiveKind::Int)));

        let ints = AttributeValue::List(vec![1i64.into(), 2i64.into()]);
        assert!(ints.fits(AttributeKind::AggregateOfPrimitive(PrimitiveKind::Int)));
    }

    #[test]
    fn test_attribute_def_allows() {
        let def = AttributeDef::new("PredefinedType", AttributeKind::Enum)
            .optional()
            .allowing(["STANDARD", "NOTDEFINED"]);
        assert!(def.allows("standard"));
        assert!(!def.allows("SHEAR"));
        assert!(!def.is_mandatory());

        let open = AttributeDef::new("Name", AttributeKind::String);
        assert!(open.allows("anything"));
        assert!(open.is_mandatory());
    }
}
