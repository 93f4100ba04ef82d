// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schema descriptions
//!
//! A [`SchemaDescription`] is the raw input to the registry: entity names,
//! supertypes and own attribute lists in declaration order. It is produced by
//! the EXPRESS reader or assembled by hand.

use crate::{AttributeDef, PrimitiveKind};
use serde::{Deserialize, Serialize};

/// Description of one entity type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityDescription {
    /// Entity name (e.g. `IfcWall`)
    pub name: String,
    /// Direct supertype name
    pub supertype: Option<String>,
    /// Declared ABSTRACT
    pub is_abstract: bool,
    /// Explicit attributes declared on this entity, in order
    pub attributes: Vec<AttributeDef>,
    /// Inherited attributes redeclared as DERIVE by this entity
    pub derived: Vec<String>,
}

impl EntityDescription {
    /// Create a root entity without attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertype: None,
            is_abstract: false,
            attributes: Vec::new(),
            derived: Vec::new(),
        }
    }

    /// Set the direct supertype
    pub fn subtype_of(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    /// Mark as ABSTRACT
    pub fn abstract_entity(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Append an explicit attribute
    pub fn attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Redeclare an inherited attribute as derived
    pub fn derive(mut self, attribute: impl Into<String>) -> Self {
        self.derived.push(attribute.into());
        self
    }
}

/// Named defined type (e.g. `IfcLabel = STRING`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinedType {
    pub name: String,
    pub kind: PrimitiveKind,
}

/// Complete schema description
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    /// Schema identifier (e.g. `IFC4`)
    pub identifier: String,
    /// Entity declarations
    pub entities: Vec<EntityDescription>,
    /// Defined types usable inside typed select values
    pub defined_types: Vec<DefinedType>,
}

impl SchemaDescription {
    /// Create an empty description with the given identifier
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            entities: Vec::new(),
            defined_types: Vec::new(),
        }
    }

    /// Append an entity declaration
    pub fn entity(mut self, entity: EntityDescription) -> Self {
        self.entities.push(entity);
        self
    }

    /// Append a defined type
    pub fn defined_type(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.defined_types.push(DefinedType {
            name: name.into(),
            kind,
        });
        self
    }

    /// Find an entity declaration by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&EntityDescription> {
        self.entities
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }
}
