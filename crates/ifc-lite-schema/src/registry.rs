// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity type registry
//!
//! Immutable knowledge of the schema's inheritance graph and of each entity
//! type's flattened attribute list. Built once from a [`SchemaDescription`];
//! read-only afterwards.

use crate::{
    AttributeDef, DefinedType, EntityTypeId, Error, PrimitiveKind, Result, SchemaDescription,
};
use rustc_hash::FxHashMap;

/// Registry record of one entity type
#[derive(Clone, Debug)]
pub struct EntityTypeInfo {
    /// Registry id
    pub id: EntityTypeId,
    /// Declared name (e.g. `IfcWall`)
    pub name: String,
    /// Upper-case STEP name (e.g. `IFCWALL`)
    pub step_name: String,
    /// Direct supertype
    pub supertype: Option<EntityTypeId>,
    /// Declared ABSTRACT
    pub is_abstract: bool,
    /// Number of ancestors
    pub depth: usize,
    /// Flattened attributes: ancestors root-first, then own
    attributes: Vec<AttributeDef>,
    /// Index of the first own attribute in `attributes`
    own_start: usize,
    /// Upper-case attribute name -> slot
    slots: FxHashMap<String, usize>,
}

impl EntityTypeInfo {
    /// All attributes in positional (STEP) order
    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// Attributes declared on this type itself
    pub fn own_attributes(&self) -> &[AttributeDef] {
        &self.attributes[self.own_start..]
    }

    /// Slot of an attribute by name (case-insensitive)
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots
            .get(name)
            .or_else(|| self.slots.get(&name.to_ascii_uppercase()))
            .copied()
    }
}

/// The Entity Type Registry
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    identifier: String,
    types: Vec<EntityTypeInfo>,
    by_name: FxHashMap<String, EntityTypeId>,
    defined_types: FxHashMap<String, PrimitiveKind>,
}

impl SchemaRegistry {
    /// A registry without any types; every lookup fails
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the registry from a description
    ///
    /// Fails with a configuration error on duplicate entity names, unknown
    /// supertypes, inheritance cycles, duplicate attribute names along an
    /// inheritance chain, or DERIVE redeclarations of attributes that are not
    /// inherited.
    pub fn from_description(desc: &SchemaDescription) -> Result<Self> {
        if desc.entities.len() > u16::MAX as usize {
            return Err(Error::schema(format!(
                "too many entity types ({})",
                desc.entities.len()
            )));
        }

        let mut by_name: FxHashMap<String, EntityTypeId> = FxHashMap::default();
        for (index, entity) in desc.entities.iter().enumerate() {
            let key = entity.name.to_ascii_uppercase();
            if by_name.insert(key, EntityTypeId(index as u16)).is_some() {
                return Err(Error::schema(format!(
                    "entity {} declared twice",
                    entity.name
                )));
            }
        }

        // Resolve direct supertypes
        let mut parents: Vec<Option<usize>> = Vec::with_capacity(desc.entities.len());
        for entity in &desc.entities {
            let parent = match &entity.supertype {
                Some(name) => Some(
                    by_name
                        .get(&name.to_ascii_uppercase())
                        .map(|id| id.index())
                        .ok_or_else(|| {
                            Error::schema(format!(
                                "{} is a subtype of unknown entity {}",
                                entity.name, name
                            ))
                        })?,
                ),
                None => None,
            };
            parents.push(parent);
        }

        let order = topological_order(&desc.entities, &parents)?;

        let mut built: Vec<Option<EntityTypeInfo>> = vec![None; desc.entities.len()];
        for index in order {
            let entity = &desc.entities[index];
            let parent = parents[index].and_then(|p| built[p].as_ref());

            let mut attributes = parent.map(|p| p.attributes.clone()).unwrap_or_default();
            let mut slots = parent.map(|p| p.slots.clone()).unwrap_or_default();
            let own_start = attributes.len();

            for derived in &entity.derived {
                let slot = slots
                    .get(&derived.to_ascii_uppercase())
                    .copied()
                    .ok_or_else(|| {
                        Error::schema(format!(
                            "{} derives {} which it does not inherit",
                            entity.name, derived
                        ))
                    })?;
                attributes[slot].derived = true;
            }

            for attribute in &entity.attributes {
                let key = attribute.name.to_ascii_uppercase();
                if slots.contains_key(&key) {
                    return Err(Error::schema(format!(
                        "attribute {} of {} is already declared along its inheritance chain",
                        attribute.name, entity.name
                    )));
                }
                slots.insert(key, attributes.len());
                attributes.push(attribute.clone());
            }

            let info = EntityTypeInfo {
                id: EntityTypeId(index as u16),
                name: entity.name.clone(),
                step_name: entity.name.to_ascii_uppercase(),
                supertype: parents[index].map(|p| EntityTypeId(p as u16)),
                is_abstract: entity.is_abstract,
                depth: parent.map(|p| p.depth + 1).unwrap_or(0),
                attributes,
                own_start,
                slots,
            };
            built[index] = Some(info);
        }

        let types: Vec<EntityTypeInfo> = built.into_iter().flatten().collect();

        let defined_types = desc
            .defined_types
            .iter()
            .map(|DefinedType { name, kind }| (name.to_ascii_uppercase(), *kind))
            .collect();

        log::debug!(
            "schema registry {} built: {} entity types",
            desc.identifier,
            types.len()
        );

        Ok(Self {
            identifier: desc.identifier.clone(),
            types,
            by_name,
            defined_types,
        })
    }

    /// Schema identifier (e.g. `IFC4`)
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Number of entity types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all entity types in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &EntityTypeInfo> {
        self.types.iter()
    }

    /// Look up a type by name (case-insensitive)
    ///
    /// An unknown name is a schema/registry mismatch and yields
    /// [`Error::UnknownEntityType`].
    pub fn lookup(&self, name: &str) -> Result<EntityTypeId> {
        self.get(name)
            .ok_or_else(|| Error::UnknownEntityType(name.to_string()))
    }

    /// Look up a type by name without failing
    pub fn get(&self, name: &str) -> Option<EntityTypeId> {
        self.by_name
            .get(name)
            .or_else(|| self.by_name.get(&name.to_ascii_uppercase()))
            .copied()
    }

    /// Registry record of a type
    pub fn entity(&self, id: EntityTypeId) -> Option<&EntityTypeInfo> {
        self.types.get(id.index())
    }

    /// Declared name of a type, `"<unknown>"` for foreign ids
    pub fn type_name(&self, id: EntityTypeId) -> &str {
        self.entity(id).map(|e| e.name.as_str()).unwrap_or("<unknown>")
    }

    /// Direct supertype
    pub fn supertype(&self, id: EntityTypeId) -> Option<EntityTypeId> {
        self.entity(id).and_then(|e| e.supertype)
    }

    /// Ancestors of a type, nearest first
    pub fn ancestors(&self, id: EntityTypeId) -> impl Iterator<Item = EntityTypeId> + '_ {
        std::iter::successors(self.supertype(id), move |&t| self.supertype(t))
    }

    /// True iff `candidate` is `ty` or one of its ancestors
    pub fn is_subtype_of(&self, ty: EntityTypeId, candidate: EntityTypeId) -> bool {
        if ty == candidate {
            return self.entity(ty).is_some();
        }
        match (self.entity(ty), self.entity(candidate)) {
            (Some(a), Some(b)) if a.depth > b.depth => self.ancestors(ty).any(|t| t == candidate),
            _ => false,
        }
    }

    /// Flattened attributes of a type in positional order
    ///
    /// Returns an empty slice for foreign ids.
    pub fn attributes_of(&self, id: EntityTypeId) -> &[AttributeDef] {
        self.entity(id).map(|e| e.attributes()).unwrap_or(&[])
    }

    /// Slot of a named attribute
    pub fn attribute_slot(&self, id: EntityTypeId, name: &str) -> Option<usize> {
        self.entity(id).and_then(|e| e.slot(name))
    }

    /// Declaration of a named attribute
    pub fn attribute(&self, id: EntityTypeId, name: &str) -> Option<&AttributeDef> {
        let entity = self.entity(id)?;
        entity.slot(name).map(|slot| &entity.attributes[slot])
    }

    /// Primitive kind of a defined type (e.g. `IfcLabel` -> String)
    pub fn defined_type(&self, name: &str) -> Option<PrimitiveKind> {
        self.defined_types
            .get(&name.to_ascii_uppercase())
            .copied()
    }
}

/// Order entities so that every supertype precedes its subtypes
fn topological_order(
    entities: &[crate::EntityDescription],
    parents: &[Option<usize>],
) -> Result<Vec<usize>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Visiting,
        Done,
    }

    let mut marks = vec![Mark::New; entities.len()];
    let mut order = Vec::with_capacity(entities.len());

    for start in 0..entities.len() {
        let mut chain = Vec::new();
        let mut current = Some(start);

        while let Some(index) = current {
            match marks[index] {
                Mark::Done => break,
                Mark::Visiting => {
                    return Err(Error::schema(format!(
                        "inheritance cycle through {}",
                        entities[index].name
                    )))
                }
                Mark::New => {
                    marks[index] = Mark::Visiting;
                    chain.push(index);
                    current = parents[index];
                }
            }
        }

        for &index in chain.iter().rev() {
            marks[index] = Mark::Done;
            order.push(index);
        }
    }

    Ok(order)
}
