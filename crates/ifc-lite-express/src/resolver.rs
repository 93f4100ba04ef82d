// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type resolution
//!
//! Maps declared attribute types to attribute kinds. Defined types are
//! followed to their underlying simple type, selects are flattened to their
//! leaf members, and every name must resolve to a declared TYPE or ENTITY.

use crate::tokenizer::{
    AttributeDecl, Declaration, EntityDecl, SimpleType, TypeDecl, TypeRef, Underlying,
};
use ifc_lite_schema::{
    AttributeDef, AttributeKind, EntityDescription, Error, PrimitiveKind, Result,
    SchemaDescription,
};
use rustc_hash::FxHashMap;

/// Nesting limit when following defined types (guards against cycles)
const MAX_DEPTH: usize = 32;

/// Resolved kind plus the names that constrain it
#[derive(Clone, Debug, PartialEq)]
struct Resolved {
    kind: AttributeKind,
    allowed: Vec<String>,
}

impl Resolved {
    fn plain(kind: AttributeKind) -> Self {
        Self {
            kind,
            allowed: Vec::new(),
        }
    }
}

/// Resolver over a full set of declarations
pub struct TypeResolver<'a> {
    types: FxHashMap<String, &'a TypeDecl>,
    entities: FxHashMap<String, &'a EntityDecl>,
}

impl<'a> TypeResolver<'a> {
    /// Index the declarations by upper-case name
    pub fn new(declarations: &'a [Declaration]) -> Result<Self> {
        let mut types = FxHashMap::default();
        let mut entities = FxHashMap::default();

        for decl in declarations {
            let (key, line) = match decl {
                Declaration::Type(t) => (t.name.to_ascii_uppercase(), t.line),
                Declaration::Entity(e) => (e.name.to_ascii_uppercase(), e.line),
            };
            if types.contains_key(&key) || entities.contains_key(&key) {
                return Err(Error::express(line, format!("duplicate declaration {}", key)));
            }
            match decl {
                Declaration::Type(t) => {
                    types.insert(key, t);
                }
                Declaration::Entity(e) => {
                    entities.insert(key, e);
                }
            }
        }

        Ok(Self { types, entities })
    }

    fn entity_name(&self, name: &str) -> Option<&'a str> {
        self.entities
            .get(&name.to_ascii_uppercase())
            .map(|e| e.name.as_str())
    }

    fn type_decl(&self, name: &str) -> Option<&'a TypeDecl> {
        self.types.get(&name.to_ascii_uppercase()).copied()
    }

    fn resolve(&self, ty: &TypeRef, line: usize, depth: usize) -> Result<Resolved> {
        if depth > MAX_DEPTH {
            return Err(Error::express(line, "type definitions nest too deeply (cycle?)"));
        }

        match ty {
            TypeRef::Simple(simple) => Ok(Resolved::plain(simple_kind(*simple))),
            TypeRef::Named(name) => {
                if let Some(entity) = self.entity_name(name) {
                    return Ok(Resolved {
                        kind: AttributeKind::InstanceRef,
                        allowed: vec![entity.to_string()],
                    });
                }
                let decl = self
                    .type_decl(name)
                    .ok_or_else(|| Error::express(line, format!("unknown type {}", name)))?;
                self.resolve_declared(decl, line, depth + 1)
            }
            TypeRef::Aggregate { element, .. } => {
                let inner = self.resolve(element, line, depth + 1)?;
                let kind = match inner.kind {
                    AttributeKind::InstanceRef => AttributeKind::AggregateOfInstanceRef,
                    other => AttributeKind::AggregateOfPrimitive(primitive_of(other)),
                };
                Ok(Resolved {
                    kind,
                    allowed: inner.allowed,
                })
            }
        }
    }

    fn resolve_declared(&self, decl: &TypeDecl, line: usize, depth: usize) -> Result<Resolved> {
        match &decl.underlying {
            Underlying::Type(inner) => self.resolve(inner, line, depth),
            Underlying::Enumeration(literals) => Ok(Resolved {
                kind: AttributeKind::Enum,
                allowed: literals.clone(),
            }),
            Underlying::Select(_) => {
                let mut entities = Vec::new();
                let mut values = Vec::new();
                self.flatten_select(decl, line, depth, &mut entities, &mut values)?;

                if values.is_empty() {
                    Ok(Resolved {
                        kind: AttributeKind::InstanceRef,
                        allowed: entities,
                    })
                } else {
                    if !entities.is_empty() {
                        log::debug!(
                            "select {} mixes entities and values; only typed values are accepted",
                            decl.name
                        );
                    }
                    Ok(Resolved {
                        kind: AttributeKind::Select,
                        allowed: values,
                    })
                }
            }
        }
    }

    /// Collect leaf members of a (possibly nested) select
    fn flatten_select(
        &self,
        decl: &TypeDecl,
        line: usize,
        depth: usize,
        entities: &mut Vec<String>,
        values: &mut Vec<String>,
    ) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::express(line, "select types nest too deeply (cycle?)"));
        }
        let Underlying::Select(members) = &decl.underlying else {
            values.push(decl.name.clone());
            return Ok(());
        };

        for member in members {
            if let Some(entity) = self.entity_name(member) {
                entities.push(entity.to_string());
                continue;
            }
            let member_decl = self.type_decl(member).ok_or_else(|| {
                Error::express(
                    line,
                    format!("unknown select member {} in {}", member, decl.name),
                )
            })?;
            self.flatten_select(member_decl, line, depth + 1, entities, values)?;
        }
        Ok(())
    }

    fn attribute(&self, attr: &AttributeDecl, line: usize) -> Result<AttributeDef> {
        let resolved = self.resolve(&attr.ty, line, 0)?;
        let mut def = AttributeDef::new(attr.name.clone(), resolved.kind).allowing(resolved.allowed);
        def.optional = attr.optional;
        if let TypeRef::Named(name) = &attr.ty {
            def = def.declared_as(name.clone());
        }
        Ok(def)
    }

    /// Build the schema description
    pub fn describe(&self, identifier: &str, declarations: &[Declaration]) -> Result<SchemaDescription> {
        let mut desc = SchemaDescription::new(identifier);

        for decl in declarations {
            match decl {
                Declaration::Type(t) => {
                    // Defined types whose values can appear as typed select members
                    if matches!(t.underlying, Underlying::Select(_)) {
                        continue;
                    }
                    let resolved = self.resolve_declared(t, t.line, 0)?;
                    if resolved.kind.is_reference() {
                        continue;
                    }
                    desc = desc.defined_type(t.name.clone(), primitive_of(resolved.kind));
                }
                Declaration::Entity(e) => {
                    let mut entity = EntityDescription::new(e.name.clone());
                    if let Some(supertype) = &e.supertype {
                        entity = entity.subtype_of(supertype.clone());
                    }
                    if e.is_abstract {
                        entity = entity.abstract_entity();
                    }
                    for attr in &e.attributes {
                        entity = entity.attribute(self.attribute(attr, e.line)?);
                    }
                    for derived in &e.derived {
                        entity = entity.derive(derived.clone());
                    }
                    desc = desc.entity(entity);
                }
            }
        }

        Ok(desc)
    }
}

fn simple_kind(simple: SimpleType) -> AttributeKind {
    match simple {
        SimpleType::String | SimpleType::Binary => AttributeKind::String,
        SimpleType::Real | SimpleType::Number => AttributeKind::Double,
        SimpleType::Integer => AttributeKind::Int,
        SimpleType::Boolean => AttributeKind::Bool,
        SimpleType::Logical => AttributeKind::Logical,
    }
}

/// Element kind used when a resolved kind appears inside an aggregate
fn primitive_of(kind: AttributeKind) -> PrimitiveKind {
    match kind {
        AttributeKind::String => PrimitiveKind::String,
        AttributeKind::Double => PrimitiveKind::Double,
        AttributeKind::Int => PrimitiveKind::Int,
        AttributeKind::Bool => PrimitiveKind::Bool,
        AttributeKind::Logical => PrimitiveKind::Logical,
        AttributeKind::Enum => PrimitiveKind::Enum,
        AttributeKind::Select => PrimitiveKind::Typed,
        AttributeKind::InstanceRef
        | AttributeKind::AggregateOfInstanceRef
        | AttributeKind::AggregateOfPrimitive(_) => PrimitiveKind::Aggregate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::AggregateKind;

    fn type_decl(name: &str, underlying: Underlying) -> Declaration {
        Declaration::Type(TypeDecl {
            name: name.to_string(),
            underlying,
            line: 1,
        })
    }

    fn entity(name: &str, attributes: Vec<(&str, TypeRef)>) -> Declaration {
        Declaration::Entity(EntityDecl {
            name: name.to_string(),
            is_abstract: false,
            supertype: None,
            attributes: attributes
                .into_iter()
                .map(|(n, ty)| AttributeDecl {
                    name: n.to_string(),
                    optional: false,
                    ty,
                })
                .collect(),
            derived: Vec::new(),
            line: 1,
        })
    }

    fn named(name: &str) -> TypeRef {
        TypeRef::Named(name.to_string())
    }

    fn fixture() -> Vec<Declaration> {
        vec![
            type_decl("IfcLabel", Underlying::Type(TypeRef::Simple(SimpleType::String))),
            type_decl("IfcLengthMeasure", Underlying::Type(TypeRef::Simple(SimpleType::Real))),
            type_decl("IfcPositiveLengthMeasure", Underlying::Type(named("IfcLengthMeasure"))),
            type_decl(
                "IfcStateEnum",
                Underlying::Enumeration(vec!["READWRITE".into(), "LOCKED".into()]),
            ),
            type_decl(
                "IfcPlacementSelect",
                Underlying::Select(vec!["IfcPoint".into(), "IfcLine".into()]),
            ),
            type_decl(
                "IfcMeasureValue",
                Underlying::Select(vec!["IfcLengthMeasure".into()]),
            ),
            type_decl(
                "IfcValue",
                Underlying::Select(vec!["IfcMeasureValue".into(), "IfcLabel".into()]),
            ),
            entity("IfcPoint", vec![]),
            entity("IfcLine", vec![]),
            entity(
                "IfcThing",
                vec![
                    ("Name", named("IfcLabel")),
                    ("Height", named("IfcPositiveLengthMeasure")),
                    ("State", named("IfcStateEnum")),
                    ("Placement", named("IfcPlacementSelect")),
                    ("Value", named("IfcValue")),
                    (
                        "Points",
                        TypeRef::Aggregate {
                            kind: AggregateKind::List,
                            element: Box::new(named("IfcPoint")),
                        },
                    ),
                    (
                        "Coordinates",
                        TypeRef::Aggregate {
                            kind: AggregateKind::List,
                            element: Box::new(named("IfcLengthMeasure")),
                        },
                    ),
                ],
            ),
        ]
    }

    #[test]
    fn test_attribute_kinds() {
        let decls = fixture();
        let resolver = TypeResolver::new(&decls).unwrap();
        let desc = resolver.describe("TEST", &decls).unwrap();
        let thing = desc.find("IfcThing").unwrap();
        let kinds: Vec<_> = thing.attributes.iter().map(|a| a.kind).collect();

        assert_eq!(
            kinds,
            vec![
                AttributeKind::String,
                AttributeKind::Double,
                AttributeKind::Enum,
                AttributeKind::InstanceRef,
                AttributeKind::Select,
                AttributeKind::AggregateOfInstanceRef,
                AttributeKind::AggregateOfPrimitive(PrimitiveKind::Double),
            ]
        );
        assert_eq!(thing.attributes[0].declared_type, "IfcLabel");
        assert_eq!(thing.attributes[2].allowed, vec!["READWRITE", "LOCKED"]);
        assert_eq!(thing.attributes[3].allowed, vec!["IfcPoint", "IfcLine"]);
        assert_eq!(
            thing.attributes[4].allowed,
            vec!["IfcLengthMeasure", "IfcLabel"]
        );
        assert_eq!(thing.attributes[5].allowed, vec!["IfcPoint"]);
    }

    #[test]
    fn test_defined_types_collected() {
        let decls = fixture();
        let resolver = TypeResolver::new(&decls).unwrap();
        let desc = resolver.describe("TEST", &decls).unwrap();

        let names: Vec<_> = desc.defined_types.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"IfcLabel"));
        assert!(names.contains(&"IfcPositiveLengthMeasure"));
        assert!(names.contains(&"IfcStateEnum"));
        assert!(!names.contains(&"IfcValue"));
    }

    #[test]
    fn test_unknown_type_is_error() {
        let decls = vec![entity("IfcThing", vec![("Name", named("IfcMissing"))])];
        let resolver = TypeResolver::new(&decls).unwrap();
        let err = resolver.describe("TEST", &decls).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("IfcMissing"));
    }

    #[test]
    fn test_cyclic_type_is_error() {
        let decls = vec![
            type_decl("IfcA", Underlying::Type(named("IfcB"))),
            type_decl("IfcB", Underlying::Type(named("IfcA"))),
        ];
        let resolver = TypeResolver::new(&decls).unwrap();
        assert!(resolver.describe("TEST", &decls).is_err());
    }

    #[test]
    fn test_duplicate_declaration_is_error() {
        let decls = vec![entity("IfcThing", vec![]), entity("IFCTHING", vec![])];
        assert!(TypeResolver::new(&decls).is_err());
    }
}
