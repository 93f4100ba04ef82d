// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed attribute access
//!
//! Setters check the attribute name against the handle's type, the value
//! kind against the declaration, and (depending on [`SessionConfig`]) the
//! declared reference types and enumeration literals. An absent value
//! resets the attribute to unset. Getters never fail: anything that does
//! not line up reads as absent.
//!
//! [`SessionConfig`]: crate::SessionConfig

use crate::{ExportSession, Handle};
use ifc_lite_schema::{
    AttributeDef, AttributeKind, AttributeValue, EntityTypeId, Error, Logical, Result,
    SchemaRegistry,
};
use std::sync::Arc;

/// Slot and declaration of `name` on `entity_type`
pub(crate) fn declared_attribute<'r>(
    registry: &'r SchemaRegistry,
    entity_type: EntityTypeId,
    name: &str,
) -> Result<(usize, &'r AttributeDef)> {
    if name.is_empty() {
        return Err(Error::invalid_argument("empty attribute name"));
    }
    let slot = registry
        .attribute_slot(entity_type, name)
        .ok_or_else(|| Error::UnknownAttribute {
            entity: registry.type_name(entity_type).to_string(),
            attribute: name.to_string(),
        })?;
    let def = &registry.attributes_of(entity_type)[slot];
    if def.derived {
        return Err(Error::invalid_argument(format!(
            "{}.{} is derived and cannot be set",
            registry.type_name(entity_type),
            def.name
        )));
    }
    Ok((slot, def))
}

impl ExportSession {
    /// Set an attribute from a raw value
    ///
    /// `None` and [`AttributeValue::Null`] reset the attribute to unset. On
    /// error the attribute keeps its previous value.
    pub fn set_attribute(
        &mut self,
        handle: Handle,
        name: &str,
        value: Option<AttributeValue>,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_argument("empty attribute name"));
        }
        let registry = Arc::clone(&self.registry);
        let instance = self.resolve(handle)?;
        let (id, entity_type) = (instance.id(), instance.entity_type());
        let (slot, def) = declared_attribute(&registry, entity_type, name)?;

        let value = match value {
            None | Some(AttributeValue::Null) => None,
            Some(value) => Some(self.check_value(entity_type, def, value)?),
        };

        let instance = self
            .store
            .get_mut(id)
            .ok_or(Error::ForeignInstance(id))?;
        if instance.set(slot, value).is_some() {
            log::trace!("{}: overwrote {}", id, def.name);
        }
        Ok(())
    }

    /// Check a value against a declaration and bring it to stored form
    pub(crate) fn check_value(
        &self,
        entity_type: EntityTypeId,
        def: &AttributeDef,
        value: AttributeValue,
    ) -> Result<AttributeValue> {
        let entity = self.registry.type_name(entity_type);
        if value.is_derived() {
            return Err(Error::invalid_argument(format!(
                "{}.{}: '*' is reserved for derived attributes",
                entity, def.name
            )));
        }
        if has_null_member(&value) {
            return Err(Error::invalid_argument(format!(
                "{}.{} contains a null element",
                entity, def.name
            )));
        }
        if !value.fits(def.kind) {
            return Err(Error::invalid_argument(format!(
                "{}.{} expects {}, got {}",
                entity,
                def.name,
                def.kind,
                describe(&value)
            )));
        }
        if !all_finite(&value) {
            return Err(Error::invalid_argument(format!(
                "{}.{} must be a finite number",
                entity, def.name
            )));
        }

        match (def.kind, value) {
            (AttributeKind::Enum, AttributeValue::Enum(literal)) => {
                let literal = literal.trim().trim_matches('.').to_ascii_uppercase();
                if literal.is_empty() {
                    return Err(Error::invalid_argument(format!(
                        "{}.{}: empty enumeration literal",
                        entity, def.name
                    )));
                }
                if self.config.enum_checks && !def.allows(&literal) {
                    return Err(Error::invalid_argument(format!(
                        "{}.{}: .{}. is not one of {}",
                        entity,
                        def.name,
                        literal,
                        def.allowed.join(", ")
                    )));
                }
                Ok(AttributeValue::Enum(literal))
            }
            (AttributeKind::InstanceRef, value @ AttributeValue::EntityRef(_))
            | (AttributeKind::AggregateOfInstanceRef, value @ AttributeValue::List(_)) => {
                let ids: Vec<_> = match &value {
                    AttributeValue::List(items) => {
                        items.iter().filter_map(|v| v.as_entity_ref()).collect()
                    }
                    other => other.as_entity_ref().into_iter().collect(),
                };
                for id in ids {
                    let target = self.store.get(id).ok_or(Error::ForeignInstance(id))?;
                    self.check_reference(entity, def, target.entity_type())?;
                }
                Ok(value)
            }
            (AttributeKind::Select, AttributeValue::TypedValue(type_name, inner)) => {
                if type_name.is_empty() {
                    return Err(Error::invalid_argument(format!(
                        "{}.{}: typed value without a type name",
                        entity, def.name
                    )));
                }
                if !def.allows(&type_name) {
                    return Err(Error::invalid_argument(format!(
                        "{}.{}: {} is not one of {}",
                        entity,
                        def.name,
                        type_name,
                        def.allowed.join(", ")
                    )));
                }
                if let Some(kind) = self.registry.defined_type(&type_name) {
                    if inner.primitive_kind() != Some(kind) {
                        return Err(Error::invalid_argument(format!(
                            "{}.{}: {} holds {:?}, got {}",
                            entity,
                            def.name,
                            type_name,
                            kind,
                            describe(&inner)
                        )));
                    }
                } else if inner.primitive_kind().is_none() || inner.as_typed().is_some() {
                    return Err(Error::invalid_argument(format!(
                        "{}.{}: {} cannot wrap {}",
                        entity,
                        def.name,
                        type_name,
                        describe(&inner)
                    )));
                }
                Ok(AttributeValue::TypedValue(type_name, inner))
            }
            (_, value) => Ok(value),
        }
    }

    fn check_reference(
        &self,
        entity: &str,
        def: &AttributeDef,
        target: EntityTypeId,
    ) -> Result<()> {
        if !self.config.reference_checks || def.allowed.is_empty() {
            return Ok(());
        }
        let conforms = def.allowed.iter().any(|allowed| {
            self.registry
                .get(allowed)
                .map(|candidate| self.cache.is_subtype_of(&self.registry, target, candidate))
                .unwrap_or(false)
        });
        if conforms {
            Ok(())
        } else {
            Err(Error::subtype_mismatch(
                format!("{}.{}", entity, def.name),
                def.allowed.join("|"),
                self.registry.type_name(target),
            ))
        }
    }

    pub fn set_string(&mut self, handle: Handle, name: &str, value: Option<&str>) -> Result<()> {
        self.set_attribute(handle, name, value.map(AttributeValue::from))
    }

    pub fn set_double(&mut self, handle: Handle, name: &str, value: Option<f64>) -> Result<()> {
        self.set_attribute(handle, name, value.map(AttributeValue::Float))
    }

    pub fn set_integer(&mut self, handle: Handle, name: &str, value: Option<i64>) -> Result<()> {
        self.set_attribute(handle, name, value.map(AttributeValue::Integer))
    }

    pub fn set_bool(&mut self, handle: Handle, name: &str, value: Option<bool>) -> Result<()> {
        self.set_attribute(handle, name, value.map(AttributeValue::Bool))
    }

    pub fn set_logical(
        &mut self,
        handle: Handle,
        name: &str,
        value: Option<Logical>,
    ) -> Result<()> {
        self.set_attribute(handle, name, value.map(AttributeValue::Logical))
    }

    /// Set an enumeration literal; surrounding dots and case are normalized
    pub fn set_enum(&mut self, handle: Handle, name: &str, value: Option<&str>) -> Result<()> {
        self.set_attribute(
            handle,
            name,
            value.map(|literal| AttributeValue::Enum(literal.to_string())),
        )
    }

    /// Set an instance reference; [`Handle::NULL`] unsets the attribute
    pub fn set_instance(&mut self, handle: Handle, name: &str, value: Handle) -> Result<()> {
        let value = self.reference(value)?;
        self.set_attribute(handle, name, value)
    }

    /// Set an aggregate of instance references
    ///
    /// A null member rejects the whole aggregate. `None` unsets the
    /// attribute; an empty slice stores an empty aggregate.
    pub fn set_instances(
        &mut self,
        handle: Handle,
        name: &str,
        value: Option<&[Handle]>,
    ) -> Result<()> {
        let value = match value {
            Some(members) => Some(AttributeValue::List(self.references(name, members)?)),
            None => None,
        };
        self.set_attribute(handle, name, value)
    }

    /// Set an aggregate of primitive values
    pub fn set_aggregate(
        &mut self,
        handle: Handle,
        name: &str,
        value: Option<&[AttributeValue]>,
    ) -> Result<()> {
        let value = value.map(|members| AttributeValue::List(members.to_vec()));
        self.set_attribute(handle, name, value)
    }

    /// Set a select attribute to a typed value such as `IfcLabel('x')`
    pub fn set_typed_value(
        &mut self,
        handle: Handle,
        name: &str,
        value: Option<(&str, AttributeValue)>,
    ) -> Result<()> {
        let value = value
            .map(|(type_name, inner)| AttributeValue::TypedValue(type_name.to_string(), Box::new(inner)));
        self.set_attribute(handle, name, value)
    }

    /// Raw stored value; `None` when unset or not applicable
    pub fn get_attribute(&self, handle: Handle, name: &str) -> Option<&AttributeValue> {
        let instance = self.store.resolve(handle)?;
        let slot = self.registry.attribute_slot(instance.entity_type(), name)?;
        instance.value(slot)
    }

    pub fn get_string(&self, handle: Handle, name: &str) -> Option<&str> {
        self.get_attribute(handle, name)?.as_string()
    }

    pub fn get_double(&self, handle: Handle, name: &str) -> Option<f64> {
        self.get_attribute(handle, name)?.as_float()
    }

    pub fn get_integer(&self, handle: Handle, name: &str) -> Option<i64> {
        self.get_attribute(handle, name)?.as_integer()
    }

    pub fn get_bool(&self, handle: Handle, name: &str) -> Option<bool> {
        self.get_attribute(handle, name)?.as_bool()
    }

    pub fn get_logical(&self, handle: Handle, name: &str) -> Option<Logical> {
        self.get_attribute(handle, name)?.as_logical()
    }

    /// Enumeration literal without dots
    pub fn get_enum(&self, handle: Handle, name: &str) -> Option<&str> {
        self.get_attribute(handle, name)?.as_enum()
    }

    /// Referenced instance, [`Handle::NULL`] when unset
    pub fn get_instance(&self, handle: Handle, name: &str) -> Handle {
        self.get_attribute(handle, name)
            .and_then(|v| v.as_entity_ref())
            .and_then(|id| self.store.get(id))
            .map(|instance| instance.handle())
            .unwrap_or(Handle::NULL)
    }

    pub fn get_instances(&self, handle: Handle, name: &str) -> Option<Vec<Handle>> {
        let items = self.get_attribute(handle, name)?.as_list()?;
        items
            .iter()
            .map(|v| {
                v.as_entity_ref()
                    .and_then(|id| self.store.get(id))
                    .map(|instance| instance.handle())
            })
            .collect()
    }

    pub fn get_aggregate(&self, handle: Handle, name: &str) -> Option<&[AttributeValue]> {
        self.get_attribute(handle, name)?.as_list()
    }

    pub fn get_typed_value(&self, handle: Handle, name: &str) -> Option<(&str, &AttributeValue)> {
        self.get_attribute(handle, name)?.as_typed()
    }

    /// Exact entity type of a handle
    pub fn get_entity_type(&self, handle: Handle) -> Result<EntityTypeId> {
        self.resolve(handle).map(|instance| instance.entity_type())
    }

    pub fn get_entity_type_name(&self, handle: Handle) -> Result<&str> {
        let entity_type = self.get_entity_type(handle)?;
        Ok(self.registry.type_name(entity_type))
    }

    /// Whether the handle's instance is of `type_name` or one of its subtypes
    ///
    /// False for null or foreign handles and unknown type names.
    pub fn is_instance_of(&self, handle: Handle, type_name: &str) -> bool {
        let (Some(instance), Some(candidate)) =
            (self.store.resolve(handle), self.registry.get(type_name))
        else {
            return false;
        };
        self.cache
            .is_subtype_of(&self.registry, instance.entity_type(), candidate)
    }

    /// Stored form of an optional reference
    pub(crate) fn reference(&self, handle: Handle) -> Result<Option<AttributeValue>> {
        if handle.is_null() {
            return Ok(None);
        }
        let instance = self.resolve(handle)?;
        Ok(Some(AttributeValue::EntityRef(instance.id())))
    }

    /// Stored form of an aggregate of references; null members are rejected
    pub(crate) fn references(&self, name: &str, members: &[Handle]) -> Result<Vec<AttributeValue>> {
        members
            .iter()
            .map(|&member| {
                if member.is_null() {
                    return Err(Error::invalid_argument(format!(
                        "{} contains a null element",
                        name
                    )));
                }
                let instance = self.resolve(member)?;
                Ok(AttributeValue::EntityRef(instance.id()))
            })
            .collect()
    }
}

fn describe(value: &AttributeValue) -> String {
    match value {
        AttributeValue::EntityRef(id) => format!("reference {}", id),
        AttributeValue::Null => "null".to_string(),
        AttributeValue::Derived => "derived".to_string(),
        other => other
            .primitive_kind()
            .map(|kind| format!("{:?}", kind))
            .unwrap_or_else(|| "value".to_string()),
    }
}

/// Null anywhere inside an aggregate, nested aggregates included
fn has_null_member(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::List(items) => items
            .iter()
            .any(|v| v.is_null() || has_null_member(v)),
        _ => false,
    }
}

fn all_finite(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::Float(f) => f.is_finite(),
        AttributeValue::List(items) => items.iter().all(all_finite),
        AttributeValue::TypedValue(_, inner) => all_finite(inner),
        _ => true,
    }
}
