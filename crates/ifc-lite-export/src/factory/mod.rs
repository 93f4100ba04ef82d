// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Instance factories
//!
//! A concrete entity is assembled from layers. Each inheritance level the
//! entity passes through contributes one [`Layer`] with its own argument
//! checks and its own slice of attributes; the per-type factories compose
//! the layers root-first and hand them to [`ExportSession::build`].
//!
//! Building is all-or-nothing: every layer is validated and every attribute
//! staged before the instance is allocated, so a failed call leaves the
//! store as it was.

mod elements;
mod layers;
mod properties;
mod relations;
mod resources;
mod spatial;
mod types;

pub use elements::*;
pub use layers::*;
pub use properties::*;
pub use relations::*;
pub use resources::*;
pub use spatial::*;
pub use types::*;

use crate::attributes::declared_attribute;
use crate::{ExportSession, Handle};
use ifc_lite_schema::{AttributeValue, EntityTypeId, Error, Logical, Result};

/// One inheritance level's contribution to an instance
pub trait Layer {
    /// Check this level's arguments against the session
    fn validate(&self, session: &ExportSession) -> Result<()>;

    /// Stage this level's attributes
    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()>;
}

impl<T: Layer + ?Sized> Layer for &T {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        (**self).validate(session)
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        (**self).write(builder)
    }
}

impl<A: Layer, B: Layer> Layer for (A, B) {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.0.validate(session)?;
        self.1.validate(session)
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.0.write(builder)?;
        self.1.write(builder)
    }
}

impl<A: Layer, B: Layer, C: Layer> Layer for (A, B, C) {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.0.validate(session)?;
        self.1.validate(session)?;
        self.2.validate(session)
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.0.write(builder)?;
        self.1.write(builder)?;
        self.2.write(builder)
    }
}

/// Layer made of two closures, for leaf entities without reusable arguments
pub(crate) struct FnLayer<V, W> {
    validate: V,
    write: W,
}

/// Build an [`FnLayer`]
pub(crate) fn layer<V, W>(validate: V, write: W) -> FnLayer<V, W>
where
    V: Fn(&ExportSession) -> Result<()>,
    W: Fn(&mut EntityBuilder<'_>) -> Result<()>,
{
    FnLayer { validate, write }
}

impl<V, W> Layer for FnLayer<V, W>
where
    V: Fn(&ExportSession) -> Result<()>,
    W: Fn(&mut EntityBuilder<'_>) -> Result<()>,
{
    fn validate(&self, session: &ExportSession) -> Result<()> {
        (self.validate)(session)
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        (self.write)(builder)
    }
}

/// Attribute values staged for an instance that does not exist yet
///
/// Every value goes through the same checks as the session setters.
pub struct EntityBuilder<'s> {
    session: &'s ExportSession,
    entity_type: EntityTypeId,
    values: Vec<Option<AttributeValue>>,
}

impl<'s> EntityBuilder<'s> {
    fn new(session: &'s ExportSession, entity_type: EntityTypeId) -> Self {
        let slots = session.registry.attributes_of(entity_type).len();
        Self {
            session,
            entity_type,
            values: vec![None; slots],
        }
    }

    pub fn session(&self) -> &'s ExportSession {
        self.session
    }

    /// Name of the entity being built
    pub fn type_name(&self) -> &'s str {
        self.session.registry.type_name(self.entity_type)
    }

    /// Whether the entity declares `name` in the session's schema
    pub fn declares(&self, name: &str) -> bool {
        self.session
            .registry
            .attribute_slot(self.entity_type, name)
            .is_some()
    }

    /// Whether the entity declares `name` as mandatory
    pub fn requires(&self, name: &str) -> bool {
        self.session
            .registry
            .attribute(self.entity_type, name)
            .map(|def| def.is_mandatory())
            .unwrap_or(false)
    }

    /// Stage a value; `None` leaves the attribute unset
    pub fn set(&mut self, name: &str, value: Option<AttributeValue>) -> Result<()> {
        let session = self.session;
        let (slot, def) = declared_attribute(&session.registry, self.entity_type, name)?;
        self.values[slot] = match value {
            None | Some(AttributeValue::Null) => None,
            Some(value) => Some(session.check_value(self.entity_type, def, value)?),
        };
        Ok(())
    }

    /// Stage a value only if the schema version declares the attribute
    pub fn set_if_declared(&mut self, name: &str, value: Option<AttributeValue>) -> Result<()> {
        if self.declares(name) {
            return self.set(name, value);
        }
        if value.is_some() {
            log::trace!(
                "{}.{} not declared in {}, skipped",
                self.type_name(),
                name,
                self.session.registry.identifier()
            );
        }
        Ok(())
    }

    pub fn string(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        self.set(name, value.map(AttributeValue::from))
    }

    pub fn double(&mut self, name: &str, value: Option<f64>) -> Result<()> {
        self.set(name, value.map(AttributeValue::Float))
    }

    pub fn integer(&mut self, name: &str, value: Option<i64>) -> Result<()> {
        self.set(name, value.map(AttributeValue::Integer))
    }

    pub fn boolean(&mut self, name: &str, value: Option<bool>) -> Result<()> {
        self.set(name, value.map(AttributeValue::Bool))
    }

    pub fn logical(&mut self, name: &str, value: Option<Logical>) -> Result<()> {
        self.set(name, value.map(AttributeValue::Logical))
    }

    pub fn enumeration(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        self.set(name, value.map(|v| AttributeValue::Enum(v.to_string())))
    }

    pub fn instance(&mut self, name: &str, value: Handle) -> Result<()> {
        let value = self.session.reference(value)?;
        self.set(name, value)
    }

    /// Stage an aggregate of references; `None` leaves it unset
    pub fn instances(&mut self, name: &str, value: Option<&[Handle]>) -> Result<()> {
        let value = match value {
            Some(members) => Some(AttributeValue::List(self.session.references(name, members)?)),
            None => None,
        };
        self.set(name, value)
    }

    pub fn strings(&mut self, name: &str, value: Option<&[String]>) -> Result<()> {
        self.set(name, list(value, |s| AttributeValue::String(s.clone())))
    }

    pub fn doubles(&mut self, name: &str, value: Option<&[f64]>) -> Result<()> {
        self.set(name, list(value, |&v| AttributeValue::Float(v)))
    }

    pub fn integers(&mut self, name: &str, value: Option<&[i64]>) -> Result<()> {
        self.set(name, list(value, |&v| AttributeValue::Integer(v)))
    }

    /// Stage a typed select value such as `IfcLabel('x')`
    pub fn typed(&mut self, name: &str, value: Option<(&str, &AttributeValue)>) -> Result<()> {
        self.set(
            name,
            value.map(|(type_name, inner)| {
                AttributeValue::TypedValue(type_name.to_string(), Box::new(inner.clone()))
            }),
        )
    }

    /// Verify every mandatory attribute is staged
    fn finish(self) -> Result<Vec<Option<AttributeValue>>> {
        let registry = &self.session.registry;
        let attributes = registry.attributes_of(self.entity_type);
        for (def, value) in attributes.iter().zip(&self.values) {
            if def.is_mandatory() && value.is_none() {
                return Err(Error::missing(
                    registry.type_name(self.entity_type),
                    def.name.as_str(),
                ));
            }
        }
        Ok(self.values)
    }
}

fn list<T>(
    value: Option<&[T]>,
    convert: impl Fn(&T) -> AttributeValue,
) -> Option<AttributeValue> {
    value.map(|items| AttributeValue::List(items.iter().map(convert).collect()))
}

/// Optional aggregate held in a `Vec` argument: empty means not supplied
pub(crate) fn supplied<T>(items: &[T]) -> Option<&[T]> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

impl ExportSession {
    /// Construct an instance of `type_name` from its layers
    pub fn build(&mut self, type_name: &str, layer: &dyn Layer) -> Result<Handle> {
        let entity_type = self.concrete_type(type_name)?;
        layer.validate(self)?;

        let values = {
            let mut builder = EntityBuilder::new(self, entity_type);
            layer.write(&mut builder)?;
            builder.finish()?
        };

        let handle = self.store.push(entity_type, values);
        log::trace!("built {}={}", handle, self.registry.type_name(entity_type));
        Ok(handle)
    }
}
