// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property sets and single-value properties

use super::{EntityBuilder, Layer, RootArgs};
use crate::{ExportSession, Handle};
use ifc_lite_schema::{AttributeValue, Error, Logical, Result};
use rustc_hash::FxHashSet;

/// Value of an `IfcPropertySingleValue`, written as `IFCLABEL('x')` etc.
#[derive(Clone, Debug, PartialEq)]
pub struct NominalValue {
    pub type_name: String,
    pub value: AttributeValue,
}

impl NominalValue {
    pub fn new(type_name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    pub fn label(value: impl Into<String>) -> Self {
        Self::new("IfcLabel", AttributeValue::String(value.into()))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new("IfcText", AttributeValue::String(value.into()))
    }

    pub fn identifier(value: impl Into<String>) -> Self {
        Self::new("IfcIdentifier", AttributeValue::String(value.into()))
    }

    pub fn real(value: f64) -> Self {
        Self::new("IfcReal", value)
    }

    pub fn integer(value: i64) -> Self {
        Self::new("IfcInteger", value)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new("IfcBoolean", value)
    }

    pub fn logical(value: Logical) -> Self {
        Self::new("IfcLogical", AttributeValue::Logical(value))
    }

    pub fn length(value: f64) -> Self {
        Self::new("IfcLengthMeasure", value)
    }

    pub fn area(value: f64) -> Self {
        Self::new("IfcAreaMeasure", value)
    }

    pub fn volume(value: f64) -> Self {
        Self::new("IfcVolumeMeasure", value)
    }
}

struct PropertySet<'a> {
    root: &'a RootArgs,
    properties: &'a [Handle],
}

impl Layer for PropertySet<'_> {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.root.validate(session)?;
        if self.root.name.is_none() {
            return Err(Error::missing("IfcPropertySet", "Name"));
        }
        session.validate_members("HasProperties", self.properties, &["IfcProperty"])?;

        let mut seen = FxHashSet::default();
        for &property in self.properties {
            let name = session.get_string(property, "Name").unwrap_or_default();
            if !seen.insert(name) {
                return Err(Error::invalid_argument(format!(
                    "property {} appears twice in {}",
                    name,
                    self.root.name.as_deref().unwrap_or_default()
                )));
            }
        }
        Ok(())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.root.write(builder)?;
        builder.instances("HasProperties", Some(self.properties))
    }
}

struct SingleValue<'a> {
    name: &'a str,
    description: Option<&'a str>,
    value: Option<&'a NominalValue>,
    unit: Handle,
}

impl Layer for SingleValue<'_> {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::missing("IfcPropertySingleValue", "Name"));
        }
        session.validate_argument("Unit", self.unit, true, &["IfcNamedUnit", "IfcMonetaryUnit"])
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.string("Name", Some(self.name))?;
        builder.string("Description", self.description)?;
        builder.typed(
            "NominalValue",
            self.value.map(|v| (v.type_name.as_str(), &v.value)),
        )?;
        builder.instance("Unit", self.unit)
    }
}

impl ExportSession {
    /// Named set of properties; property names must be unique
    pub fn create_property_set(&mut self, root: &RootArgs, properties: &[Handle]) -> Result<Handle> {
        self.build("IfcPropertySet", &PropertySet { root, properties })
    }

    pub fn create_property_single_value(
        &mut self,
        name: &str,
        description: Option<&str>,
        value: Option<&NominalValue>,
        unit: Handle,
    ) -> Result<Handle> {
        let property = SingleValue {
            name,
            description,
            value,
            unit,
        };
        self.build("IfcPropertySingleValue", &property)
    }
}
