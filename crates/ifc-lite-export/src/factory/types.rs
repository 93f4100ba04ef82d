// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element types

use super::{ElementTypeArgs, EntityBuilder, Layer};
use crate::{ExportSession, Handle};
use ifc_lite_schema::{Error, Result};

/// Mandatory `PredefinedType` of an element type
struct TypeKind<'a>(&'a str);

impl Layer for TypeKind<'_> {
    fn validate(&self, _: &ExportSession) -> Result<()> {
        if self.0.trim().is_empty() {
            return Err(Error::invalid_argument("PredefinedType must not be empty"));
        }
        Ok(())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.enumeration("PredefinedType", Some(self.0))
    }
}

impl ExportSession {
    /// Create any concrete `IfcBuildingElementType` subtype
    pub fn create_element_type(
        &mut self,
        type_name: &str,
        args: &ElementTypeArgs,
        predefined_type: &str,
    ) -> Result<Handle> {
        self.require_subtype(type_name, "IfcBuildingElementType")?;
        self.build(type_name, &(args, TypeKind(predefined_type)))
    }

    pub fn create_wall_type(&mut self, args: &ElementTypeArgs, predefined_type: &str) -> Result<Handle> {
        self.create_element_type("IfcWallType", args, predefined_type)
    }

    pub fn create_beam_type(&mut self, args: &ElementTypeArgs, predefined_type: &str) -> Result<Handle> {
        self.create_element_type("IfcBeamType", args, predefined_type)
    }

    pub fn create_column_type(
        &mut self,
        args: &ElementTypeArgs,
        predefined_type: &str,
    ) -> Result<Handle> {
        self.create_element_type("IfcColumnType", args, predefined_type)
    }

    pub fn create_building_element_proxy_type(
        &mut self,
        args: &ElementTypeArgs,
        predefined_type: &str,
    ) -> Result<Handle> {
        self.create_element_type("IfcBuildingElementProxyType", args, predefined_type)
    }
}
