// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building, distribution and feature elements

use super::{ElementArgs, EntityBuilder, Layer, PredefinedType};
use crate::{ExportSession, Handle};
use ifc_lite_schema::{AttributeValue, Error, Result};

/// Roof and stair kind: `ShapeType` in IFC2X3, `PredefinedType` in IFC4
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ShapeOrPredefinedType<'a>(Option<&'a str>);

impl Layer for ShapeOrPredefinedType<'_> {
    fn validate(&self, _: &ExportSession) -> Result<()> {
        Ok(())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        if builder.declares("ShapeType") {
            // mandatory there
            builder.enumeration("ShapeType", Some(self.0.unwrap_or("NOTDEFINED")))
        } else {
            PredefinedType(self.0).write(builder)
        }
    }
}

/// Overall dimensions shared by doors and windows
fn check_overall(height: Option<f64>, width: Option<f64>) -> Result<()> {
    for (name, value) in [("OverallHeight", height), ("OverallWidth", width)] {
        if let Some(v) = value {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::invalid_argument(format!(
                    "{} must be a positive length, got {}",
                    name, v
                )));
            }
        }
    }
    Ok(())
}

/// `IfcDoor` attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DoorArgs {
    pub overall_height: Option<f64>,
    pub overall_width: Option<f64>,
    pub predefined_type: Option<String>,
    pub operation_type: Option<String>,
    pub user_defined_operation_type: Option<String>,
}

impl Layer for DoorArgs {
    fn validate(&self, _: &ExportSession) -> Result<()> {
        check_overall(self.overall_height, self.overall_width)
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.double("OverallHeight", self.overall_height)?;
        builder.double("OverallWidth", self.overall_width)?;
        builder.set_if_declared("PredefinedType", enum_value(&self.predefined_type))?;
        builder.set_if_declared("OperationType", enum_value(&self.operation_type))?;
        builder.set_if_declared(
            "UserDefinedOperationType",
            self.user_defined_operation_type.as_deref().map(AttributeValue::from),
        )
    }
}

/// `IfcWindow` attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindowArgs {
    pub overall_height: Option<f64>,
    pub overall_width: Option<f64>,
    pub predefined_type: Option<String>,
    pub partitioning_type: Option<String>,
    pub user_defined_partitioning_type: Option<String>,
}

impl Layer for WindowArgs {
    fn validate(&self, _: &ExportSession) -> Result<()> {
        check_overall(self.overall_height, self.overall_width)
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.double("OverallHeight", self.overall_height)?;
        builder.double("OverallWidth", self.overall_width)?;
        builder.set_if_declared("PredefinedType", enum_value(&self.predefined_type))?;
        builder.set_if_declared("PartitioningType", enum_value(&self.partitioning_type))?;
        builder.set_if_declared(
            "UserDefinedPartitioningType",
            self.user_defined_partitioning_type
                .as_deref()
                .map(AttributeValue::from),
        )
    }
}

fn enum_value(value: &Option<String>) -> Option<AttributeValue> {
    value.as_ref().map(|v| AttributeValue::Enum(v.clone()))
}

impl ExportSession {
    /// Create any concrete `IfcBuildingElement` subtype
    ///
    /// `predefined_type` is dropped for types and schema versions without a
    /// `PredefinedType` attribute.
    pub fn create_building_element(
        &mut self,
        type_name: &str,
        args: &ElementArgs,
        predefined_type: Option<&str>,
    ) -> Result<Handle> {
        self.require_subtype(type_name, "IfcBuildingElement")?;
        self.build(type_name, &(args, PredefinedType(predefined_type)))
    }

    /// Create any concrete `IfcDistributionElement` subtype
    pub fn create_distribution_element(
        &mut self,
        type_name: &str,
        args: &ElementArgs,
    ) -> Result<Handle> {
        self.require_subtype(type_name, "IfcDistributionElement")?;
        self.build(type_name, args)
    }

    pub fn create_wall(&mut self, args: &ElementArgs, predefined_type: Option<&str>) -> Result<Handle> {
        self.create_building_element("IfcWall", args, predefined_type)
    }

    pub fn create_curtain_wall(
        &mut self,
        args: &ElementArgs,
        predefined_type: Option<&str>,
    ) -> Result<Handle> {
        self.create_building_element("IfcCurtainWall", args, predefined_type)
    }

    pub fn create_roof(&mut self, args: &ElementArgs, roof_type: Option<&str>) -> Result<Handle> {
        self.build("IfcRoof", &(args, ShapeOrPredefinedType(roof_type)))
    }

    pub fn create_slab(&mut self, args: &ElementArgs, predefined_type: Option<&str>) -> Result<Handle> {
        self.create_building_element("IfcSlab", args, predefined_type)
    }

    pub fn create_beam(&mut self, args: &ElementArgs, predefined_type: Option<&str>) -> Result<Handle> {
        self.create_building_element("IfcBeam", args, predefined_type)
    }

    pub fn create_column(
        &mut self,
        args: &ElementArgs,
        predefined_type: Option<&str>,
    ) -> Result<Handle> {
        self.create_building_element("IfcColumn", args, predefined_type)
    }

    pub fn create_member(
        &mut self,
        args: &ElementArgs,
        predefined_type: Option<&str>,
    ) -> Result<Handle> {
        self.create_building_element("IfcMember", args, predefined_type)
    }

    pub fn create_plate(&mut self, args: &ElementArgs, predefined_type: Option<&str>) -> Result<Handle> {
        self.create_building_element("IfcPlate", args, predefined_type)
    }

    pub fn create_railing(
        &mut self,
        args: &ElementArgs,
        predefined_type: Option<&str>,
    ) -> Result<Handle> {
        self.create_building_element("IfcRailing", args, predefined_type)
    }

    pub fn create_stair(&mut self, args: &ElementArgs, stair_type: Option<&str>) -> Result<Handle> {
        self.build("IfcStair", &(args, ShapeOrPredefinedType(stair_type)))
    }

    pub fn create_covering(
        &mut self,
        args: &ElementArgs,
        predefined_type: Option<&str>,
    ) -> Result<Handle> {
        self.create_building_element("IfcCovering", args, predefined_type)
    }

    pub fn create_door(&mut self, args: &ElementArgs, door: &DoorArgs) -> Result<Handle> {
        self.build("IfcDoor", &(args, door))
    }

    pub fn create_window(&mut self, args: &ElementArgs, window: &WindowArgs) -> Result<Handle> {
        self.build("IfcWindow", &(args, window))
    }

    pub fn create_building_element_proxy(
        &mut self,
        args: &ElementArgs,
        predefined_type: Option<&str>,
    ) -> Result<Handle> {
        self.create_building_element("IfcBuildingElementProxy", args, predefined_type)
    }

    pub fn create_furnishing_element(&mut self, args: &ElementArgs) -> Result<Handle> {
        self.build("IfcFurnishingElement", args)
    }

    pub fn create_flow_segment(&mut self, args: &ElementArgs) -> Result<Handle> {
        self.create_distribution_element("IfcFlowSegment", args)
    }

    pub fn create_flow_terminal(&mut self, args: &ElementArgs) -> Result<Handle> {
        self.create_distribution_element("IfcFlowTerminal", args)
    }

    pub fn create_flow_fitting(&mut self, args: &ElementArgs) -> Result<Handle> {
        self.create_distribution_element("IfcFlowFitting", args)
    }

    pub fn create_opening_element(
        &mut self,
        args: &ElementArgs,
        predefined_type: Option<&str>,
    ) -> Result<Handle> {
        self.build("IfcOpeningElement", &(args, PredefinedType(predefined_type)))
    }

    /// Fail unless `type_name` is `supertype` or one of its subtypes
    pub(crate) fn require_subtype(&self, type_name: &str, supertype: &str) -> Result<()> {
        let ty = self.registry.lookup(type_name)?;
        let candidate = self.registry.lookup(supertype)?;
        if self.cache.is_subtype_of(&self.registry, ty, candidate) {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "{} is not a subtype of {}",
                self.registry.type_name(ty),
                supertype
            )))
        }
    }
}
