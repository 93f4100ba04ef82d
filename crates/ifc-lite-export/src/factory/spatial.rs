// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Project and spatial structure

use super::{supplied, EntityBuilder, Layer, RootArgs, SpatialArgs};
use crate::{ExportSession, Handle};
use ifc_lite_schema::{AttributeValue, Error, Result};

/// `IfcProject`, an `IfcContext` in IFC4 and an `IfcObject` in IFC2X3
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectArgs {
    pub root: RootArgs,
    pub object_type: Option<String>,
    pub long_name: Option<String>,
    pub phase: Option<String>,
    pub representation_contexts: Vec<Handle>,
    pub units: Handle,
}

impl ProjectArgs {
    pub fn new(root: RootArgs) -> Self {
        Self {
            root,
            object_type: None,
            long_name: None,
            phase: None,
            representation_contexts: Vec::new(),
            units: Handle::NULL,
        }
    }

    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn with_contexts(mut self, contexts: Vec<Handle>) -> Self {
        self.representation_contexts = contexts;
        self
    }

    pub fn with_units(mut self, units: Handle) -> Self {
        self.units = units;
        self
    }
}

impl Layer for ProjectArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.root.validate(session)?;
        if self.root.name.is_none() {
            return Err(Error::missing("IfcProject", "Name"));
        }
        session.validate_all_arguments(
            "RepresentationContexts",
            Some(self.representation_contexts.as_slice()),
            true,
            &["IfcRepresentationContext"],
        )?;
        session.check_required(
            "IfcProject",
            "RepresentationContexts",
            !self.representation_contexts.is_empty(),
        )?;
        session.validate_argument("UnitsInContext", self.units, true, &["IfcUnitAssignment"])?;
        session.check_required("IfcProject", "UnitsInContext", self.units.has_value())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.root.write(builder)?;
        builder.string("ObjectType", self.object_type.as_deref())?;
        builder.string("LongName", self.long_name.as_deref())?;
        builder.string("Phase", self.phase.as_deref())?;
        builder.instances("RepresentationContexts", supplied(&self.representation_contexts))?;
        builder.instance("UnitsInContext", self.units)
    }
}

/// `IfcSite` attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SiteArgs {
    /// Degrees, minutes, seconds and optionally millionths of a second
    pub ref_latitude: Option<Vec<i64>>,
    pub ref_longitude: Option<Vec<i64>>,
    pub ref_elevation: Option<f64>,
    pub land_title_number: Option<String>,
    pub address: Handle,
}

impl SiteArgs {
    fn check_angle(name: &str, angle: &Option<Vec<i64>>) -> Result<()> {
        let Some(parts) = angle else {
            return Ok(());
        };
        if !(3..=4).contains(&parts.len()) {
            return Err(Error::invalid_argument(format!(
                "{} needs 3 or 4 components, got {}",
                name,
                parts.len()
            )));
        }
        if parts[1].abs() >= 60 || parts[2].abs() >= 60 {
            return Err(Error::invalid_argument(format!(
                "{}: minutes and seconds must be below 60",
                name
            )));
        }
        Ok(())
    }
}

impl Layer for SiteArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        Self::check_angle("RefLatitude", &self.ref_latitude)?;
        Self::check_angle("RefLongitude", &self.ref_longitude)?;
        session.validate_argument("SiteAddress", self.address, true, &["IfcPostalAddress"])
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.integers("RefLatitude", self.ref_latitude.as_deref())?;
        builder.integers("RefLongitude", self.ref_longitude.as_deref())?;
        builder.double("RefElevation", self.ref_elevation)?;
        builder.string("LandTitleNumber", self.land_title_number.as_deref())?;
        builder.instance("SiteAddress", self.address)
    }
}

/// `IfcBuilding` attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildingArgs {
    pub elevation_of_ref_height: Option<f64>,
    pub elevation_of_terrain: Option<f64>,
    pub address: Handle,
}

impl Layer for BuildingArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        session.validate_argument("BuildingAddress", self.address, true, &["IfcPostalAddress"])
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.double("ElevationOfRefHeight", self.elevation_of_ref_height)?;
        builder.double("ElevationOfTerrain", self.elevation_of_terrain)?;
        builder.instance("BuildingAddress", self.address)
    }
}

struct Elevation(Option<f64>);

impl Layer for Elevation {
    fn validate(&self, _: &ExportSession) -> Result<()> {
        Ok(())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.double("Elevation", self.0)
    }
}

/// `IfcSpace` attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpaceArgs {
    /// `IfcSpaceTypeEnum` literal (IFC4)
    pub predefined_type: Option<String>,
    /// `INTERNAL`, `EXTERNAL` or `NOTDEFINED` (IFC2X3, mandatory there)
    pub interior_or_exterior: Option<String>,
    pub elevation_with_flooring: Option<f64>,
}

impl Layer for SpaceArgs {
    fn validate(&self, _: &ExportSession) -> Result<()> {
        Ok(())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.set_if_declared(
            "PredefinedType",
            self.predefined_type.clone().map(AttributeValue::Enum),
        )?;
        if builder.declares("InteriorOrExteriorSpace") {
            let value = self.interior_or_exterior.as_deref().unwrap_or("NOTDEFINED");
            builder.enumeration("InteriorOrExteriorSpace", Some(value))?;
        }
        builder.double("ElevationWithFlooring", self.elevation_with_flooring)
    }
}

impl ExportSession {
    pub fn create_project(&mut self, args: &ProjectArgs) -> Result<Handle> {
        self.build("IfcProject", args)
    }

    pub fn create_site(&mut self, spatial: &SpatialArgs, site: &SiteArgs) -> Result<Handle> {
        self.build("IfcSite", &(spatial, site))
    }

    pub fn create_building(
        &mut self,
        spatial: &SpatialArgs,
        building: &BuildingArgs,
    ) -> Result<Handle> {
        self.build("IfcBuilding", &(spatial, building))
    }

    pub fn create_building_storey(
        &mut self,
        spatial: &SpatialArgs,
        elevation: Option<f64>,
    ) -> Result<Handle> {
        self.build("IfcBuildingStorey", &(spatial, Elevation(elevation)))
    }

    pub fn create_space(&mut self, spatial: &SpatialArgs, space: &SpaceArgs) -> Result<Handle> {
        self.build("IfcSpace", &(spatial, space))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_lite_schema::SchemaVersion;

    #[test]
    fn test_project_needs_name() {
        let mut s = ExportSession::for_version(SchemaVersion::Ifc4).unwrap();
        let err = s
            .create_project(&ProjectArgs::new(RootArgs::generated()))
            .unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { .. }));

        let project = s
            .create_project(&ProjectArgs::new(RootArgs::generated().with_name("P")))
            .unwrap();
        assert_eq!(s.get_string(project, "Name"), Some("P"));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_storey_and_space() {
        let mut s = ExportSession::for_version(SchemaVersion::Ifc4).unwrap();
        let spatial = SpatialArgs::new(RootArgs::generated().with_name("Level 1"));
        let storey = s.create_building_storey(&spatial, Some(3.5)).unwrap();
        assert_eq!(s.get_double(storey, "Elevation"), Some(3.5));
        assert_eq!(s.get_enum(storey, "CompositionType"), Some("ELEMENT"));

        let space = SpaceArgs {
            predefined_type: Some("INTERNAL".into()),
            interior_or_exterior: Some("INTERNAL".into()),
            ..SpaceArgs::default()
        };
        let room = s
            .create_space(&SpatialArgs::new(RootArgs::generated()), &space)
            .unwrap();
        assert_eq!(s.get_enum(room, "PredefinedType"), Some("INTERNAL"));
    }

    #[test]
    fn test_site_angles() {
        let mut s = ExportSession::for_version(SchemaVersion::Ifc4).unwrap();
        let spatial = SpatialArgs::new(RootArgs::generated().with_name("Site"));
        let site = SiteArgs {
            ref_latitude: Some(vec![52, 30, 15]),
            ref_longitude: Some(vec![13, 75, 0]),
            ..SiteArgs::default()
        };
        assert!(s.create_site(&spatial, &site).unwrap_err().is_invalid_argument());

        let site = SiteArgs {
            ref_longitude: Some(vec![13, 24, 0, 500_000]),
            ..site
        };
        let handle = s.create_site(&spatial, &site).unwrap();
        assert_eq!(
            s.get_aggregate(handle, "RefLatitude").map(|v| v.len()),
            Some(3)
        );
    }
}
