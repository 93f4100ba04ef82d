// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Objectified relationships

use super::{EntityBuilder, Layer, RootArgs};
use crate::{ExportSession, Handle};
use ifc_lite_schema::{Error, Result};

/// One relating instance and a non-empty set of related instances
struct OneToMany<'a> {
    relating_name: &'a str,
    relating: Handle,
    relating_types: &'a [&'a str],
    related_name: &'a str,
    related: &'a [Handle],
    related_types: &'a [&'a str],
}

impl Layer for OneToMany<'_> {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        session.validate_argument(self.relating_name, self.relating, false, self.relating_types)?;
        session.validate_members(self.related_name, self.related, self.related_types)?;
        if self.related.contains(&self.relating) {
            return Err(Error::invalid_argument(format!(
                "{} {} is also one of {}",
                self.relating_name, self.relating, self.related_name
            )));
        }
        Ok(())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.instance(self.relating_name, self.relating)?;
        builder.instances(self.related_name, Some(self.related))
    }
}

/// Two mandatory references
struct OneToOne<'a> {
    first: (&'a str, Handle, &'a [&'a str]),
    second: (&'a str, Handle, &'a [&'a str]),
}

impl Layer for OneToOne<'_> {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        let (name, handle, types) = self.first;
        session.validate_argument(name, handle, false, types)?;
        let (name, handle, types) = self.second;
        session.validate_argument(name, handle, false, types)
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.instance(self.first.0, self.first.1)?;
        builder.instance(self.second.0, self.second.1)
    }
}

impl ExportSession {
    /// Whole/part decomposition
    pub fn create_rel_aggregates(
        &mut self,
        root: &RootArgs,
        relating_object: Handle,
        related_objects: &[Handle],
    ) -> Result<Handle> {
        let relation = OneToMany {
            relating_name: "RelatingObject",
            relating: relating_object,
            relating_types: &["IfcObjectDefinition"],
            related_name: "RelatedObjects",
            related: related_objects,
            related_types: &["IfcObjectDefinition"],
        };
        self.build("IfcRelAggregates", &(root, relation))
    }

    /// Elements contained in a spatial structure element
    pub fn create_rel_contained_in_spatial_structure(
        &mut self,
        root: &RootArgs,
        related_elements: &[Handle],
        relating_structure: Handle,
    ) -> Result<Handle> {
        let relation = OneToMany {
            relating_name: "RelatingStructure",
            relating: relating_structure,
            relating_types: &["IfcSpatialStructureElement"],
            related_name: "RelatedElements",
            related: related_elements,
            related_types: &["IfcProduct"],
        };
        self.build("IfcRelContainedInSpatialStructure", &(root, relation))
    }

    /// Attach a property set to objects
    pub fn create_rel_defines_by_properties(
        &mut self,
        root: &RootArgs,
        related_objects: &[Handle],
        property_set: Handle,
    ) -> Result<Handle> {
        let relation = OneToMany {
            relating_name: "RelatingPropertyDefinition",
            relating: property_set,
            relating_types: &["IfcPropertySetDefinition"],
            related_name: "RelatedObjects",
            related: related_objects,
            related_types: &["IfcObjectDefinition"],
        };
        self.build("IfcRelDefinesByProperties", &(root, relation))
    }

    /// Assign a type object to occurrences
    pub fn create_rel_defines_by_type(
        &mut self,
        root: &RootArgs,
        related_objects: &[Handle],
        relating_type: Handle,
    ) -> Result<Handle> {
        let relation = OneToMany {
            relating_name: "RelatingType",
            relating: relating_type,
            relating_types: &["IfcTypeObject"],
            related_name: "RelatedObjects",
            related: related_objects,
            related_types: &["IfcObject"],
        };
        self.build("IfcRelDefinesByType", &(root, relation))
    }

    /// Associate a material with objects
    pub fn create_rel_associates_material(
        &mut self,
        root: &RootArgs,
        related_objects: &[Handle],
        material: Handle,
    ) -> Result<Handle> {
        let relation = OneToMany {
            relating_name: "RelatingMaterial",
            relating: material,
            relating_types: &["IfcMaterial"],
            related_name: "RelatedObjects",
            related: related_objects,
            related_types: &["IfcObjectDefinition", "IfcPropertyDefinition"],
        };
        self.build("IfcRelAssociatesMaterial", &(root, relation))
    }

    /// Opening that voids a building element
    pub fn create_rel_voids_element(
        &mut self,
        root: &RootArgs,
        building_element: Handle,
        opening: Handle,
    ) -> Result<Handle> {
        let relation = OneToOne {
            first: ("RelatingBuildingElement", building_element, &["IfcElement"]),
            second: (
                "RelatedOpeningElement",
                opening,
                &["IfcFeatureElementSubtraction"],
            ),
        };
        self.build("IfcRelVoidsElement", &(root, relation))
    }

    /// Element (door, window) filling an opening
    pub fn create_rel_fills_element(
        &mut self,
        root: &RootArgs,
        opening: Handle,
        building_element: Handle,
    ) -> Result<Handle> {
        let relation = OneToOne {
            first: ("RelatingOpeningElement", opening, &["IfcOpeningElement"]),
            second: ("RelatedBuildingElement", building_element, &["IfcElement"]),
        };
        self.build("IfcRelFillsElement", &(root, relation))
    }
}
