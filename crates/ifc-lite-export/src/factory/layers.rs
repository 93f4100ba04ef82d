// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arguments of the shared inheritance levels
//!
//! Each struct wraps the one above it: `RootArgs` -> `ObjectArgs` ->
//! `ProductArgs` -> `ElementArgs` / `SpatialArgs` for occurrences, and
//! `RootArgs` -> `TypeObjectArgs` -> `TypeProductArgs` -> `ElementTypeArgs`
//! for types. Validation and writing always start at the root.

use super::{supplied, EntityBuilder, Layer};
use crate::{guid, ExportSession, Handle};
use ifc_lite_schema::{AttributeValue, Result};

/// `IfcRoot` attributes
#[derive(Clone, Debug, PartialEq)]
pub struct RootArgs {
    pub global_id: String,
    pub owner_history: Handle,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl RootArgs {
    pub fn new(global_id: impl Into<String>) -> Self {
        Self {
            global_id: global_id.into(),
            owner_history: Handle::NULL,
            name: None,
            description: None,
        }
    }

    /// Root arguments with a fresh random GlobalId
    pub fn generated() -> Self {
        Self::new(guid::new_guid())
    }

    pub fn with_owner_history(mut self, owner_history: Handle) -> Self {
        self.owner_history = owner_history;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Layer for RootArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        session.validate_global_id(&self.global_id)?;
        session.validate_argument("OwnerHistory", self.owner_history, true, &["IfcOwnerHistory"])?;
        // IFC2X3 makes OwnerHistory mandatory
        session.check_required("IfcRoot", "OwnerHistory", self.owner_history.has_value())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.string("GlobalId", Some(self.global_id.as_str()))?;
        builder.instance("OwnerHistory", self.owner_history)?;
        builder.string("Name", self.name.as_deref())?;
        builder.string("Description", self.description.as_deref())
    }
}

/// `IfcObject` attributes
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectArgs {
    pub root: RootArgs,
    pub object_type: Option<String>,
}

impl ObjectArgs {
    pub fn new(root: RootArgs) -> Self {
        Self {
            root,
            object_type: None,
        }
    }

    pub fn with_object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }
}

impl Layer for ObjectArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.root.validate(session)
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.root.write(builder)?;
        builder.string("ObjectType", self.object_type.as_deref())
    }
}

/// `IfcProduct` attributes
#[derive(Clone, Debug, PartialEq)]
pub struct ProductArgs {
    pub object: ObjectArgs,
    pub placement: Handle,
    pub representation: Handle,
}

impl ProductArgs {
    pub fn new(root: RootArgs) -> Self {
        Self {
            object: ObjectArgs::new(root),
            placement: Handle::NULL,
            representation: Handle::NULL,
        }
    }
}

impl Layer for ProductArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.object.validate(session)?;
        session.validate_argument("ObjectPlacement", self.placement, true, &["IfcObjectPlacement"])?;
        session.validate_argument(
            "Representation",
            self.representation,
            true,
            &["IfcProductRepresentation"],
        )
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.object.write(builder)?;
        builder.instance("ObjectPlacement", self.placement)?;
        builder.instance("Representation", self.representation)
    }
}

/// `IfcElement` attributes
#[derive(Clone, Debug, PartialEq)]
pub struct ElementArgs {
    pub product: ProductArgs,
    pub tag: Option<String>,
}

impl ElementArgs {
    pub fn new(root: RootArgs) -> Self {
        Self {
            product: ProductArgs::new(root),
            tag: None,
        }
    }

    pub fn with_object_type(mut self, object_type: impl Into<String>) -> Self {
        self.product.object.object_type = Some(object_type.into());
        self
    }

    pub fn with_placement(mut self, placement: Handle) -> Self {
        self.product.placement = placement;
        self
    }

    pub fn with_representation(mut self, representation: Handle) -> Self {
        self.product.representation = representation;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

impl Layer for ElementArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.product.validate(session)
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.product.write(builder)?;
        builder.string("Tag", self.tag.as_deref())
    }
}

/// `IfcSpatialStructureElement` attributes
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialArgs {
    pub product: ProductArgs,
    pub long_name: Option<String>,
    /// Defaults to `ELEMENT`
    pub composition_type: Option<String>,
}

impl SpatialArgs {
    pub fn new(root: RootArgs) -> Self {
        Self {
            product: ProductArgs::new(root),
            long_name: None,
            composition_type: Some("ELEMENT".to_string()),
        }
    }

    pub fn with_placement(mut self, placement: Handle) -> Self {
        self.product.placement = placement;
        self
    }

    pub fn with_representation(mut self, representation: Handle) -> Self {
        self.product.representation = representation;
        self
    }

    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    pub fn with_composition_type(mut self, composition_type: Option<&str>) -> Self {
        self.composition_type = composition_type.map(str::to_string);
        self
    }
}

impl Layer for SpatialArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.product.validate(session)?;
        session.check_required(
            "IfcSpatialStructureElement",
            "CompositionType",
            self.composition_type.is_some(),
        )
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.product.write(builder)?;
        builder.string("LongName", self.long_name.as_deref())?;
        builder.enumeration("CompositionType", self.composition_type.as_deref())
    }
}

/// `IfcTypeObject` attributes
#[derive(Clone, Debug, PartialEq)]
pub struct TypeObjectArgs {
    pub root: RootArgs,
    pub applicable_occurrence: Option<String>,
    pub property_sets: Vec<Handle>,
}

impl TypeObjectArgs {
    pub fn new(root: RootArgs) -> Self {
        Self {
            root,
            applicable_occurrence: None,
            property_sets: Vec::new(),
        }
    }
}

impl Layer for TypeObjectArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.root.validate(session)?;
        session.validate_all_arguments(
            "HasPropertySets",
            Some(self.property_sets.as_slice()),
            true,
            &["IfcPropertySetDefinition"],
        )
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.root.write(builder)?;
        builder.string("ApplicableOccurrence", self.applicable_occurrence.as_deref())?;
        builder.instances("HasPropertySets", supplied(&self.property_sets))
    }
}

/// `IfcTypeProduct` attributes
#[derive(Clone, Debug, PartialEq)]
pub struct TypeProductArgs {
    pub type_object: TypeObjectArgs,
    pub representation_maps: Vec<Handle>,
    pub tag: Option<String>,
}

impl Layer for TypeProductArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.type_object.validate(session)?;
        session.validate_all_arguments(
            "RepresentationMaps",
            Some(self.representation_maps.as_slice()),
            true,
            &["IfcRepresentationMap"],
        )
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.type_object.write(builder)?;
        builder.instances("RepresentationMaps", supplied(&self.representation_maps))?;
        builder.string("Tag", self.tag.as_deref())
    }
}

/// `IfcElementType` attributes
#[derive(Clone, Debug, PartialEq)]
pub struct ElementTypeArgs {
    pub type_product: TypeProductArgs,
    pub element_type: Option<String>,
}

impl ElementTypeArgs {
    pub fn new(root: RootArgs) -> Self {
        Self {
            type_product: TypeProductArgs {
                type_object: TypeObjectArgs::new(root),
                representation_maps: Vec::new(),
                tag: None,
            },
            element_type: None,
        }
    }

    pub fn with_property_sets(mut self, property_sets: Vec<Handle>) -> Self {
        self.type_product.type_object.property_sets = property_sets;
        self
    }

    pub fn with_representation_maps(mut self, representation_maps: Vec<Handle>) -> Self {
        self.type_product.representation_maps = representation_maps;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.type_product.tag = Some(tag.into());
        self
    }

    pub fn with_element_type(mut self, element_type: impl Into<String>) -> Self {
        self.element_type = Some(element_type.into());
        self
    }
}

impl Layer for ElementTypeArgs {
    fn validate(&self, session: &ExportSession) -> Result<()> {
        self.type_product.validate(session)
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        self.type_product.write(builder)?;
        builder.string("ElementType", self.element_type.as_deref())
    }
}

/// `PredefinedType` of the leaf entity, skipped where the schema version
/// does not declare it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredefinedType<'a>(pub Option<&'a str>);

impl Layer for PredefinedType<'_> {
    fn validate(&self, _: &ExportSession) -> Result<()> {
        Ok(())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.set_if_declared(
            "PredefinedType",
            self.0.map(|v| AttributeValue::Enum(v.to_string())),
        )
    }
}
