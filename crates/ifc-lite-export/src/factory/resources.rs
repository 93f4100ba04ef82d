// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resource entities: actors, geometry, representations, units, materials
//!
//! These entities are not rooted, so each factory is a single layer.

use super::{layer, supplied};
use crate::{ExportSession, Handle};
use ifc_lite_schema::{AttributeValue, Error, Result};

fn non_empty(entity: &str, attribute: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::missing(entity, attribute))
    } else {
        Ok(())
    }
}

fn identification_attribute(builder: &super::EntityBuilder<'_>) -> &'static str {
    if builder.declares("Identification") {
        "Identification"
    } else {
        "Id"
    }
}

/// `IfcPerson` attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersonArgs {
    /// `Identification` in IFC4, `Id` in IFC2X3
    pub identification: Option<String>,
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub middle_names: Vec<String>,
    pub prefix_titles: Vec<String>,
    pub suffix_titles: Vec<String>,
    pub roles: Vec<Handle>,
    pub addresses: Vec<Handle>,
}

/// `IfcOrganization` attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrganizationArgs {
    pub identification: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub roles: Vec<Handle>,
    pub addresses: Vec<Handle>,
}

/// `IfcOwnerHistory` attributes
#[derive(Clone, Debug, PartialEq)]
pub struct OwnerHistoryArgs {
    pub owning_user: Handle,
    pub owning_application: Handle,
    pub state: Option<String>,
    /// Written as `NOTDEFINED` when unset and the schema requires it
    pub change_action: Option<String>,
    pub last_modified_date: Option<i64>,
    pub last_modifying_user: Handle,
    pub last_modifying_application: Handle,
    /// Seconds since the Unix epoch
    pub creation_date: i64,
}

impl OwnerHistoryArgs {
    /// Owner history created now
    pub fn new(owning_user: Handle, owning_application: Handle) -> Self {
        Self {
            owning_user,
            owning_application,
            state: None,
            change_action: None,
            last_modified_date: None,
            last_modifying_user: Handle::NULL,
            last_modifying_application: Handle::NULL,
            creation_date: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_change_action(mut self, change_action: impl Into<String>) -> Self {
        self.change_action = Some(change_action.into());
        self
    }
}

/// `IfcPostalAddress` attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostalAddressArgs {
    pub purpose: Option<String>,
    pub description: Option<String>,
    pub user_defined_purpose: Option<String>,
    pub internal_location: Option<String>,
    pub address_lines: Vec<String>,
    pub postal_box: Option<String>,
    pub town: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// `IfcGeometricRepresentationContext` attributes
#[derive(Clone, Debug, PartialEq)]
pub struct GeometricContextArgs {
    pub identifier: Option<String>,
    pub context_type: Option<String>,
    pub dimension: i64,
    pub precision: Option<f64>,
    pub world_coordinate_system: Handle,
    pub true_north: Handle,
}

impl GeometricContextArgs {
    /// 3D `Model` context
    pub fn model(world_coordinate_system: Handle) -> Self {
        Self {
            identifier: None,
            context_type: Some("Model".to_string()),
            dimension: 3,
            precision: Some(1e-5),
            world_coordinate_system,
            true_north: Handle::NULL,
        }
    }
}

impl ExportSession {
    pub fn create_person(&mut self, args: &PersonArgs) -> Result<Handle> {
        self.build(
            "IfcPerson",
            &layer(
                |s| {
                    let named = args.family_name.is_some() || args.given_name.is_some();
                    let by_id = args.identification.is_some()
                        && s.registry()
                            .get("IfcPerson")
                            .and_then(|p| s.registry().attribute_slot(p, "Identification"))
                            .is_some();
                    if !(named || by_id) {
                        return Err(Error::invalid_argument(
                            "IfcPerson needs a family or given name",
                        ));
                    }
                    s.validate_all_arguments("Roles", Some(args.roles.as_slice()), true, &["IfcActorRole"])?;
                    s.validate_all_arguments(
                        "Addresses",
                        Some(args.addresses.as_slice()),
                        true,
                        &["IfcAddress"],
                    )
                },
                |b| {
                    let id = identification_attribute(b);
                    b.string(id, args.identification.as_deref())?;
                    b.string("FamilyName", args.family_name.as_deref())?;
                    b.string("GivenName", args.given_name.as_deref())?;
                    b.strings("MiddleNames", supplied(&args.middle_names))?;
                    b.strings("PrefixTitles", supplied(&args.prefix_titles))?;
                    b.strings("SuffixTitles", supplied(&args.suffix_titles))?;
                    b.instances("Roles", supplied(&args.roles))?;
                    b.instances("Addresses", supplied(&args.addresses))
                },
            ),
        )
    }

    pub fn create_organization(&mut self, args: &OrganizationArgs) -> Result<Handle> {
        self.build(
            "IfcOrganization",
            &layer(
                |s| {
                    non_empty("IfcOrganization", "Name", &args.name)?;
                    s.validate_all_arguments("Roles", Some(args.roles.as_slice()), true, &["IfcActorRole"])?;
                    s.validate_all_arguments(
                        "Addresses",
                        Some(args.addresses.as_slice()),
                        true,
                        &["IfcAddress"],
                    )
                },
                |b| {
                    let id = identification_attribute(b);
                    b.string(id, args.identification.as_deref())?;
                    b.string("Name", Some(args.name.as_str()))?;
                    b.string("Description", args.description.as_deref())?;
                    b.instances("Roles", supplied(&args.roles))?;
                    b.instances("Addresses", supplied(&args.addresses))
                },
            ),
        )
    }

    pub fn create_person_and_organization(
        &mut self,
        person: Handle,
        organization: Handle,
        roles: &[Handle],
    ) -> Result<Handle> {
        self.build(
            "IfcPersonAndOrganization",
            &layer(
                |s| {
                    s.validate_argument("ThePerson", person, false, &["IfcPerson"])?;
                    s.validate_argument("TheOrganization", organization, false, &["IfcOrganization"])?;
                    s.validate_all_arguments("Roles", Some(roles), true, &["IfcActorRole"])
                },
                |b| {
                    b.instance("ThePerson", person)?;
                    b.instance("TheOrganization", organization)?;
                    b.instances("Roles", supplied(roles))
                },
            ),
        )
    }

    pub fn create_application(
        &mut self,
        developer: Handle,
        version: &str,
        full_name: &str,
        identifier: &str,
    ) -> Result<Handle> {
        self.build(
            "IfcApplication",
            &layer(
                |s| {
                    s.validate_argument("ApplicationDeveloper", developer, false, &["IfcOrganization"])?;
                    non_empty("IfcApplication", "Version", version)?;
                    non_empty("IfcApplication", "ApplicationFullName", full_name)?;
                    non_empty("IfcApplication", "ApplicationIdentifier", identifier)
                },
                |b| {
                    b.instance("ApplicationDeveloper", developer)?;
                    b.string("Version", Some(version))?;
                    b.string("ApplicationFullName", Some(full_name))?;
                    b.string("ApplicationIdentifier", Some(identifier))
                },
            ),
        )
    }

    pub fn create_owner_history(&mut self, args: &OwnerHistoryArgs) -> Result<Handle> {
        self.build(
            "IfcOwnerHistory",
            &layer(
                |s| {
                    s.validate_argument(
                        "OwningUser",
                        args.owning_user,
                        false,
                        &["IfcPersonAndOrganization"],
                    )?;
                    s.validate_argument(
                        "OwningApplication",
                        args.owning_application,
                        false,
                        &["IfcApplication"],
                    )?;
                    s.validate_argument(
                        "LastModifyingUser",
                        args.last_modifying_user,
                        true,
                        &["IfcPersonAndOrganization"],
                    )?;
                    s.validate_argument(
                        "LastModifyingApplication",
                        args.last_modifying_application,
                        true,
                        &["IfcApplication"],
                    )?;
                    if args.creation_date < 0 {
                        return Err(Error::invalid_argument("CreationDate before the epoch"));
                    }
                    Ok(())
                },
                |b| {
                    let change_action = args
                        .change_action
                        .as_deref()
                        .or_else(|| b.requires("ChangeAction").then_some("NOTDEFINED"));
                    b.instance("OwningUser", args.owning_user)?;
                    b.instance("OwningApplication", args.owning_application)?;
                    b.enumeration("State", args.state.as_deref())?;
                    b.enumeration("ChangeAction", change_action)?;
                    b.integer("LastModifiedDate", args.last_modified_date)?;
                    b.instance("LastModifyingUser", args.last_modifying_user)?;
                    b.instance("LastModifyingApplication", args.last_modifying_application)?;
                    b.integer("CreationDate", Some(args.creation_date))
                },
            ),
        )
    }

    pub fn create_actor_role(
        &mut self,
        role: &str,
        user_defined_role: Option<&str>,
        description: Option<&str>,
    ) -> Result<Handle> {
        self.build(
            "IfcActorRole",
            &layer(
                |_| Ok(()),
                |b| {
                    b.enumeration("Role", Some(role))?;
                    b.string("UserDefinedRole", user_defined_role)?;
                    b.string("Description", description)
                },
            ),
        )
    }

    pub fn create_postal_address(&mut self, args: &PostalAddressArgs) -> Result<Handle> {
        self.build(
            "IfcPostalAddress",
            &layer(
                |_| Ok(()),
                |b| {
                    b.enumeration("Purpose", args.purpose.as_deref())?;
                    b.string("Description", args.description.as_deref())?;
                    b.string("UserDefinedPurpose", args.user_defined_purpose.as_deref())?;
                    b.string("InternalLocation", args.internal_location.as_deref())?;
                    b.strings("AddressLines", supplied(&args.address_lines))?;
                    b.string("PostalBox", args.postal_box.as_deref())?;
                    b.string("Town", args.town.as_deref())?;
                    b.string("Region", args.region.as_deref())?;
                    b.string("PostalCode", args.postal_code.as_deref())?;
                    b.string("Country", args.country.as_deref())
                },
            ),
        )
    }

    /// Point with one to three coordinates
    pub fn create_cartesian_point(&mut self, coordinates: &[f64]) -> Result<Handle> {
        self.build(
            "IfcCartesianPoint",
            &layer(
                |_| {
                    if !(1..=3).contains(&coordinates.len()) {
                        return Err(Error::invalid_argument(format!(
                            "IfcCartesianPoint needs 1 to 3 coordinates, got {}",
                            coordinates.len()
                        )));
                    }
                    Ok(())
                },
                |b| b.doubles("Coordinates", Some(coordinates)),
            ),
        )
    }

    /// Direction with two or three ratios, not all zero
    pub fn create_direction(&mut self, ratios: &[f64]) -> Result<Handle> {
        self.build(
            "IfcDirection",
            &layer(
                |_| {
                    if !(2..=3).contains(&ratios.len()) {
                        return Err(Error::invalid_argument(format!(
                            "IfcDirection needs 2 or 3 ratios, got {}",
                            ratios.len()
                        )));
                    }
                    if ratios.iter().all(|r| *r == 0.0) {
                        return Err(Error::invalid_argument("IfcDirection of zero length"));
                    }
                    Ok(())
                },
                |b| b.doubles("DirectionRatios", Some(ratios)),
            ),
        )
    }

    pub fn create_axis2_placement_3d(
        &mut self,
        location: Handle,
        axis: Handle,
        ref_direction: Handle,
    ) -> Result<Handle> {
        self.build(
            "IfcAxis2Placement3D",
            &layer(
                |s| {
                    s.validate_argument("Location", location, false, &["IfcCartesianPoint"])?;
                    s.validate_argument("Axis", axis, true, &["IfcDirection"])?;
                    s.validate_argument("RefDirection", ref_direction, true, &["IfcDirection"])?;
                    s.check_dimension("Location", location, "Coordinates", 3)?;
                    s.check_dimension("Axis", axis, "DirectionRatios", 3)?;
                    s.check_dimension("RefDirection", ref_direction, "DirectionRatios", 3)
                },
                |b| {
                    b.instance("Location", location)?;
                    b.instance("Axis", axis)?;
                    b.instance("RefDirection", ref_direction)
                },
            ),
        )
    }

    pub fn create_axis2_placement_2d(
        &mut self,
        location: Handle,
        ref_direction: Handle,
    ) -> Result<Handle> {
        self.build(
            "IfcAxis2Placement2D",
            &layer(
                |s| {
                    s.validate_argument("Location", location, false, &["IfcCartesianPoint"])?;
                    s.validate_argument("RefDirection", ref_direction, true, &["IfcDirection"])?;
                    s.check_dimension("Location", location, "Coordinates", 2)?;
                    s.check_dimension("RefDirection", ref_direction, "DirectionRatios", 2)
                },
                |b| {
                    b.instance("Location", location)?;
                    b.instance("RefDirection", ref_direction)
                },
            ),
        )
    }

    pub fn create_local_placement(
        &mut self,
        placement_rel_to: Handle,
        relative_placement: Handle,
    ) -> Result<Handle> {
        self.build(
            "IfcLocalPlacement",
            &layer(
                |s| {
                    s.validate_argument(
                        "PlacementRelTo",
                        placement_rel_to,
                        true,
                        &["IfcObjectPlacement"],
                    )?;
                    s.validate_argument(
                        "RelativePlacement",
                        relative_placement,
                        false,
                        &["IfcAxis2Placement2D", "IfcAxis2Placement3D"],
                    )
                },
                |b| {
                    b.instance("PlacementRelTo", placement_rel_to)?;
                    b.instance("RelativePlacement", relative_placement)
                },
            ),
        )
    }

    pub fn create_geometric_representation_context(
        &mut self,
        args: &GeometricContextArgs,
    ) -> Result<Handle> {
        self.build(
            "IfcGeometricRepresentationContext",
            &layer(
                |s| {
                    if !(1..=3).contains(&args.dimension) {
                        return Err(Error::invalid_argument(format!(
                            "CoordinateSpaceDimension must be 1 to 3, got {}",
                            args.dimension
                        )));
                    }
                    s.validate_argument(
                        "WorldCoordinateSystem",
                        args.world_coordinate_system,
                        false,
                        &["IfcAxis2Placement2D", "IfcAxis2Placement3D"],
                    )?;
                    s.validate_argument("TrueNorth", args.true_north, true, &["IfcDirection"])
                },
                |b| {
                    b.string("ContextIdentifier", args.identifier.as_deref())?;
                    b.string("ContextType", args.context_type.as_deref())?;
                    b.integer("CoordinateSpaceDimension", Some(args.dimension))?;
                    b.double("Precision", args.precision)?;
                    b.instance("WorldCoordinateSystem", args.world_coordinate_system)?;
                    b.instance("TrueNorth", args.true_north)
                },
            ),
        )
    }

    pub fn create_shape_representation(
        &mut self,
        context: Handle,
        identifier: Option<&str>,
        representation_type: Option<&str>,
        items: &[Handle],
    ) -> Result<Handle> {
        self.build(
            "IfcShapeRepresentation",
            &layer(
                |s| {
                    s.validate_argument(
                        "ContextOfItems",
                        context,
                        false,
                        &["IfcRepresentationContext"],
                    )?;
                    s.validate_members("Items", items, &["IfcRepresentationItem"])
                },
                |b| {
                    b.instance("ContextOfItems", context)?;
                    b.string("RepresentationIdentifier", identifier)?;
                    b.string("RepresentationType", representation_type)?;
                    b.instances("Items", Some(items))
                },
            ),
        )
    }

    pub fn create_product_definition_shape(
        &mut self,
        name: Option<&str>,
        description: Option<&str>,
        representations: &[Handle],
    ) -> Result<Handle> {
        self.build(
            "IfcProductDefinitionShape",
            &layer(
                |s| {
                    s.validate_members("Representations", representations, &["IfcRepresentation"])
                },
                |b| {
                    b.string("Name", name)?;
                    b.string("Description", description)?;
                    b.instances("Representations", Some(representations))
                },
            ),
        )
    }

    pub fn create_representation_map(
        &mut self,
        mapping_origin: Handle,
        mapped_representation: Handle,
    ) -> Result<Handle> {
        self.build(
            "IfcRepresentationMap",
            &layer(
                |s| {
                    s.validate_argument(
                        "MappingOrigin",
                        mapping_origin,
                        false,
                        &["IfcAxis2Placement2D", "IfcAxis2Placement3D"],
                    )?;
                    s.validate_argument(
                        "MappedRepresentation",
                        mapped_representation,
                        false,
                        &["IfcRepresentation"],
                    )
                },
                |b| {
                    b.instance("MappingOrigin", mapping_origin)?;
                    b.instance("MappedRepresentation", mapped_representation)
                },
            ),
        )
    }

    /// Exponents in the order length, mass, time, electric current,
    /// temperature, amount of substance, luminous intensity
    pub fn create_dimensional_exponents(&mut self, exponents: [i64; 7]) -> Result<Handle> {
        const NAMES: [&str; 7] = [
            "LengthExponent",
            "MassExponent",
            "TimeExponent",
            "ElectricCurrentExponent",
            "ThermodynamicTemperatureExponent",
            "AmountOfSubstanceExponent",
            "LuminousIntensityExponent",
        ];
        self.build(
            "IfcDimensionalExponents",
            &layer(
                |_| Ok(()),
                |b| {
                    for (name, exponent) in NAMES.iter().zip(exponents) {
                        b.integer(name, Some(exponent))?;
                    }
                    Ok(())
                },
            ),
        )
    }

    /// SI unit; `Dimensions` is derived from the unit name
    pub fn create_si_unit(
        &mut self,
        unit_type: &str,
        prefix: Option<&str>,
        name: &str,
    ) -> Result<Handle> {
        self.build(
            "IfcSIUnit",
            &layer(
                |_| Ok(()),
                |b| {
                    b.enumeration("UnitType", Some(unit_type))?;
                    b.enumeration("Prefix", prefix)?;
                    b.enumeration("Name", Some(name))
                },
            ),
        )
    }

    pub fn create_monetary_unit(&mut self, currency: &str) -> Result<Handle> {
        self.build(
            "IfcMonetaryUnit",
            &layer(
                |_| non_empty("IfcMonetaryUnit", "Currency", currency),
                |b| b.string("Currency", Some(currency)),
            ),
        )
    }

    pub fn create_unit_assignment(&mut self, units: &[Handle]) -> Result<Handle> {
        self.build(
            "IfcUnitAssignment",
            &layer(
                |s| {
                    s.validate_members("Units", units, &["IfcNamedUnit", "IfcMonetaryUnit"])
                },
                |b| b.instances("Units", Some(units)),
            ),
        )
    }

    /// Material; description and category are IFC4 only
    pub fn create_material(
        &mut self,
        name: &str,
        description: Option<&str>,
        category: Option<&str>,
    ) -> Result<Handle> {
        self.build(
            "IfcMaterial",
            &layer(
                |_| non_empty("IfcMaterial", "Name", name),
                |b| {
                    b.string("Name", Some(name))?;
                    b.set_if_declared("Description", description.map(AttributeValue::from))?;
                    b.set_if_declared("Category", category.map(AttributeValue::from))
                },
            ),
        )
    }

    /// Fail if a point or direction does not have `dim` components
    fn check_dimension(&self, argument: &str, handle: Handle, attribute: &str, dim: usize) -> Result<()> {
        if handle.is_null() {
            return Ok(());
        }
        let actual = self.get_aggregate(handle, attribute).map_or(0, |v| v.len());
        if actual == dim {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "{} must be {}D, got {}D",
                argument, dim, actual
            )))
        }
    }
}
