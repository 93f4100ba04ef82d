// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A small IFC4 building, end to end

mod common;

use ifc_lite_export::{
    to_json_value, to_step_string, BuildingArgs, DoorArgs, ElementArgs, ElementTypeArgs,
    ExportSession, Handle, NominalValue, SiteArgs, SpatialArgs, StepHeader,
};
use ifc_lite_schema::SchemaVersion;

struct Model {
    session: ExportSession,
    project: Handle,
    storey: Handle,
    wall: Handle,
    door: Handle,
}

fn build_model() -> Model {
    let mut s = ExportSession::for_version(SchemaVersion::Ifc4).unwrap();
    let setup = common::setup(&mut s);

    let project = s.create_project(&setup.project("Demo")).unwrap();
    let site_placement = s.create_local_placement(Handle::NULL, setup.world).unwrap();
    let site = s
        .create_site(
            &SpatialArgs::new(setup.root("Site")).with_placement(site_placement),
            &SiteArgs {
                ref_latitude: Some(vec![52, 31, 12]),
                ref_longitude: Some(vec![13, 24, 36]),
                ..SiteArgs::default()
            },
        )
        .unwrap();
    let building = s
        .create_building(&SpatialArgs::new(setup.root("Building")), &BuildingArgs::default())
        .unwrap();
    let storey = s
        .create_building_storey(&SpatialArgs::new(setup.root("Level 0")), Some(0.0))
        .unwrap();

    s.create_rel_aggregates(&setup.root("Project"), project, &[site])
        .unwrap();
    s.create_rel_aggregates(&setup.root("Site"), site, &[building])
        .unwrap();
    s.create_rel_aggregates(&setup.root("Building"), building, &[storey])
        .unwrap();

    let corner = s.create_cartesian_point(&[1.0, 2.0, 0.0]).unwrap();
    let axis = s.create_axis2_placement_3d(corner, Handle::NULL, Handle::NULL).unwrap();
    let wall_placement = s.create_local_placement(site_placement, axis).unwrap();
    let body = s
        .create_shape_representation(setup.context, Some("Body"), Some("SweptSolid"), &[axis])
        .unwrap();
    let shape = s.create_product_definition_shape(None, None, &[body]).unwrap();

    let wall = s
        .create_wall(
            &ElementArgs::new(setup.root("Wall 1"))
                .with_placement(wall_placement)
                .with_representation(shape)
                .with_tag("W-001"),
            Some("SOLIDWALL"),
        )
        .unwrap();
    let opening = s
        .create_opening_element(&ElementArgs::new(setup.root("Opening")), Some("OPENING"))
        .unwrap();
    let door = s
        .create_door(
            &ElementArgs::new(setup.root("Door 1")),
            &DoorArgs {
                overall_height: Some(2.1),
                overall_width: Some(0.9),
                predefined_type: Some("DOOR".into()),
                operation_type: Some("single_swing_left".into()),
                ..DoorArgs::default()
            },
        )
        .unwrap();

    s.create_rel_voids_element(&setup.root("Voids"), wall, opening)
        .unwrap();
    s.create_rel_fills_element(&setup.root("Fills"), opening, door)
        .unwrap();
    s.create_rel_contained_in_spatial_structure(&setup.root("Contains"), &[wall, door], storey)
        .unwrap();

    let wall_type = s
        .create_wall_type(&ElementTypeArgs::new(setup.root("Basic Wall")), "STANDARD")
        .unwrap();
    s.create_rel_defines_by_type(&setup.root("Typed"), &[wall], wall_type)
        .unwrap();

    let external = s
        .create_property_single_value("IsExternal", None, Some(&NominalValue::boolean(true)), Handle::NULL)
        .unwrap();
    let reference = s
        .create_property_single_value("Reference", None, Some(&NominalValue::identifier("it's W-001")), Handle::NULL)
        .unwrap();
    let pset = s
        .create_property_set(&setup.root("Pset_WallCommon"), &[external, reference])
        .unwrap();
    s.create_rel_defines_by_properties(&setup.root("Props"), &[wall], pset)
        .unwrap();

    let concrete = s
        .create_material("Concrete", Some("C30/37"), Some("Structural"))
        .unwrap();
    s.create_rel_associates_material(&setup.root("Material"), &[wall], concrete)
        .unwrap();

    Model {
        session: s,
        project,
        storey,
        wall,
        door,
    }
}

#[test]
fn test_model_builds_without_skips() {
    let model = build_model();
    let s = &model.session;

    assert_eq!(s.stats().skipped, 0);
    assert!(s.is_instance_of(model.project, "IfcContext"));
    assert!(s.is_instance_of(model.storey, "IfcSpatialElement"));
    assert!(s.is_instance_of(model.wall, "IfcProduct"));
    assert_eq!(s.get_enum(model.door, "OperationType"), Some("SINGLE_SWING_LEFT"));
    assert_eq!(s.get_string(model.wall, "Tag"), Some("W-001"));
    assert!(s.cache_stats().entries > 0);
}

#[test]
fn test_step_output() {
    let model = build_model();
    let s = &model.session;
    let header = StepHeader::new("demo.ifc").with_author("Jane Doe");
    let step = to_step_string(s, &header).unwrap();

    assert!(step.contains("FILE_NAME('demo.ifc',"));
    assert!(step.contains("('Jane Doe')"));
    assert!(step.contains("FILE_SCHEMA(('IFC4'));"));

    let lines = common::data_lines(&step);
    assert_eq!(lines.len(), s.len());
    for (i, line) in lines.iter().enumerate() {
        assert!(line.starts_with(&format!("#{}=IFC", i + 1)), "{}", line);
        assert!(line.ends_with(");"), "{}", line);
    }

    let wall_line = lines[model.wall.id().unwrap().0 as usize - 1];
    assert!(wall_line.starts_with(&format!("#{}=IFCWALL('", model.wall.id().unwrap().0)));
    assert!(wall_line.ends_with(",'W-001',.SOLIDWALL.);"));

    let door_line = lines[model.door.id().unwrap().0 as usize - 1];
    assert!(door_line.contains(",2.1,0.9,.DOOR.,.SINGLE_SWING_LEFT.,$);"));

    assert!(step.contains("IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.)"));
    assert!(step.contains("IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$)"));
    assert!(step.contains("IFCIDENTIFIER('it''s W-001')"));
    assert!(step.contains("IFCCARTESIANPOINT((1.0,2.0,0.0))"));
}

#[test]
fn test_json_output() {
    let model = build_model();
    let json = to_json_value(&model.session).unwrap();
    let instances = json.as_array().unwrap();

    assert_eq!(instances.len(), model.session.len());
    let wall = &instances[model.wall.id().unwrap().0 as usize - 1];
    assert_eq!(wall["type"], "IfcWall");
    assert_eq!(wall["attributes"][0]["name"], "GlobalId");
    assert_eq!(wall["attributes"][8]["name"], "PredefinedType");
    assert_eq!(wall["attributes"][8]["value"]["value"], "SOLIDWALL");
}
