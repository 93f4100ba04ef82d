// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction laws checked against a small hand-written schema

use ifc_lite_export::{
    to_step_string, EntityBuilder, ExportSession, Handle, Layer, SessionConfig, StepHeader,
};
use ifc_lite_schema::{
    AttributeDef, AttributeKind, AttributeValue, EntityDescription, Error, Logical, PrimitiveKind,
    Result, SchemaDescription, SchemaRegistry, Severity,
};
use std::sync::Arc;

fn registry() -> Arc<SchemaRegistry> {
    let desc = SchemaDescription::new("SCENARIO")
        .defined_type("Label", PrimitiveKind::String)
        .entity(
            EntityDescription::new("Root")
                .attribute(AttributeDef::new("GUID", AttributeKind::String))
                .attribute(AttributeDef::new("Name", AttributeKind::String).optional()),
        )
        .entity(
            EntityDescription::new("Wall")
                .subtype_of("Root")
                .attribute(AttributeDef::new("Height", AttributeKind::Double))
                .attribute(
                    AttributeDef::new(
                        "Layers",
                        AttributeKind::AggregateOfPrimitive(PrimitiveKind::Double),
                    )
                    .optional(),
                )
                .attribute(AttributeDef::new("Openings", AttributeKind::AggregateOfInstanceRef).optional())
                .attribute(AttributeDef::new("Storeys", AttributeKind::Int).optional())
                .attribute(AttributeDef::new("Loadbearing", AttributeKind::Bool).optional())
                .attribute(AttributeDef::new("IsExternal", AttributeKind::Logical).optional())
                .attribute(
                    AttributeDef::new("Usage", AttributeKind::Enum)
                        .optional()
                        .allowing(["SHEAR", "PARTITIONING"]),
                )
                .attribute(
                    AttributeDef::new("Host", AttributeKind::InstanceRef)
                        .optional()
                        .allowing(["Door"]),
                )
                .attribute(
                    AttributeDef::new("Reference", AttributeKind::Select)
                        .optional()
                        .allowing(["Label"]),
                ),
        )
        .entity(EntityDescription::new("Door").subtype_of("Root"))
        .entity(EntityDescription::new("CurtainWall").subtype_of("Wall"));
    Arc::new(SchemaRegistry::from_description(&desc).unwrap())
}

fn session() -> ExportSession {
    ExportSession::new(registry(), SessionConfig::default())
}

/// `Root` level of the scenario schema
struct RootLayer<'a> {
    guid: &'a str,
    name: Option<&'a str>,
}

impl Layer for RootLayer<'_> {
    fn validate(&self, _: &ExportSession) -> Result<()> {
        if self.guid.is_empty() {
            return Err(Error::invalid_argument("GUID must not be empty"));
        }
        Ok(())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.string("GUID", Some(self.guid))?;
        builder.string("Name", self.name)
    }
}

struct WallLayer(f64);

impl Layer for WallLayer {
    fn validate(&self, _: &ExportSession) -> Result<()> {
        if self.0 <= 0.0 {
            return Err(Error::invalid_argument("Height must be positive"));
        }
        Ok(())
    }

    fn write(&self, builder: &mut EntityBuilder<'_>) -> Result<()> {
        builder.double("Height", Some(self.0))
    }
}

fn create_wall(s: &mut ExportSession, guid: &str, name: Option<&str>, height: f64) -> Result<Handle> {
    s.build("Wall", &(RootLayer { guid, name }, WallLayer(height)))
}

#[test]
fn test_subtype_reflexive_and_transitive() {
    let registry = registry();
    let ids: Vec<_> = registry.iter().map(|e| e.id).collect();

    for &t in &ids {
        assert!(registry.is_subtype_of(t, t));
    }
    for &a in &ids {
        for &b in &ids {
            for &c in &ids {
                if registry.is_subtype_of(a, b) && registry.is_subtype_of(b, c) {
                    assert!(registry.is_subtype_of(a, c));
                }
            }
        }
    }
}

#[test]
fn test_attribute_order_and_wall_scenario() {
    let mut s = session();
    let wall = create_wall(&mut s, "g1", None, 3.0).unwrap();

    let wall_type = s.get_entity_type(wall).unwrap();
    let names: Vec<_> = s
        .registry()
        .attributes_of(wall_type)
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names[..3], ["GUID", "Name", "Height"]);

    assert_eq!(s.get_string(wall, "GUID"), Some("g1"));
    assert_eq!(s.get_string(wall, "Name"), None);
    assert_eq!(s.get_double(wall, "Height"), Some(3.0));
}

#[test]
fn test_wall_validates_as_root_not_door() {
    let mut s = session();
    let wall = create_wall(&mut s, "g1", Some("W"), 3.0).unwrap();

    assert!(s.validate_subtype_of(wall, false, &["Root"]).is_ok());
    let err = s.validate_subtype_of(wall, false, &["Door"]).unwrap_err();
    assert_eq!(err.severity(), Severity::SkipEntity);
    assert!(err.is_schema_violation());
}

#[test]
fn test_null_validation() {
    let s = session();
    assert!(s.validate_subtype_of(Handle::NULL, true, &["Door"]).is_ok());
    let err = s.validate_subtype_of(Handle::NULL, false, &["Door"]).unwrap_err();
    assert!(err.is_schema_violation());
}

#[test]
fn test_round_trip_every_kind() {
    let mut s = session();
    let wall = create_wall(&mut s, "g1", None, 3.0).unwrap();
    let door = s.build("Door", &RootLayer { guid: "g2", name: None }).unwrap();

    s.set_string(wall, "Name", Some("North")).unwrap();
    assert_eq!(s.get_string(wall, "Name"), Some("North"));
    s.set_string(wall, "Name", None).unwrap();
    assert_eq!(s.get_string(wall, "Name"), None);

    s.set_double(wall, "Height", Some(2.75)).unwrap();
    assert_eq!(s.get_double(wall, "Height"), Some(2.75));

    let layers = [AttributeValue::Float(0.1), AttributeValue::Float(0.2)];
    s.set_aggregate(wall, "Layers", Some(&layers[..])).unwrap();
    assert_eq!(s.get_aggregate(wall, "Layers"), Some(&layers[..]));

    s.set_instances(wall, "Openings", Some(&[door][..])).unwrap();
    assert_eq!(s.get_instances(wall, "Openings"), Some(vec![door]));
    s.set_instances(wall, "Openings", None).unwrap();
    assert_eq!(s.get_instances(wall, "Openings"), None);

    s.set_integer(wall, "Storeys", Some(2)).unwrap();
    assert_eq!(s.get_integer(wall, "Storeys"), Some(2));

    s.set_bool(wall, "Loadbearing", Some(false)).unwrap();
    assert_eq!(s.get_bool(wall, "Loadbearing"), Some(false));

    s.set_logical(wall, "IsExternal", Some(Logical::Unknown)).unwrap();
    assert_eq!(s.get_logical(wall, "IsExternal"), Some(Logical::Unknown));

    s.set_enum(wall, "Usage", Some("shear")).unwrap();
    assert_eq!(s.get_enum(wall, "Usage"), Some("SHEAR"));

    s.set_instance(wall, "Host", door).unwrap();
    assert_eq!(s.get_instance(wall, "Host"), door);
    s.set_instance(wall, "Host", Handle::NULL).unwrap();
    assert!(s.get_instance(wall, "Host").is_null());

    s.set_typed_value(wall, "Reference", Some(("Label", AttributeValue::from("W-01"))))
        .unwrap();
    assert_eq!(
        s.get_typed_value(wall, "Reference"),
        Some(("Label", &AttributeValue::from("W-01")))
    );

    // Mismatched getters see nothing
    assert_eq!(s.get_double(wall, "Storeys"), None);
    assert_eq!(s.get_string(wall, "Usage"), None);
}

#[test]
fn test_empty_aggregates_round_trip() {
    let mut s = session();
    let wall = create_wall(&mut s, "g1", None, 3.0).unwrap();

    s.set_aggregate(wall, "Layers", Some(&[][..])).unwrap();
    s.set_instances(wall, "Openings", Some(&[][..])).unwrap();
    assert_eq!(s.get_aggregate(wall, "Layers"), Some(&[][..]));
    assert_eq!(s.get_instances(wall, "Openings"), Some(vec![]));

    let step = to_step_string(&s, &StepHeader::new("empty.ifc")).unwrap();
    assert!(step.contains("('g1',$,3.0,(),(),$,$,$,$,$,$);"), "{}", step);

    s.set_instances(wall, "Openings", None).unwrap();
    assert_eq!(s.get_instances(wall, "Openings"), None);
}

#[test]
fn test_empty_collection_passes_validation() {
    let mut s = session();
    let wall = create_wall(&mut s, "g1", None, 3.0).unwrap();

    assert!(s.validate_all_subtype_of(Some(&[][..]), false, &["Root"]).is_ok());
    assert!(s.validate_all_subtype_of(None, false, &["Root"]).is_err());
    assert!(s
        .validate_members("Openings", &[], &["Root"])
        .unwrap_err()
        .is_invalid_argument());
    assert!(s.validate_members("Openings", &[wall], &["Root"]).is_ok());
}

#[test]
fn test_aggregate_with_null_member_is_atomic() {
    let mut s = session();
    let wall = create_wall(&mut s, "g1", None, 3.0).unwrap();
    let door = s.build("Door", &RootLayer { guid: "g2", name: None }).unwrap();

    let err = s
        .set_instances(wall, "Openings", Some(&[door, Handle::NULL][..]))
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(s.get_instances(wall, "Openings"), None);
    assert_eq!(s.get_attribute(wall, "Openings"), None);
}

#[test]
fn test_no_deduplication() {
    let mut s = session();
    let a = create_wall(&mut s, "g1", Some("W"), 3.0).unwrap();
    let b = create_wall(&mut s, "g1", Some("W"), 3.0).unwrap();

    assert_ne!(a, b);
    assert_eq!(s.len(), 2);
    assert_eq!(
        s.instance(a).unwrap().values(),
        s.instance(b).unwrap().values()
    );
}

#[test]
fn test_failed_builds_allocate_nothing() {
    let mut s = session();
    assert!(create_wall(&mut s, "", None, 3.0).is_err());
    assert!(create_wall(&mut s, "g1", None, -1.0).is_err());
    assert!(s.build("Wall", &RootLayer { guid: "g1", name: None }).is_err());
    assert!(s.is_empty());
    assert_eq!(s.stats().created, 0);
}

#[test]
fn test_empty_registry_is_configuration_error() {
    let mut s = ExportSession::new(Arc::new(SchemaRegistry::empty()), SessionConfig::default());
    let err = s.create_instance("Wall").unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(err.severity(), Severity::AbortRun);
    assert!(s.is_empty());
}

#[test]
fn test_export_element_skips_and_aborts() {
    let mut s = session();
    let skipped = s
        .export_element("wall without guid", |s| create_wall(s, "", None, 3.0))
        .unwrap();
    assert!(skipped.is_none());

    let built = s
        .export_element("wall", |s| create_wall(s, "g1", None, 3.0))
        .unwrap();
    assert!(built.is_some());

    let aborted = s.export_element("window", |s| s.create_instance("Window"));
    assert!(aborted.is_err());

    let stats = s.stats();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.skipped, 1);
}

#[test]
fn test_handles_do_not_cross_sessions() {
    let mut first = session();
    let mut second = session();
    let wall = create_wall(&mut first, "g1", None, 3.0).unwrap();
    create_wall(&mut second, "g2", None, 3.0).unwrap();

    assert!(matches!(
        second.set_string(wall, "Name", Some("x")),
        Err(Error::ForeignInstance(_))
    ));
    assert_eq!(second.get_string(wall, "GUID"), None);
    assert_eq!(second.get_string(second.instances().next().unwrap().handle(), "GUID"), Some("g2"));
}
