// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON encoding of a session's instances

use crate::ExportSession;
use ifc_lite_schema::{AttributeValue, Error, Result};
use serde::Serialize;

#[derive(Serialize)]
struct JsonInstance<'a> {
    id: u32,
    #[serde(rename = "type")]
    entity_type: &'a str,
    attributes: Vec<JsonAttribute<'a>>,
}

#[derive(Serialize)]
struct JsonAttribute<'a> {
    name: &'a str,
    value: Option<&'a AttributeValue>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    derived: bool,
}

fn encode(session: &ExportSession) -> Vec<JsonInstance<'_>> {
    let registry = session.registry();
    session
        .instances()
        .map(|instance| {
            let attributes = registry
                .attributes_of(instance.entity_type())
                .iter()
                .zip(instance.values())
                .map(|(def, value)| JsonAttribute {
                    name: def.name.as_str(),
                    value: value.as_ref(),
                    derived: def.derived,
                })
                .collect();
            JsonInstance {
                id: instance.id().0,
                entity_type: registry.type_name(instance.entity_type()),
                attributes,
            }
        })
        .collect()
}

/// Instances in creation order, attributes in declaration order
pub fn to_json(session: &ExportSession) -> Result<String> {
    serde_json::to_string(&encode(session)).map_err(|e| Error::Json(e.to_string()))
}

/// [`to_json`] as a [`serde_json::Value`]
pub fn to_json_value(session: &ExportSession) -> Result<serde_json::Value> {
    serde_json::to_value(encode(session)).map_err(|e| Error::Json(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_lite_schema::SchemaVersion;

    #[test]
    fn test_instances_in_order() {
        let mut s = ExportSession::for_version(SchemaVersion::Ifc4).unwrap();
        let point = s.create_cartesian_point(&[1.0, 2.0]).unwrap();
        let unit = s.create_si_unit("LENGTHUNIT", None, "METRE").unwrap();

        let json = to_json_value(&s).unwrap();
        let instances = json.as_array().unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0]["id"], point.id().unwrap().0);
        assert_eq!(instances[0]["type"], "IfcCartesianPoint");
        assert_eq!(instances[0]["attributes"][0]["name"], "Coordinates");
        assert_eq!(instances[0]["attributes"][0]["value"]["kind"], "List");

        let unit_attributes = &instances[1]["attributes"];
        assert_eq!(instances[1]["id"], unit.id().unwrap().0);
        assert_eq!(unit_attributes[0]["name"], "Dimensions");
        assert_eq!(unit_attributes[0]["derived"], true);
        assert!(unit_attributes[2]["value"].is_null());
        assert!(unit_attributes[2].get("derived").is_none());
    }

    #[test]
    fn test_empty_session() {
        let s = ExportSession::for_version(SchemaVersion::Ifc2x3).unwrap();
        assert_eq!(to_json(&s).unwrap(), "[]");
    }
}
