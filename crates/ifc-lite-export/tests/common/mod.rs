// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![allow(dead_code)]

use ifc_lite_export::{
    ExportSession, GeometricContextArgs, Handle, OrganizationArgs, OwnerHistoryArgs, PersonArgs,
    ProjectArgs, RootArgs,
};

/// Instances every model needs before its first rooted entity
pub struct Setup {
    pub owner_history: Handle,
    pub units: Handle,
    pub context: Handle,
    pub world: Handle,
}

impl Setup {
    pub fn root(&self, name: &str) -> RootArgs {
        RootArgs::generated()
            .with_owner_history(self.owner_history)
            .with_name(name)
    }

    pub fn project(&self, name: &str) -> ProjectArgs {
        ProjectArgs::new(self.root(name))
            .with_contexts(vec![self.context])
            .with_units(self.units)
    }
}

pub fn setup(s: &mut ExportSession) -> Setup {
    let person = s
        .create_person(&PersonArgs {
            family_name: Some("Doe".into()),
            given_name: Some("Jane".into()),
            ..PersonArgs::default()
        })
        .unwrap();
    let organization = s
        .create_organization(&OrganizationArgs {
            name: "ACME Engineering".into(),
            ..OrganizationArgs::default()
        })
        .unwrap();
    let user = s
        .create_person_and_organization(person, organization, &[])
        .unwrap();
    let application = s
        .create_application(organization, "0.1", "IFC-Lite Export", "ifc-lite-export")
        .unwrap();
    let owner_history = s
        .create_owner_history(&OwnerHistoryArgs::new(user, application))
        .unwrap();

    let metre = s.create_si_unit("LENGTHUNIT", None, "METRE").unwrap();
    let square_metre = s.create_si_unit("AREAUNIT", None, "SQUARE_METRE").unwrap();
    let cubic_metre = s.create_si_unit("VOLUMEUNIT", None, "CUBIC_METRE").unwrap();
    let units = s
        .create_unit_assignment(&[metre, square_metre, cubic_metre])
        .unwrap();

    let origin = s.create_cartesian_point(&[0.0, 0.0, 0.0]).unwrap();
    let world = s
        .create_axis2_placement_3d(origin, Handle::NULL, Handle::NULL)
        .unwrap();
    let context = s
        .create_geometric_representation_context(&GeometricContextArgs::model(world))
        .unwrap();

    Setup {
        owner_history,
        units,
        context,
        world,
    }
}

/// Lines of the DATA section
pub fn data_lines(step: &str) -> Vec<&str> {
    step.lines()
        .skip_while(|line| *line != "DATA;")
        .skip(1)
        .take_while(|line| *line != "ENDSEC;")
        .collect()
}
