// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Export - schema-driven entity construction
//!
//! Builds IFC instances against an entity type registry, checking every
//! argument and attribute against the schema before anything is stored.
//!
//! # Architecture
//!
//! - [`ExportSession`] - owns the instance store and subtype cache of one run
//! - [`Handle`] - typed, nullable reference to a stored instance
//! - Attribute accessors - typed `set_*` / `get_*` by attribute name
//! - Validation - subtype and required-attribute checks for factories
//! - [`factory`] - one constructor per entity type, composed from [`Layer`]s
//! - Writers - [`write_step`] and [`to_json`]
//!
//! # Example
//!
//! ```
//! use ifc_lite_export::{ElementArgs, ExportSession, RootArgs, SpatialArgs};
//! use ifc_lite_schema::SchemaVersion;
//!
//! let mut session = ExportSession::for_version(SchemaVersion::Ifc4).unwrap();
//! let storey = session
//!     .create_building_storey(&SpatialArgs::new(RootArgs::generated().with_name("L1")), Some(0.0))
//!     .unwrap();
//! let wall = session
//!     .create_wall(&ElementArgs::new(RootArgs::generated()), Some("SOLIDWALL"))
//!     .unwrap();
//! session
//!     .create_rel_contained_in_spatial_structure(&RootArgs::generated(), &[wall], storey)
//!     .unwrap();
//!
//! assert_eq!(session.len(), 3);
//! assert!(session.is_instance_of(wall, "IfcBuildingElement"));
//! ```

mod attributes;
pub mod cache;
pub mod config;
pub mod factory;
pub mod guid;
pub mod handle;
pub mod json;
pub mod session;
pub mod step;
pub mod store;
mod validation;

pub use cache::{CacheStats, TypeCache};
pub use config::SessionConfig;
pub use factory::*;
pub use handle::Handle;
pub use json::{to_json, to_json_value};
pub use session::{ExportSession, SessionStats};
pub use step::{to_step_string, write_step, StepHeader};
pub use store::{Instance, InstanceStore};
