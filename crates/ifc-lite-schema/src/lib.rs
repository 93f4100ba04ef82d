// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Schema - Entity type registry and shared types
//!
//! This crate holds the static side of IFC entity construction: what entity
//! types exist, how they inherit from each other, and which attributes each
//! type carries in which positional order.
//!
//! # Architecture
//!
//! - [`SchemaDescription`] - raw entity/attribute declarations
//! - [`SchemaSource`] - anything that can produce a description
//! - [`SchemaRegistry`] - the immutable, validated registry built from it
//! - [`AttributeValue`] / [`AttributeKind`] - the value model shared with the
//!   export session
//! - [`Error`] / [`Severity`] - the error taxonomy
//!
//! # Example
//!
//! ```
//! use ifc_lite_schema::{
//!     AttributeDef, AttributeKind, EntityDescription, SchemaDescription, SchemaRegistry,
//! };
//!
//! let desc = SchemaDescription::new("DEMO")
//!     .entity(
//!         EntityDescription::new("Root")
//!             .attribute(AttributeDef::new("GlobalId", AttributeKind::String)),
//!     )
//!     .entity(
//!         EntityDescription::new("Wall")
//!             .subtype_of("Root")
//!             .attribute(AttributeDef::new("Height", AttributeKind::Double)),
//!     );
//!
//! let registry = SchemaRegistry::from_description(&desc).unwrap();
//! let wall = registry.lookup("Wall").unwrap();
//! let root = registry.lookup("Root").unwrap();
//! assert!(registry.is_subtype_of(wall, root));
//! assert_eq!(registry.attributes_of(wall).len(), 2);
//! ```

pub mod description;
pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

pub use description::*;
pub use error::*;
pub use registry::*;
pub use traits::*;
pub use types::*;
