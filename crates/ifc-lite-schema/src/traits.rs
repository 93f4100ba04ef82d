// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for schema loading

use crate::{Result, SchemaDescription, SchemaRegistry};

/// Source of a schema description
///
/// Implementations turn some schema definition (EXPRESS text, a bundled
/// table, a hand-built description) into a [`SchemaDescription`]. The
/// registry is built from it once per process or session.
///
/// # Example
///
/// ```ignore
/// use ifc_lite_schema::{SchemaRegistry, SchemaSource};
///
/// let source: Box<dyn SchemaSource> = get_source();
/// let registry = SchemaRegistry::from_source(source.as_ref())?;
/// println!("{} entity types", registry.len());
/// ```
pub trait SchemaSource {
    /// Produce the schema description
    ///
    /// # Returns
    /// The description on success, or a configuration error
    fn describe(&self) -> Result<SchemaDescription>;
}

impl SchemaSource for SchemaDescription {
    fn describe(&self) -> Result<SchemaDescription> {
        Ok(self.clone())
    }
}

impl SchemaRegistry {
    /// Build a registry from any schema source
    pub fn from_source(source: &dyn SchemaSource) -> Result<Self> {
        Self::from_description(&source.describe()?)
    }
}
