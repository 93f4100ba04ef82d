// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session settings

use ifc_lite_schema::SchemaVersion;

/// Settings for an export session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bundled schema used by [`crate::ExportSession::from_config`]
    pub schema: SchemaVersion,
    /// Check referenced instances against the attribute's declared types
    pub reference_checks: bool,
    /// Check enumeration literals against the declared literal set
    pub enum_checks: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            schema: SchemaVersion::Ifc4,
            reference_checks: true,
            enum_checks: true,
        }
    }
}

impl SessionConfig {
    /// Create a config with every check enabled, targeting IFC4
    pub fn new() -> Self {
        Self::default()
    }

    /// Config with declared-type checks disabled
    ///
    /// Explicit factory validation and kind checks still run.
    pub fn permissive() -> Self {
        Self {
            reference_checks: false,
            enum_checks: false,
            ..Self::default()
        }
    }

    /// Set the bundled schema version
    pub fn with_schema(mut self, schema: SchemaVersion) -> Self {
        self.schema = schema;
        self
    }

    /// Set whether referenced instances are checked against declared types
    pub fn with_reference_checks(mut self, enabled: bool) -> Self {
        self.reference_checks = enabled;
        self
    }

    /// Set whether enumeration literals are checked
    pub fn with_enum_checks(mut self, enabled: bool) -> Self {
        self.enum_checks = enabled;
        self
    }
}
