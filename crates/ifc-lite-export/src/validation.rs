// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Argument validation for factories
//!
//! Subtype checks run through the session's [`TypeCache`](crate::TypeCache).
//! Allowed type names that the registry does not know are configuration
//! errors: they mean the factory and the loaded schema disagree.

use crate::{guid, ExportSession, Handle};
use ifc_lite_schema::{EntityTypeId, Error, Result};

impl ExportSession {
    /// Check that a handle is an instance of one of `allowed`
    ///
    /// A null handle passes iff `null_allowed`. An empty `allowed` list
    /// accepts any instance of this session.
    pub fn validate_subtype_of(
        &self,
        handle: Handle,
        null_allowed: bool,
        allowed: &[&str],
    ) -> Result<()> {
        self.validate_argument("argument", handle, null_allowed, allowed)
    }

    /// [`validate_subtype_of`](Self::validate_subtype_of) naming the
    /// argument in error messages
    pub fn validate_argument(
        &self,
        argument: &str,
        handle: Handle,
        null_allowed: bool,
        allowed: &[&str],
    ) -> Result<()> {
        let candidates = self.candidate_types(allowed)?;
        if handle.is_null() {
            return if null_allowed {
                Ok(())
            } else {
                Err(Error::invalid_argument(format!("{} must not be null", argument)))
            };
        }
        self.check_conforms(argument, handle, &candidates, allowed)
    }

    /// Check every member of a collection
    ///
    /// `null_allowed` governs the collection itself, so an empty slice
    /// always passes. Members may never be null and the first nonconforming
    /// member fails the whole call.
    pub fn validate_all_subtype_of(
        &self,
        handles: Option<&[Handle]>,
        null_allowed: bool,
        allowed: &[&str],
    ) -> Result<()> {
        self.validate_all_arguments("argument", handles, null_allowed, allowed)
    }

    pub fn validate_all_arguments(
        &self,
        argument: &str,
        handles: Option<&[Handle]>,
        null_allowed: bool,
        allowed: &[&str],
    ) -> Result<()> {
        let candidates = self.candidate_types(allowed)?;
        let members = match handles {
            Some(members) => members,
            None if null_allowed => return Ok(()),
            None => {
                return Err(Error::invalid_argument(format!(
                    "{} must not be null",
                    argument
                )))
            }
        };
        for &member in members {
            if member.is_null() {
                return Err(Error::invalid_argument(format!(
                    "{} contains a null element",
                    argument
                )));
            }
            self.check_conforms(argument, member, &candidates, allowed)?;
        }
        Ok(())
    }

    /// Check a `SET [1:?]` argument: at least one member, each conforming
    pub fn validate_members(
        &self,
        argument: &str,
        members: &[Handle],
        allowed: &[&str],
    ) -> Result<()> {
        if members.is_empty() {
            return Err(Error::invalid_argument(format!(
                "{} needs at least one member",
                argument
            )));
        }
        self.validate_all_arguments(argument, Some(members), false, allowed)
    }

    /// Fail if a mandatory attribute of `entity` was not supplied
    ///
    /// Only attributes the loaded schema declares as non-optional are
    /// checked, so one factory serves schema versions that disagree on
    /// optionality.
    pub fn check_required(&self, entity: &str, attribute: &str, present: bool) -> Result<()> {
        let entity_type = self.registry.lookup(entity)?;
        match self.registry.attribute(entity_type, attribute) {
            Some(def) if def.is_mandatory() && !present => Err(Error::missing(
                self.registry.type_name(entity_type),
                def.name.as_str(),
            )),
            _ => Ok(()),
        }
    }

    /// Check an IFC GlobalId
    pub fn validate_global_id(&self, global_id: &str) -> Result<()> {
        if guid::is_valid(global_id) {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "'{}' is not a valid GlobalId",
                global_id
            )))
        }
    }

    fn candidate_types(&self, allowed: &[&str]) -> Result<Vec<EntityTypeId>> {
        allowed.iter().map(|name| self.registry.lookup(name)).collect()
    }

    fn check_conforms(
        &self,
        argument: &str,
        handle: Handle,
        candidates: &[EntityTypeId],
        allowed: &[&str],
    ) -> Result<()> {
        let instance = self.resolve(handle)?;
        if candidates.is_empty()
            || self
                .cache
                .is_subtype_of_any(&self.registry, instance.entity_type(), candidates)
        {
            Ok(())
        } else {
            Err(Error::subtype_mismatch(
                argument,
                allowed.join("|"),
                self.registry.type_name(instance.entity_type()),
            ))
        }
    }
}
