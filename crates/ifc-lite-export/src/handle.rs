// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Instance handles

use ifc_lite_schema::{EntityId, EntityTypeId};
use std::fmt;

/// Opaque reference to an instance owned by an export session
///
/// A handle either refers to an instance or is null. Handles are cheap to
/// copy and carry the exact entity type of the instance, so type checks do
/// not need a store lookup. They also carry the tag of the store that
/// issued them; other stores reject them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Handle {
    inner: Option<(EntityId, EntityTypeId)>,
    owner: u32,
}

impl Handle {
    /// The null handle
    pub const NULL: Handle = Handle {
        inner: None,
        owner: 0,
    };

    pub(crate) fn new(id: EntityId, entity_type: EntityTypeId, owner: u32) -> Self {
        Self {
            inner: Some((id, entity_type)),
            owner,
        }
    }

    #[inline]
    pub(crate) fn owner(&self) -> u32 {
        self.owner
    }

    /// Whether the handle refers to an instance
    #[inline]
    pub fn has_value(&self) -> bool {
        self.inner.is_some()
    }

    /// Whether the handle is null
    #[inline]
    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// Instance id, `None` for null handles
    #[inline]
    pub fn id(&self) -> Option<EntityId> {
        self.inner.map(|(id, _)| id)
    }

    /// Exact entity type, `None` for null handles
    #[inline]
    pub fn entity_type(&self) -> Option<EntityTypeId> {
        self.inner.map(|(_, ty)| ty)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner {
            Some((id, _)) => write!(f, "{}", id),
            None => f.write_str("$"),
        }
    }
}
