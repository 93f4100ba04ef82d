// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Instance store
//!
//! Append-only arena of instances. Ids are assigned sequentially from `#1`
//! in creation order, which is also the order instances are written out.

use crate::Handle;
use ifc_lite_schema::{AttributeValue, EntityId, EntityTypeId};
use std::sync::atomic::{AtomicU32, Ordering};

/// Tags handed to stores; 0 is reserved for the null handle
static NEXT_OWNER: AtomicU32 = AtomicU32::new(1);

/// One constructed instance
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    owner: u32,
    id: EntityId,
    entity_type: EntityTypeId,
    values: Vec<Option<AttributeValue>>,
}

impl Instance {
    /// Instance id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Exact entity type
    pub fn entity_type(&self) -> EntityTypeId {
        self.entity_type
    }

    /// Handle to this instance
    pub fn handle(&self) -> Handle {
        Handle::new(self.id, self.entity_type, self.owner)
    }

    /// Slot values in positional order; `None` is unset
    pub fn values(&self) -> &[Option<AttributeValue>] {
        &self.values
    }

    /// Value of one slot
    pub fn value(&self, slot: usize) -> Option<&AttributeValue> {
        self.values.get(slot).and_then(|v| v.as_ref())
    }

    pub(crate) fn set(&mut self, slot: usize, value: Option<AttributeValue>) -> Option<AttributeValue> {
        match self.values.get_mut(slot) {
            Some(target) => std::mem::replace(target, value),
            None => None,
        }
    }
}

/// Arena of instances in creation order
#[derive(Debug)]
pub struct InstanceStore {
    owner: u32,
    instances: Vec<Instance>,
}

impl Default for InstanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceStore {
    pub fn new() -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            instances: Vec::new(),
        }
    }

    /// Append an instance and return its handle
    pub fn push(&mut self, entity_type: EntityTypeId, values: Vec<Option<AttributeValue>>) -> Handle {
        let id = EntityId(self.instances.len() as u32 + 1);
        self.instances.push(Instance {
            owner: self.owner,
            id,
            entity_type,
            values,
        });
        Handle::new(id, entity_type, self.owner)
    }

    /// Instance by id
    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&Instance> {
        (id.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.instances.get(index))
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Instance> {
        (id.0 as usize)
            .checked_sub(1)
            .and_then(move |index| self.instances.get_mut(index))
    }

    /// Instance behind a handle, if the handle was issued by this store
    pub fn resolve(&self, handle: Handle) -> Option<&Instance> {
        if handle.owner() != self.owner {
            return None;
        }
        let id = handle.id()?;
        self.get(id)
            .filter(|instance| Some(instance.entity_type) == handle.entity_type())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instances in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }
}
