// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on the number of slots an inventory may hold. Enforced by the
/// write-barrier mutator, not by this type, so that construction in tests
/// and fixtures stays infallible.
pub const MAX_INVENTORY_SLOTS: usize = 36;

/// Identifies an item's stacking/equip behavior. Kept as an opaque interned
/// string rather than a closed enum so that content can add item types
/// without a model-crate release.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemType(pub String);

impl ItemType {
    /// Builds an item type from a static name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// A stack of items occupying a single inventory slot.
///
/// `fungibility_key` determines which stacks merge: two stacks with the
/// same key merge regardless of how they got their quantity, even if a
/// future feature mints two different-looking items of the same
/// `item_type` (e.g. a named unique variant) that should never merge with
/// the plain version. Absent an explicit alternate key, the fungibility key
/// equals the item type's own name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_type: ItemType,
    pub fungibility_key: String,
    pub quantity: u32,
}

impl ItemStack {
    /// Builds a stack with an explicit fungibility key.
    #[must_use]
    pub fn new(item_type: ItemType, fungibility_key: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_type,
            fungibility_key: fungibility_key.into(),
            quantity,
        }
    }

    /// Builds a stack whose fungibility key is the item type's own name,
    /// the common case.
    #[must_use]
    pub fn with_canonical_key(item_type: ItemType, quantity: u32) -> Self {
        let key = item_type.0.clone();
        Self::new(item_type, key, quantity)
    }
}

/// One inventory slot, either empty or holding a stack.
pub type InventorySlot = Option<ItemStack>;

/// Failures from [`Inventory::add_stack`] / [`Inventory::remove_quantity`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("inventory has no free slot for a new stack")]
    NoCapacity,
    #[error("insufficient quantity of {fungibility_key} to remove {requested}")]
    InsufficientQuantity {
        fungibility_key: String,
        requested: u32,
    },
}

/// A fixed-capacity bag of item stacks, indexed by slot.
///
/// Slot index always equals array position, so clients can treat the slot
/// list as the full, ordered ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<InventorySlot>,
}

impl Inventory {
    /// Builds an empty inventory with `capacity` slots, clamped to
    /// [`MAX_INVENTORY_SLOTS`].
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_INVENTORY_SLOTS);
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Number of slots, occupied or not.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Read-only view of a slot.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// All slots in order, including empty ones.
    #[must_use]
    pub fn slots(&self) -> &[InventorySlot] {
        &self.slots
    }

    /// Total quantity held across all slots for a given fungibility key.
    #[must_use]
    pub fn total_quantity(&self, fungibility_key: &str) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|stack| stack.fungibility_key == fungibility_key)
            .map(|stack| stack.quantity)
            .sum()
    }

    /// Adds a stack, merging into an existing slot with the same
    /// fungibility key if one exists, otherwise occupying the first empty
    /// slot. Fails if neither is available.
    pub fn add_stack(&mut self, stack: ItemStack) -> Result<(), InventoryError> {
        if let Some(existing) = self
            .slots
            .iter_mut()
            .flatten()
            .find(|candidate| candidate.fungibility_key == stack.fungibility_key)
        {
            existing.quantity += stack.quantity;
            return Ok(());
        }
        if let Some(empty) = self.slots.iter_mut().find(|slot| slot.is_none()) {
            *empty = Some(stack);
            return Ok(());
        }
        Err(InventoryError::NoCapacity)
    }

    /// Removes `quantity` of the stack identified by `fungibility_key`,
    /// clearing the slot entirely if it reaches zero. Fails if the
    /// inventory doesn't hold enough.
    pub fn remove_quantity(
        &mut self,
        fungibility_key: &str,
        quantity: u32,
    ) -> Result<(), InventoryError> {
        if self.total_quantity(fungibility_key) < quantity {
            return Err(InventoryError::InsufficientQuantity {
                fungibility_key: fungibility_key.to_owned(),
                requested: quantity,
            });
        }
        let mut remaining = quantity;
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            let Some(stack) = slot else { continue };
            if stack.fungibility_key != fungibility_key {
                continue;
            }
            let taken = remaining.min(stack.quantity);
            stack.quantity -= taken;
            remaining -= taken;
            if stack.quantity == 0 {
                *slot = None;
            }
        }
        Ok(())
    }
}
