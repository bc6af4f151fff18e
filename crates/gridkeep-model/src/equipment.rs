// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

use crate::inventory::ItemStack;

/// An equippable slot on an actor. Ordered so that [`EQUIP_SLOTS`] can drive
/// deterministic iteration (e.g. when building a keyframe or comparing two
/// equipment sets memberwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    MainHand,
    OffHand,
    Head,
    Body,
    Gloves,
    Boots,
    Accessory,
}

/// All equip slots, in canonical order.
pub const EQUIP_SLOTS: [EquipSlot; 7] = [
    EquipSlot::MainHand,
    EquipSlot::OffHand,
    EquipSlot::Head,
    EquipSlot::Body,
    EquipSlot::Gloves,
    EquipSlot::Boots,
    EquipSlot::Accessory,
];

/// What an actor currently has equipped, one item stack per slot.
///
/// Kept as named fields rather than a map so that snapshot comparison and
/// serialization always walk the same, canonical slot order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    main_hand: Option<ItemStack>,
    off_hand: Option<ItemStack>,
    head: Option<ItemStack>,
    body: Option<ItemStack>,
    gloves: Option<ItemStack>,
    boots: Option<ItemStack>,
    accessory: Option<ItemStack>,
}

impl Equipment {
    /// Reads the stack equipped in `slot`, if any.
    #[must_use]
    pub fn get(&self, slot: EquipSlot) -> Option<&ItemStack> {
        self.slot_ref(slot).as_ref()
    }

    /// Equips `stack` in `slot`, returning whatever was there before.
    pub fn equip(&mut self, slot: EquipSlot, stack: ItemStack) -> Option<ItemStack> {
        self.slot_mut(slot).replace(stack)
    }

    /// Clears `slot`, returning whatever was there before.
    pub fn unequip(&mut self, slot: EquipSlot) -> Option<ItemStack> {
        self.slot_mut(slot).take()
    }

    fn slot_ref(&self, slot: EquipSlot) -> &Option<ItemStack> {
        match slot {
            EquipSlot::MainHand => &self.main_hand,
            EquipSlot::OffHand => &self.off_hand,
            EquipSlot::Head => &self.head,
            EquipSlot::Body => &self.body,
            EquipSlot::Gloves => &self.gloves,
            EquipSlot::Boots => &self.boots,
            EquipSlot::Accessory => &self.accessory,
        }
    }

    fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<ItemStack> {
        match slot {
            EquipSlot::MainHand => &mut self.main_hand,
            EquipSlot::OffHand => &mut self.off_hand,
            EquipSlot::Head => &mut self.head,
            EquipSlot::Body => &mut self.body,
            EquipSlot::Gloves => &mut self.gloves,
            EquipSlot::Boots => &mut self.boots,
            EquipSlot::Accessory => &mut self.accessory,
        }
    }

    /// All slots in canonical order, paired with their current contents.
    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, Option<&ItemStack>)> {
        EQUIP_SLOTS.iter().map(|slot| (*slot, self.get(*slot)))
    }
}
