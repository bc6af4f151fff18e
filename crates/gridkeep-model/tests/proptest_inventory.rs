// SPDX-License-Identifier: Apache-2.0
//! Random add/remove sequences against [`Inventory`], checking that slot
//! indexing, positive-quantity, and fungibility-key total invariants hold
//! after every operation, not just in hand-picked cases.
#![allow(missing_docs)]

use gridkeep_model::{Inventory, ItemStack, ItemType};
use proptest::prelude::*;

const FUNGIBILITY_KEYS: [&str; 3] = ["gold", "potion", "iron_ore"];

#[derive(Debug, Clone)]
enum InventoryOp {
    Add { key_index: usize, quantity: u32 },
    Remove { key_index: usize, quantity: u32 },
}

fn op_strategy() -> impl Strategy<Value = InventoryOp> {
    prop_oneof![
        (0..FUNGIBILITY_KEYS.len(), 1u32..20).prop_map(|(key_index, quantity)| InventoryOp::Add { key_index, quantity }),
        (0..FUNGIBILITY_KEYS.len(), 1u32..20).prop_map(|(key_index, quantity)| InventoryOp::Remove { key_index, quantity }),
    ]
}

fn assert_invariants(inventory: &Inventory) {
    for (index, slot) in inventory.slots().iter().enumerate() {
        // Slot index equals array position by construction; `slot()` is the
        // only accessor and it indexes the same backing vec `slots()` returns.
        assert_eq!(inventory.slot(index), slot.as_ref());
        if let Some(stack) = slot {
            assert!(stack.quantity > 0, "occupied slot {index} carries a zero quantity");
        }
    }
    for key in FUNGIBILITY_KEYS {
        let summed: u32 = inventory
            .slots()
            .iter()
            .flatten()
            .filter(|stack| stack.fungibility_key == key)
            .map(|stack| stack.quantity)
            .sum();
        assert_eq!(inventory.total_quantity(key), summed);
    }
}

proptest! {
    #[test]
    fn random_op_sequences_preserve_inventory_invariants(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut inventory = Inventory::with_capacity(6);
        for op in ops {
            match op {
                InventoryOp::Add { key_index, quantity } => {
                    let key = FUNGIBILITY_KEYS[key_index];
                    let _ = inventory.add_stack(ItemStack::with_canonical_key(ItemType::new(key), quantity));
                }
                InventoryOp::Remove { key_index, quantity } => {
                    let key = FUNGIBILITY_KEYS[key_index];
                    let _ = inventory.remove_quantity(key, quantity);
                }
            }
            assert_invariants(&inventory);
        }
    }
}
