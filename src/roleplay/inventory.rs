/// Inventory rules applied to a character record: stacking, weight cap, removal.
use super::errors::{RoleplayError, RoleplayResult};
use super::types::{CharacterRecord, InventoryEntry, ItemDefinition};

/// Outcome of a successful inventory mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryResult {
    /// Units were added, either onto an existing stack or as a new entry
    Added { quantity: u32, stacked: bool },
    /// Units were removed; `emptied` is true when the entry was deleted
    Removed { quantity: u32, emptied: bool },
}

// ============================================================================
// Queries
// ============================================================================

/// Sum of weight × quantity over every entry.
pub fn total_weight(entries: &[InventoryEntry]) -> u64 {
    entries.iter().map(InventoryEntry::total_weight).sum()
}

pub fn find_entry<'a>(record: &'a CharacterRecord, item_id: &str) -> Option<&'a InventoryEntry> {
    record.inventory.iter().find(|e| e.id == item_id)
}

pub fn item_quantity(record: &CharacterRecord, item_id: &str) -> u32 {
    find_entry(record, item_id).map(|e| e.quantity).unwrap_or(0)
}

pub fn has_item(record: &CharacterRecord, item_id: &str, quantity: u32) -> bool {
    item_quantity(record, item_id) >= quantity.max(1)
}

/// Remaining capacity before the weight cap is hit.
pub fn free_weight(record: &CharacterRecord) -> u64 {
    (record.max_weight as u64).saturating_sub(total_weight(&record.inventory))
}

// ============================================================================
// Mutations
// ============================================================================

/// Check whether `quantity` units of `definition` fit under the weight cap.
pub fn can_add_item(
    record: &CharacterRecord,
    definition: &ItemDefinition,
    quantity: u32,
) -> RoleplayResult<()> {
    if quantity == 0 {
        return Err(RoleplayError::InvalidArgument(
            "quantity must be greater than zero".to_string(),
        ));
    }
    let current = total_weight(&record.inventory);
    let additional = definition.weight as u64 * quantity as u64;
    if current + additional > record.max_weight as u64 {
        return Err(RoleplayError::CapacityExceeded(format!(
            "too heavy: {} more weight units fit, {} x {} weighs {}",
            free_weight(record),
            quantity,
            definition.name,
            additional
        )));
    }
    Ok(())
}

/// Add units to the inventory, stacking onto an entry with the same id.
/// Nothing changes when the weight cap would be exceeded.
pub fn add_item(
    record: &mut CharacterRecord,
    definition: &ItemDefinition,
    quantity: u32,
) -> RoleplayResult<InventoryResult> {
    can_add_item(record, definition, quantity)?;

    if let Some(entry) = record.inventory.iter_mut().find(|e| e.id == definition.id) {
        entry.quantity = entry.quantity.checked_add(quantity).ok_or_else(|| {
            RoleplayError::CapacityExceeded(format!("stack of {} is full", definition.name))
        })?;
        return Ok(InventoryResult::Added {
            quantity,
            stacked: true,
        });
    }

    record
        .inventory
        .push(InventoryEntry::from_definition(definition, quantity));
    Ok(InventoryResult::Added {
        quantity,
        stacked: false,
    })
}

/// Remove units from an entry. Removing exactly the held amount deletes the entry;
/// asking for more than is held fails and leaves the inventory untouched.
pub fn remove_item(
    record: &mut CharacterRecord,
    item_id: &str,
    quantity: u32,
) -> RoleplayResult<InventoryResult> {
    if quantity == 0 {
        return Err(RoleplayError::InvalidArgument(
            "quantity must be greater than zero".to_string(),
        ));
    }

    let Some(index) = record.inventory.iter().position(|e| e.id == item_id) else {
        return Err(RoleplayError::ItemNotInInventory(item_id.to_string()));
    };

    let entry = &mut record.inventory[index];
    if entry.quantity < quantity {
        return Err(RoleplayError::InsufficientQuantity {
            item: entry.name.clone(),
            held: entry.quantity,
            requested: quantity,
        });
    }

    entry.quantity -= quantity;
    let emptied = entry.quantity == 0;
    if emptied {
        record.inventory.remove(index);
    }
    Ok(InventoryResult::Removed { quantity, emptied })
}

/// One line per entry, e.g. `3x Apple (3 wt)`, followed by the load summary.
pub fn format_inventory_compact(record: &CharacterRecord) -> String {
    if record.inventory.is_empty() {
        return format!("Inventory empty (0/{} wt)", record.max_weight);
    }
    let mut lines: Vec<String> = record
        .inventory
        .iter()
        .map(|e| format!("{}x {} [{}] ({} wt)", e.quantity, e.name, e.id, e.total_weight()))
        .collect();
    lines.push(format!(
        "Load: {}/{} wt",
        total_weight(&record.inventory),
        record.max_weight
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_character() -> CharacterRecord {
        CharacterRecord::new("char-1", "John Doe", 40)
    }

    fn apple() -> ItemDefinition {
        ItemDefinition::new("item_apple", "Apple", "consumable", 1)
    }

    fn health_kit() -> ItemDefinition {
        ItemDefinition::new("item_health_kit", "Health_Kit", "consumable", 5)
    }

    #[test]
    fn test_add_creates_then_stacks() {
        let mut character = test_character();
        let result = add_item(&mut character, &apple(), 3).expect("add");
        assert_eq!(
            result,
            InventoryResult::Added {
                quantity: 3,
                stacked: false
            }
        );
        let result = add_item(&mut character, &apple(), 2).expect("add");
        assert_eq!(
            result,
            InventoryResult::Added {
                quantity: 2,
                stacked: true
            }
        );
        assert_eq!(character.inventory.len(), 1);
        assert_eq!(item_quantity(&character, "item_apple"), 5);
    }

    #[test]
    fn test_weight_cap_rejects_without_partial_add() {
        let mut character = test_character();
        add_item(&mut character, &health_kit(), 7).expect("35 of 40");
        let before = character.inventory.clone();

        let err = add_item(&mut character, &health_kit(), 2).unwrap_err();
        assert!(matches!(err, RoleplayError::CapacityExceeded(_)));
        assert_eq!(character.inventory, before);

        // Exactly at the cap is still allowed
        add_item(&mut character, &apple(), 5).expect("fills to 40");
        assert_eq!(total_weight(&character.inventory), 40);
        assert_eq!(free_weight(&character), 0);
    }

    #[test]
    fn test_remove_more_than_held_fails_unchanged() {
        let mut character = test_character();
        add_item(&mut character, &apple(), 2).expect("add");
        let err = remove_item(&mut character, "item_apple", 3).unwrap_err();
        assert!(matches!(
            err,
            RoleplayError::InsufficientQuantity {
                held: 2,
                requested: 3,
                ..
            }
        ));
        assert_eq!(item_quantity(&character, "item_apple"), 2);
    }

    #[test]
    fn test_remove_exact_quantity_deletes_entry() {
        let mut character = test_character();
        add_item(&mut character, &apple(), 2).expect("add");
        let result = remove_item(&mut character, "item_apple", 2).expect("remove");
        assert_eq!(
            result,
            InventoryResult::Removed {
                quantity: 2,
                emptied: true
            }
        );
        assert!(character.inventory.is_empty());
        assert!(!has_item(&character, "item_apple", 1));
    }

    #[test]
    fn test_remove_missing_item() {
        let mut character = test_character();
        let err = remove_item(&mut character, "item_apple", 1).unwrap_err();
        assert!(matches!(err, RoleplayError::ItemNotInInventory(_)));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut character = test_character();
        assert!(matches!(
            add_item(&mut character, &apple(), 0),
            Err(RoleplayError::InvalidArgument(_))
        ));
        assert!(matches!(
            remove_item(&mut character, "item_apple", 0),
            Err(RoleplayError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_format_inventory_compact() {
        let mut character = test_character();
        assert_eq!(format_inventory_compact(&character), "Inventory empty (0/40 wt)");
        add_item(&mut character, &apple(), 3).expect("add");
        let text = format_inventory_compact(&character);
        assert!(text.contains("3x Apple"));
        assert!(text.ends_with("Load: 3/40 wt"));
    }
}
