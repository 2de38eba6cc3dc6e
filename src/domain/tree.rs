use crate::domain::{
    board::Board,
    id::{ItemId, SlotId},
    item::{Item, ItemPayload},
    ordering,
    slot::Slot,
};
use crate::error::{BrandboardError, Result};
use serde::{Deserialize, Serialize};

/// One board together with every slot and item it owns
///
/// This is the unit loaded from and committed to storage. All structural
/// changes go through its methods, which renumber the affected sibling
/// groups so positions are always dense (`0..n`). Slots are kept sorted by
/// position and items by `(slot position, item position)`.
///
/// Deserializing goes through [`BoardTree::from_parts`], so a document with
/// orphans or gaps is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TreeParts")]
pub struct BoardTree {
    pub board: Board,
    slots: Vec<Slot>,
    items: Vec<Item>,
}

/// Unchecked serialized form of a [`BoardTree`]
#[derive(Debug, Deserialize)]
pub(crate) struct TreeParts {
    pub board: Board,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl TryFrom<TreeParts> for BoardTree {
    type Error = BrandboardError;

    fn try_from(parts: TreeParts) -> Result<Self> {
        Self::from_parts(parts.board, parts.slots, parts.items)
    }
}

/// Read-side projection of a board for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardView {
    pub board: Board,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotView {
    pub slot: Slot,
    pub items: Vec<Item>,
}

impl BoardTree {
    /// Creates an empty tree for a board
    pub fn new(board: Board) -> Self {
        Self {
            board,
            slots: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Rebuilds a tree from stored rows, checking every invariant
    pub fn from_parts(board: Board, slots: Vec<Slot>, items: Vec<Item>) -> Result<Self> {
        let mut tree = Self {
            board,
            slots,
            items,
        };
        tree.sort();
        tree.verify()?;
        Ok(tree)
    }

    /// Slots in position order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, id: &SlotId) -> Option<&Slot> {
        self.slots.iter().find(|slot| &slot.id == id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Items of a slot in position order
    pub fn items_in(&self, slot_id: &SlotId) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| &item.slot_id == slot_id)
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Slot ids in position order
    pub fn slot_order(&self) -> Vec<SlotId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    /// Item ids of a slot in position order
    pub fn item_order(&self, slot_id: &SlotId) -> Vec<ItemId> {
        self.items_in(slot_id).iter().map(|item| item.id).collect()
    }

    /// Appends a slot after the current last one
    pub fn create_slot(&mut self, name: &str) -> Result<&Slot> {
        let position = ordering::next_position(self.slots.iter().map(|slot| slot.position));
        let slot = Slot::new(self.board.id, name, position)?;
        self.slots.push(slot);
        self.board.touch();
        Ok(&self.slots[self.slots.len() - 1])
    }

    pub fn rename_slot(&mut self, slot_id: &SlotId, name: &str) -> Result<&Slot> {
        let index = self.slot_index(slot_id)?;
        self.slots[index].rename(name)?;
        self.board.touch();
        Ok(&self.slots[index])
    }

    /// Appends an item to the end of a slot
    pub fn create_item(&mut self, slot_id: &SlotId, payload: ItemPayload) -> Result<&Item> {
        self.slot_index(slot_id)?;
        self.ensure_accepts(&payload)?;
        let position = ordering::next_position(
            self.items
                .iter()
                .filter(|item| &item.slot_id == slot_id)
                .map(|item| item.position),
        );
        let item = Item::new(*slot_id, payload, position)?;
        let id = item.id;
        self.items.push(item);
        self.sort();
        self.board.touch();
        self.item_ref(&id)
    }

    pub fn update_item(&mut self, item_id: &ItemId, payload: ItemPayload) -> Result<&Item> {
        self.ensure_accepts(&payload)?;
        let index = self.item_index(item_id)?;
        self.items[index].set_payload(payload)?;
        self.board.touch();
        Ok(&self.items[index])
    }

    /// Assigns positions `0..n` to the slots in the given order
    pub fn reorder_slots(&mut self, ordered: &[SlotId]) -> Result<()> {
        ordering::validate_membership("slots", &self.slot_order(), ordered)?;
        self.apply_slot_order(ordered);
        self.board.touch();
        Ok(())
    }

    /// Assigns positions `0..m` to the slot's items in the given order
    pub fn reorder_items(&mut self, slot_id: &SlotId, ordered: &[ItemId]) -> Result<()> {
        self.slot_index(slot_id)?;
        ordering::validate_membership("items", &self.item_order(slot_id), ordered)?;
        self.apply_item_order(ordered);
        self.board.touch();
        Ok(())
    }

    /// Moves an item to `target_position` of `target_slot`
    ///
    /// Positions past the end append. Both the source and target slots end
    /// up densely numbered; a move within one slot is a plain reorder.
    /// Returns the index the item landed on.
    pub fn move_item(
        &mut self,
        item_id: &ItemId,
        target_slot: &SlotId,
        target_position: usize,
    ) -> Result<usize> {
        let index = self.item_index(item_id)?;
        self.slot_index(target_slot)?;
        let source_slot = self.items[index].slot_id;

        let mut target_order: Vec<ItemId> = self
            .item_order(target_slot)
            .into_iter()
            .filter(|id| id != item_id)
            .collect();
        let landed = ordering::insert_clamped(&mut target_order, target_position, *item_id);

        self.items[index].slot_id = *target_slot;
        self.items[index].updated_at = chrono::Utc::now();
        if source_slot != *target_slot {
            let source_order = self.item_order(&source_slot);
            self.apply_item_order(&source_order);
        }
        self.apply_item_order(&target_order);
        self.board.touch();
        Ok(landed)
    }

    /// Removes a slot and, first, every item it holds
    pub fn delete_slot(&mut self, slot_id: &SlotId) -> Result<Slot> {
        let index = self.slot_index(slot_id)?;
        self.items.retain(|item| &item.slot_id != slot_id);
        let slot = self.slots.remove(index);
        let remaining = self.slot_order();
        self.apply_slot_order(&remaining);
        self.board.touch();
        Ok(slot)
    }

    /// Removes an item and closes the gap in its slot
    pub fn delete_item(&mut self, item_id: &ItemId) -> Result<Item> {
        let index = self.item_index(item_id)?;
        let item = self.items.remove(index);
        let remaining = self.item_order(&item.slot_id);
        self.apply_item_order(&remaining);
        self.board.touch();
        Ok(item)
    }

    /// Checks ownership and dense positions across the whole tree
    pub fn verify(&self) -> Result<()> {
        let corrupted = |reason: String| BrandboardError::CorruptedBoard {
            board: self.board.id.to_string(),
            reason,
        };

        if let Some(slot) = self.slots.iter().find(|s| s.board_id != self.board.id) {
            return Err(corrupted(format!(
                "slot {} belongs to board {}",
                slot.id, slot.board_id
            )));
        }
        if !ordering::is_dense(self.slots.iter().map(|slot| slot.position)) {
            return Err(corrupted("slot positions are not dense".to_string()));
        }
        if let Some(item) = self.items.iter().find(|i| self.slot(&i.slot_id).is_none()) {
            return Err(corrupted(format!(
                "item {} references missing slot {}",
                item.id, item.slot_id
            )));
        }
        for slot in &self.slots {
            if !ordering::is_dense(self.items_in(&slot.id).iter().map(|item| item.position)) {
                return Err(corrupted(format!(
                    "item positions in slot {} are not dense",
                    slot.id
                )));
            }
        }
        Ok(())
    }

    /// Ordered projection for the presentation layer
    pub fn view(&self) -> BoardView {
        BoardView {
            board: self.board.clone(),
            slots: self
                .slots
                .iter()
                .map(|slot| SlotView {
                    slot: slot.clone(),
                    items: self.items_in(&slot.id).into_iter().cloned().collect(),
                })
                .collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_parts(self) -> (Board, Vec<Slot>, Vec<Item>) {
        (self.board, self.slots, self.items)
    }

    fn ensure_accepts(&self, payload: &ItemPayload) -> Result<()> {
        if self.board.kind.accepts(payload) {
            Ok(())
        } else {
            Err(BrandboardError::validation(format!(
                "{} boards do not accept {} items",
                self.board.kind,
                payload_type(payload)
            )))
        }
    }

    fn apply_slot_order(&mut self, ordered: &[SlotId]) {
        let positions = ordering::renumber(ordered);
        for slot in &mut self.slots {
            if let Some(position) = positions.get(&slot.id) {
                slot.position = *position;
            }
        }
        self.sort();
    }

    fn apply_item_order(&mut self, ordered: &[ItemId]) {
        let positions = ordering::renumber(ordered);
        for item in &mut self.items {
            if let Some(position) = positions.get(&item.id) {
                item.position = *position;
            }
        }
        self.sort();
    }

    fn sort(&mut self) {
        self.slots.sort_by_key(|slot| slot.position);
        let slot_positions = ordering::renumber(&self.slot_order());
        self.items.sort_by_key(|item| {
            (
                slot_positions.get(&item.slot_id).copied().unwrap_or(u32::MAX),
                item.position,
            )
        });
    }

    fn slot_index(&self, id: &SlotId) -> Result<usize> {
        self.slots
            .iter()
            .position(|slot| &slot.id == id)
            .ok_or_else(|| BrandboardError::SlotNotFound(id.to_string()))
    }

    fn item_index(&self, id: &ItemId) -> Result<usize> {
        self.items
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| BrandboardError::ItemNotFound(id.to_string()))
    }

    fn item_ref(&self, id: &ItemId) -> Result<&Item> {
        self.item(id)
            .ok_or_else(|| BrandboardError::ItemNotFound(id.to_string()))
    }
}

fn payload_type(payload: &ItemPayload) -> &'static str {
    match payload {
        ItemPayload::Card { .. } => "card",
        ItemPayload::Keyword { .. } => "keyword",
        ItemPayload::Asset { .. } => "asset",
        ItemPayload::Color { .. } => "color",
    }
}
