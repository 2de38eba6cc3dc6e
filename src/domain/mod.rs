pub mod board;
pub mod id;
pub mod item;
pub mod ordering;
pub mod slot;
pub mod sorting;
pub mod tree;

pub use board::{Board, BoardDraft, BoardKind, BoardSettings};
pub use id::{BoardId, ItemId, SlotId};
pub use item::{Item, ItemPayload};
pub use slot::Slot;
pub use sorting::{sort_boards, SortField, SortOrder};
pub use tree::{BoardTree, BoardView, SlotView};
