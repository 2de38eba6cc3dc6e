use crate::{
    domain::{Board, BoardId, BoardTree, ItemId, SlotId},
    error::Result,
};
use async_trait::async_trait;

pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// Storage trait for persisting boards with their slots and items
///
/// A board is always written as a whole [`BoardTree`]. Implementations must
/// make [`Storage::save_board_tree`] all-or-nothing: a reader sees either
/// the previous tree or the new one, never a mix of positions.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Atomically replaces the stored tree of a board
    async fn save_board_tree(&self, tree: &BoardTree) -> Result<()>;

    /// Loads a board with all its slots and items
    async fn load_board_tree(&self, id: &BoardId) -> Result<BoardTree>;

    /// Lists every board (without slots or items)
    async fn list_boards(&self) -> Result<Vec<Board>>;

    /// Searches boards whose name or description contains the query
    /// (case-insensitive)
    async fn search_boards(&self, query: &str) -> Result<Vec<Board>>;

    /// Deletes a board and everything it owns
    async fn delete_board_tree(&self, id: &BoardId) -> Result<()>;

    /// Finds the board owning a slot
    async fn find_board_of_slot(&self, id: &SlotId) -> Result<BoardId>;

    /// Finds the board owning an item
    async fn find_board_of_item(&self, id: &ItemId) -> Result<BoardId>;

    /// Checks if the store is initialized
    async fn is_initialized(&self) -> bool;
}
