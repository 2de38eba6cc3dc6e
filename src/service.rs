//! Request-level operations on boards
//!
//! Every mutation follows the same cycle under a single writer lock: load
//! the owning [`BoardTree`], check the actor against the [`Authorizer`],
//! apply the change to the tree and commit the whole tree in one storage
//! write. Concurrent requests therefore commit one after the other and the
//! later full ordering wins.

use crate::{
    auth::{Actor, Authorizer},
    config::BoardsConfig,
    domain::{
        sort_boards, Board, BoardDraft, BoardId, BoardSettings, BoardTree, BoardView, Item,
        ItemId, ItemPayload, Slot, SlotId, SortField, SortOrder,
    },
    error::{BrandboardError, Result},
    storage::{file_storage::FileStorage, Storage},
};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Update,
    Delete,
}

impl Access {
    fn verb(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Ordered board model exposed to the application
pub struct BoardService {
    storage: Box<dyn Storage>,
    authorizer: Box<dyn Authorizer>,
    config: BoardsConfig,
    write_lock: Mutex<()>,
}

impl BoardService {
    pub fn new(
        storage: impl Storage + 'static,
        authorizer: impl Authorizer + 'static,
        config: BoardsConfig,
    ) -> Self {
        Self {
            storage: Box::new(storage),
            authorizer: Box::new(authorizer),
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Opens (initializing if needed) a file store under `project_root`
    /// and reads its `config.toml`
    pub async fn open(
        project_root: impl AsRef<Path>,
        authorizer: impl Authorizer + 'static,
    ) -> Result<Self> {
        let storage = FileStorage::new(project_root);
        if !storage.is_initialized().await {
            storage.initialize().await?;
        }
        let config = storage.load_config().await?;
        Ok(Self::new(storage, authorizer, config))
    }

    pub fn config(&self) -> &BoardsConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Boards
    // ------------------------------------------------------------------

    /// Creates a board, seeded with its kind's default slots when enabled
    #[instrument(skip(self, draft), fields(actor = %actor, kind = %draft.kind))]
    pub async fn create_board(&self, actor: &Actor, draft: BoardDraft) -> Result<Board> {
        let board = Board::new(draft)?;
        self.authorize(actor, &board, Access::Update)?;

        let mut tree = BoardTree::new(board);
        if self.config.boards.seed_default_slots {
            for name in tree
                .board
                .kind
                .default_slot_names()
                .iter()
                .take(self.config.limits.max_slots_per_board)
            {
                tree.create_slot(name)?;
            }
        }

        let _guard = self.write_lock.lock().await;
        self.storage.save_board_tree(&tree).await?;
        info!(board = %tree.board.id, slots = tree.slots().len(), "board created");
        Ok(tree.board)
    }

    /// Applies the board settings form
    #[instrument(skip(self, settings), fields(actor = %actor))]
    pub async fn update_board_settings(
        &self,
        actor: &Actor,
        board_id: &BoardId,
        settings: BoardSettings,
    ) -> Result<Board> {
        self.mutate(actor, board_id, Access::Update, |tree| {
            tree.board.apply_settings(settings)?;
            Ok(tree.board.clone())
        })
        .await
    }

    /// Deletes a board with all its slots and items
    #[instrument(skip(self), fields(actor = %actor))]
    pub async fn delete_board(&self, actor: &Actor, board_id: &BoardId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let tree = self.storage.load_board_tree(board_id).await?;
        self.authorize(actor, &tree.board, Access::Delete)?;

        self.storage.delete_board_tree(board_id).await?;
        info!(
            slots = tree.slots().len(),
            items = tree.item_count(),
            "board deleted"
        );
        Ok(())
    }

    /// Ordered slots and items of a board, ready for rendering
    pub async fn board_view(&self, board_id: &BoardId) -> Result<BoardView> {
        Ok(self.storage.load_board_tree(board_id).await?.view())
    }

    /// Boards, optionally restricted to one brand, in the requested order
    pub async fn list_boards(
        &self,
        brand_id: Option<&str>,
        field: SortField,
        order: SortOrder,
    ) -> Result<Vec<Board>> {
        let mut boards: Vec<Board> = self
            .storage
            .list_boards()
            .await?
            .into_iter()
            .filter(|board| brand_id.map_or(true, |brand| board.brand_id == brand))
            .collect();
        sort_boards(&mut boards, field, order);
        Ok(boards)
    }

    pub async fn search_boards(&self, query: &str) -> Result<Vec<Board>> {
        let mut boards = self.storage.search_boards(query).await?;
        sort_boards(&mut boards, SortField::Name, SortOrder::Ascending);
        debug!(query, matches = boards.len(), "board search");
        Ok(boards)
    }

    // ------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------

    /// Appends a slot to a board
    #[instrument(skip(self), fields(actor = %actor))]
    pub async fn create_slot(&self, actor: &Actor, board_id: &BoardId, name: &str) -> Result<Slot> {
        let max_slots = self.config.limits.max_slots_per_board;
        self.mutate(actor, board_id, Access::Update, |tree| {
            if tree.slots().len() >= max_slots {
                return Err(BrandboardError::validation(format!(
                    "Board already has the maximum of {} slots",
                    max_slots
                )));
            }
            tree.create_slot(name).cloned()
        })
        .await
    }

    #[instrument(skip(self), fields(actor = %actor))]
    pub async fn rename_slot(&self, actor: &Actor, slot_id: &SlotId, name: &str) -> Result<Slot> {
        let board_id = self.storage.find_board_of_slot(slot_id).await?;
        self.mutate(actor, &board_id, Access::Update, |tree| {
            tree.rename_slot(slot_id, name).cloned()
        })
        .await
    }

    /// Replaces the slot order of a board with `ordered`
    ///
    /// `ordered` must name every slot of the board exactly once.
    #[instrument(skip(self, ordered), fields(actor = %actor, count = ordered.len()))]
    pub async fn reorder_slots(
        &self,
        actor: &Actor,
        board_id: &BoardId,
        ordered: &[SlotId],
    ) -> Result<()> {
        self.mutate(actor, board_id, Access::Update, |tree| {
            tree.reorder_slots(ordered)
        })
        .await
    }

    /// Deletes a slot and its items, closing the gap among the remaining slots
    #[instrument(skip(self), fields(actor = %actor))]
    pub async fn delete_slot(&self, actor: &Actor, slot_id: &SlotId) -> Result<Slot> {
        let board_id = self.storage.find_board_of_slot(slot_id).await?;
        self.mutate(actor, &board_id, Access::Delete, |tree| {
            tree.delete_slot(slot_id)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Appends an item to a slot
    #[instrument(skip(self, payload), fields(actor = %actor))]
    pub async fn create_item(
        &self,
        actor: &Actor,
        slot_id: &SlotId,
        payload: ItemPayload,
    ) -> Result<Item> {
        let board_id = self.storage.find_board_of_slot(slot_id).await?;
        let max_items = self.config.limits.max_items_per_slot;
        self.mutate(actor, &board_id, Access::Update, |tree| {
            ensure_room(tree, slot_id, max_items)?;
            tree.create_item(slot_id, payload).cloned()
        })
        .await
    }

    #[instrument(skip(self, payload), fields(actor = %actor))]
    pub async fn update_item(
        &self,
        actor: &Actor,
        item_id: &ItemId,
        payload: ItemPayload,
    ) -> Result<Item> {
        let board_id = self.storage.find_board_of_item(item_id).await?;
        self.mutate(actor, &board_id, Access::Update, |tree| {
            tree.update_item(item_id, payload).cloned()
        })
        .await
    }

    /// Replaces the item order of a slot with `ordered`
    #[instrument(skip(self, ordered), fields(actor = %actor, count = ordered.len()))]
    pub async fn reorder_items(
        &self,
        actor: &Actor,
        slot_id: &SlotId,
        ordered: &[ItemId],
    ) -> Result<()> {
        let board_id = self.storage.find_board_of_slot(slot_id).await?;
        self.mutate(actor, &board_id, Access::Update, |tree| {
            tree.reorder_items(slot_id, ordered)
        })
        .await
    }

    /// Moves an item to `target_position` in `target_slot` of the same board
    #[instrument(skip(self), fields(actor = %actor))]
    pub async fn move_item(
        &self,
        actor: &Actor,
        item_id: &ItemId,
        target_slot: &SlotId,
        target_position: usize,
    ) -> Result<Item> {
        let item_board = self.storage.find_board_of_item(item_id).await?;
        let slot_board = self.storage.find_board_of_slot(target_slot).await?;

        let max_items = self.config.limits.max_items_per_slot;
        // authorization on the item's board runs before the ownership check
        self.mutate(actor, &item_board, Access::Update, |tree| {
            if item_board != slot_board {
                debug!(%item_board, %slot_board, "cross-board move refused");
                return Err(BrandboardError::CrossBoardMove {
                    item: item_id.to_string(),
                    slot: target_slot.to_string(),
                });
            }
            let already_there = tree
                .item(item_id)
                .map_or(false, |item| &item.slot_id == target_slot);
            if !already_there {
                ensure_room(tree, target_slot, max_items)?;
            }
            tree.move_item(item_id, target_slot, target_position)?;
            tree.item(item_id)
                .cloned()
                .ok_or_else(|| BrandboardError::ItemNotFound(item_id.to_string()))
        })
        .await
    }

    /// Deletes an item, closing the gap in its slot
    #[instrument(skip(self), fields(actor = %actor))]
    pub async fn delete_item(&self, actor: &Actor, item_id: &ItemId) -> Result<Item> {
        let board_id = self.storage.find_board_of_item(item_id).await?;
        self.mutate(actor, &board_id, Access::Delete, |tree| {
            tree.delete_item(item_id)
        })
        .await
    }

    // ------------------------------------------------------------------

    /// Runs one load-authorize-apply-commit cycle under the writer lock
    ///
    /// Nothing is written when `apply` fails.
    async fn mutate<T, F>(
        &self,
        actor: &Actor,
        board_id: &BoardId,
        access: Access,
        apply: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut BoardTree) -> Result<T> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut tree = self.storage.load_board_tree(board_id).await?;
        self.authorize(actor, &tree.board, access)?;

        let result = match apply(&mut tree) {
            Ok(result) => result,
            Err(err) => {
                debug!(board = %board_id, error = %err, "mutation rejected");
                return Err(err);
            }
        };

        self.storage.save_board_tree(&tree).await?;
        info!(board = %board_id, action = access.verb(), "board committed");
        Ok(result)
    }

    fn authorize(&self, actor: &Actor, board: &Board, access: Access) -> Result<()> {
        let allowed = match access {
            Access::Update => self.authorizer.can_update(actor, board),
            Access::Delete => self.authorizer.can_delete(actor, board),
        };
        if allowed {
            return Ok(());
        }

        warn!(actor = %actor, board = %board.id, action = access.verb(), "authorization refused");
        Err(BrandboardError::Unauthorized {
            actor: actor.to_string(),
            action: access.verb().to_string(),
            board: board.id.to_string(),
        })
    }
}

fn ensure_room(tree: &BoardTree, slot_id: &SlotId, max_items: usize) -> Result<()> {
    if tree.items_in(slot_id).len() >= max_items {
        return Err(BrandboardError::validation(format!(
            "Slot {} already holds the maximum of {} items",
            slot_id, max_items
        )));
    }
    Ok(())
}
