use crate::{
    domain::{Board, BoardId, BoardKind, BoardTree, Item, ItemId, ItemPayload, Slot, SlotId},
    error::{BrandboardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::{
    path::Path,
    str::FromStr,
    sync::{Mutex, MutexGuard},
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS boards (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    brand_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS slots (
    id TEXT PRIMARY KEY,
    board_id TEXT NOT NULL REFERENCES boards(id),
    name TEXT NOT NULL,
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (board_id, position)
);

CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    slot_id TEXT NOT NULL REFERENCES slots(id),
    payload TEXT NOT NULL,
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (slot_id, position)
);

CREATE INDEX IF NOT EXISTS idx_slots_board ON slots(board_id);
CREATE INDEX IF NOT EXISTS idx_items_slot ON items(slot_id);
"#;

type BoardRow = (String, String, String, String, Option<String>, String, String);
type SlotRow = (String, String, String, i64, String);
type ItemRow = (String, String, String, i64, String, String);

/// SQLite-based storage backend for board trees
///
/// A save rewrites the board's slot and item rows inside one transaction.
/// Foreign keys are enforced, so a row can never outlive its parent.
pub struct SqliteStorage {
    connection: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) a database file
    pub fn new(database_path: impl AsRef<Path>) -> Result<Self> {
        let database_path = database_path.as_ref();
        if let Some(parent) = database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(database_path)?)
    }

    /// Opens an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| BrandboardError::StorageError("SQLite connection poisoned".to_string()))
    }

    fn save_sync(&self, tree: &BoardTree) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let board = &tree.board;
        let board_id = board.id.to_string();

        tx.execute(
            "INSERT INTO boards (id, kind, brand_id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                brand_id = excluded.brand_id,
                name = excluded.name,
                description = excluded.description,
                updated_at = excluded.updated_at",
            params![
                board_id,
                board.kind.as_key(),
                board.brand_id,
                board.name,
                board.description,
                board.created_at.to_rfc3339(),
                board.updated_at.to_rfc3339(),
            ],
        )?;

        delete_children(&tx, &board_id)?;

        for slot in tree.slots() {
            tx.execute(
                "INSERT INTO slots (id, board_id, name, position, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    slot.id.to_string(),
                    board_id,
                    slot.name,
                    i64::from(slot.position),
                    slot.created_at.to_rfc3339(),
                ],
            )?;
            for item in tree.items_in(&slot.id) {
                tx.execute(
                    "INSERT INTO items (id, slot_id, payload, position, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        item.id.to_string(),
                        slot.id.to_string(),
                        serde_json::to_string(&item.payload)?,
                        i64::from(item.position),
                        item.created_at.to_rfc3339(),
                        item.updated_at.to_rfc3339(),
                    ],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_sync(&self, id: &BoardId) -> Result<BoardTree> {
        let conn = self.lock()?;
        let board_id = id.to_string();

        let row: Option<BoardRow> = conn
            .query_row(
                "SELECT id, kind, brand_id, name, description, created_at, updated_at
                 FROM boards WHERE id = ?1",
                [&board_id],
                read_board_row,
            )
            .optional()?;
        let board = match row {
            Some(row) => board_from_row(row)?,
            None => return Err(BrandboardError::BoardNotFound(board_id)),
        };

        let mut stmt = conn.prepare(
            "SELECT id, board_id, name, position, created_at
             FROM slots WHERE board_id = ?1 ORDER BY position",
        )?;
        let slots = stmt
            .query_map([&board_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<std::result::Result<Vec<SlotRow>, _>>()?
            .into_iter()
            .map(slot_from_row)
            .collect::<Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
            "SELECT i.id, i.slot_id, i.payload, i.position, i.created_at, i.updated_at
             FROM items i JOIN slots s ON s.id = i.slot_id
             WHERE s.board_id = ?1
             ORDER BY s.position, i.position",
        )?;
        let items = stmt
            .query_map([&board_id], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<ItemRow>, _>>()?
            .into_iter()
            .map(item_from_row)
            .collect::<Result<Vec<_>>>()?;

        BoardTree::from_parts(board, slots, items)
    }

    fn query_boards(&self) -> Result<Vec<Board>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, kind, brand_id, name, description, created_at, updated_at
             FROM boards ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], read_board_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(board_from_row).collect()
    }

    fn delete_sync(&self, id: &BoardId) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let board_id = id.to_string();

        delete_children(&tx, &board_id)?;
        let deleted = tx.execute("DELETE FROM boards WHERE id = ?1", [&board_id])?;
        if deleted == 0 {
            return Err(BrandboardError::BoardNotFound(board_id));
        }

        tx.commit()?;
        Ok(())
    }

    fn owner_sync(&self, sql: &str, id: String) -> Result<Option<BoardId>> {
        let conn = self.lock()?;
        let owner: Option<String> = conn.query_row(sql, [&id], |row| row.get(0)).optional()?;
        owner.map(|owner| BoardId::from_str(&owner)).transpose()
    }
}

/// Items go before slots; neither table cascades on its own
fn delete_children(tx: &Transaction<'_>, board_id: &str) -> Result<()> {
    tx.execute(
        "DELETE FROM items WHERE slot_id IN (SELECT id FROM slots WHERE board_id = ?1)",
        [board_id],
    )?;
    tx.execute("DELETE FROM slots WHERE board_id = ?1", [board_id])?;
    Ok(())
}

fn read_board_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BoardRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn board_from_row(row: BoardRow) -> Result<Board> {
    let (id, kind, brand_id, name, description, created_at, updated_at) = row;
    Ok(Board {
        id: BoardId::from_str(&id)?,
        kind: BoardKind::from_str(&kind)?,
        brand_id,
        name,
        description,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

fn slot_from_row(row: SlotRow) -> Result<Slot> {
    let (id, board_id, name, position, created_at) = row;
    Ok(Slot {
        id: SlotId::from_str(&id)?,
        board_id: BoardId::from_str(&board_id)?,
        name,
        position: parse_position(position)?,
        created_at: parse_datetime(&created_at)?,
    })
}

fn item_from_row(row: ItemRow) -> Result<Item> {
    let (id, slot_id, payload, position, created_at, updated_at) = row;
    let payload: ItemPayload = serde_json::from_str(&payload)?;
    Ok(Item {
        id: ItemId::from_str(&id)?,
        slot_id: SlotId::from_str(&slot_id)?,
        payload,
        position: parse_position(position)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

fn parse_position(position: i64) -> Result<u32> {
    u32::try_from(position)
        .map_err(|_| BrandboardError::StorageError(format!("Invalid stored position {}", position)))
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| BrandboardError::StorageError(format!("Invalid timestamp '{}': {}", value, e)))
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        self.lock()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    async fn save_board_tree(&self, tree: &BoardTree) -> Result<()> {
        if !self.is_initialized().await {
            return Err(BrandboardError::StoreNotInitialized);
        }
        self.save_sync(tree)
    }

    async fn load_board_tree(&self, id: &BoardId) -> Result<BoardTree> {
        self.load_sync(id)
    }

    async fn list_boards(&self) -> Result<Vec<Board>> {
        self.query_boards()
    }

    // SQLite's lower() only folds ASCII, so matching happens here
    async fn search_boards(&self, query: &str) -> Result<Vec<Board>> {
        Ok(self
            .query_boards()?
            .into_iter()
            .filter(|board| board.matches(query))
            .collect())
    }

    async fn delete_board_tree(&self, id: &BoardId) -> Result<()> {
        self.delete_sync(id)
    }

    async fn find_board_of_slot(&self, id: &SlotId) -> Result<BoardId> {
        self.owner_sync("SELECT board_id FROM slots WHERE id = ?1", id.to_string())?
            .ok_or_else(|| BrandboardError::SlotNotFound(id.to_string()))
    }

    async fn find_board_of_item(&self, id: &ItemId) -> Result<BoardId> {
        self.owner_sync(
            "SELECT s.board_id FROM items i JOIN slots s ON s.id = i.slot_id WHERE i.id = ?1",
            id.to_string(),
        )?
        .ok_or_else(|| BrandboardError::ItemNotFound(id.to_string()))
    }

    async fn is_initialized(&self) -> bool {
        let Ok(conn) = self.lock() else {
            return false;
        };
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'boards'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count > 0)
        .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoardDraft;

    fn palette() -> BoardTree {
        let board = Board::new(BoardDraft {
            kind: BoardKind::CiColors,
            brand_id: "acme".to_string(),
            name: "Palette".to_string(),
            description: Some("Corporate colors".to_string()),
        })
        .unwrap();
        BoardTree::new(board)
    }

    fn color(name: &str, hex: &str) -> ItemPayload {
        ItemPayload::Color {
            name: name.to_string(),
            hex: hex.to_string(),
        }
    }

    async fn storage() -> SqliteStorage {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.initialize().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_initialization() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert!(!storage.is_initialized().await);
        storage.initialize().await.unwrap();
        assert!(storage.is_initialized().await);
    }

    #[tokio::test]
    async fn test_tree_save_and_load() {
        let storage = storage().await;
        let mut tree = palette();
        let primary = tree.create_slot("Primary").unwrap().id;
        let accent = tree.create_slot("Accent").unwrap().id;
        let red = tree.create_item(&primary, color("Red", "#E30613")).unwrap().id;
        let ink = tree.create_item(&primary, color("Ink", "#111")).unwrap().id;
        tree.reorder_items(&primary, &[ink, red]).unwrap();
        storage.save_board_tree(&tree).await.unwrap();

        let loaded = storage.load_board_tree(&tree.board.id).await.unwrap();
        assert_eq!(loaded.board, tree.board);
        assert_eq!(loaded.slot_order(), vec![primary, accent]);
        assert_eq!(loaded.item_order(&primary), vec![ink, red]);
        assert_eq!(loaded.item(&red).unwrap().payload, color("Red", "#E30613"));
    }

    #[tokio::test]
    async fn test_resave_rewrites_positions() {
        let storage = storage().await;
        let mut tree = palette();
        let primary = tree.create_slot("Primary").unwrap().id;
        let accent = tree.create_slot("Accent").unwrap().id;
        let red = tree.create_item(&primary, color("Red", "#E30613")).unwrap().id;
        let ink = tree.create_item(&primary, color("Ink", "#111111")).unwrap().id;
        storage.save_board_tree(&tree).await.unwrap();

        tree.move_item(&red, &accent, 0).unwrap();
        tree.reorder_slots(&[accent, primary]).unwrap();
        storage.save_board_tree(&tree).await.unwrap();

        let loaded = storage.load_board_tree(&tree.board.id).await.unwrap();
        assert_eq!(loaded.slot_order(), vec![accent, primary]);
        assert_eq!(loaded.item_order(&accent), vec![red]);
        assert_eq!(loaded.item_order(&primary), vec![ink]);
        assert_eq!(loaded.item(&ink).unwrap().position, 0);
    }

    #[tokio::test]
    async fn test_owners_and_delete() {
        let storage = storage().await;
        let mut tree = palette();
        let primary = tree.create_slot("Primary").unwrap().id;
        let red = tree.create_item(&primary, color("Red", "#E30613")).unwrap().id;
        storage.save_board_tree(&tree).await.unwrap();

        assert_eq!(storage.find_board_of_slot(&primary).await.unwrap(), tree.board.id);
        assert_eq!(storage.find_board_of_item(&red).await.unwrap(), tree.board.id);

        storage.delete_board_tree(&tree.board.id).await.unwrap();
        assert!(matches!(
            storage.find_board_of_item(&red).await,
            Err(BrandboardError::ItemNotFound(_))
        ));
        assert!(matches!(
            storage.load_board_tree(&tree.board.id).await,
            Err(BrandboardError::BoardNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_search_boards() {
        let storage = storage().await;
        storage.save_board_tree(&palette()).await.unwrap();

        assert_eq!(storage.search_boards("CORPORATE").await.unwrap().len(), 1);
        assert_eq!(storage.search_boards("palette").await.unwrap().len(), 1);
        assert!(storage.search_boards("typography").await.unwrap().is_empty());
        assert_eq!(storage.list_boards().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let storage = storage().await;
        let board = Board::new(BoardDraft {
            kind: BoardKind::Content,
            brand_id: "acme".to_string(),
            name: "ÄRGER Kampagne".to_string(),
            description: None,
        })
        .unwrap();
        storage.save_board_tree(&BoardTree::new(board)).await.unwrap();
        storage.save_board_tree(&palette()).await.unwrap();

        let results = storage.search_boards("ärger").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "ÄRGER Kampagne");
    }
}
