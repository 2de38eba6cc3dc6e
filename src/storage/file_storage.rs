use crate::{
    config::BoardsConfig,
    domain::{tree::TreeParts, Board, BoardId, BoardTree, ItemId, SlotId},
    error::{BrandboardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::{
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::warn;

/// File-based storage: one JSON document per board
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const STORE_DIR: &'static str = ".brandboard";
    const BOARDS_DIR: &'static str = "boards";
    const CONFIG_FILE: &'static str = "config.toml";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::STORE_DIR),
        }
    }

    fn boards_dir(&self) -> PathBuf {
        self.root_path.join(Self::BOARDS_DIR)
    }

    fn config_file(&self) -> PathBuf {
        self.root_path.join(Self::CONFIG_FILE)
    }

    fn board_file(&self, id: &BoardId) -> PathBuf {
        self.boards_dir().join(format!("{}.json", id))
    }

    /// Loads `config.toml` from the store directory
    pub async fn load_config(&self) -> Result<BoardsConfig> {
        BoardsConfig::load(self.config_file()).await
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn list_board_ids(&self) -> Result<Vec<BoardId>> {
        let boards_dir = self.boards_dir();

        if !boards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&boards_dir).await?;
        let mut ids: Vec<BoardId> = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if let Ok(id) = BoardId::from_str(stem) {
                        ids.push(id);
                    }
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Loads every readable board
    ///
    /// A document that fails to load is logged and skipped so one damaged
    /// board does not block lookups on the others.
    async fn load_all(&self) -> Result<Vec<BoardTree>> {
        let mut trees = Vec::new();
        for id in self.list_board_ids().await? {
            match self.load_board_tree(&id).await {
                Ok(tree) => trees.push(tree),
                Err(err) => warn!(board = %id, error = %err, "skipping unreadable board"),
            }
        }
        Ok(trees)
    }
}

/// Writes through a synced temp file in the target directory, then renames
/// it over `path`
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.boards_dir()).await?;

        if !self.config_file().exists() {
            let config = BoardsConfig::default().to_toml_string()?;
            fs::write(self.config_file(), config).await?;
        }

        let gitignore_path = self.root_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "# Interrupted writes\n.tmp*\n").await?;
        }

        Ok(())
    }

    async fn save_board_tree(&self, tree: &BoardTree) -> Result<()> {
        if !self.is_initialized().await {
            return Err(BrandboardError::StoreNotInitialized);
        }

        let json = serde_json::to_string_pretty(tree)?;
        let file_path = self.board_file(&tree.board.id);

        tokio::task::spawn_blocking(move || write_atomically(&file_path, json.as_bytes()))
            .await
            .map_err(|e| BrandboardError::StorageError(format!("Board write task failed: {}", e)))??;
        Ok(())
    }

    async fn load_board_tree(&self, id: &BoardId) -> Result<BoardTree> {
        let file_path = self.board_file(id);

        if !file_path.exists() {
            return Err(BrandboardError::BoardNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&file_path).await?;
        let parts: TreeParts = serde_json::from_str(&contents)?;
        if parts.board.id != *id {
            return Err(BrandboardError::CorruptedBoard {
                board: id.to_string(),
                reason: format!("document holds board {}", parts.board.id),
            });
        }

        BoardTree::from_parts(parts.board, parts.slots, parts.items)
    }

    async fn list_boards(&self) -> Result<Vec<Board>> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .map(|tree| tree.board)
            .collect())
    }

    async fn search_boards(&self, query: &str) -> Result<Vec<Board>> {
        Ok(self
            .list_boards()
            .await?
            .into_iter()
            .filter(|board| board.matches(query))
            .collect())
    }

    async fn delete_board_tree(&self, id: &BoardId) -> Result<()> {
        let file_path = self.board_file(id);

        if !file_path.exists() {
            return Err(BrandboardError::BoardNotFound(id.to_string()));
        }

        fs::remove_file(file_path).await?;
        Ok(())
    }

    async fn find_board_of_slot(&self, id: &SlotId) -> Result<BoardId> {
        self.load_all()
            .await?
            .into_iter()
            .find(|tree| tree.slot(id).is_some())
            .map(|tree| tree.board.id)
            .ok_or_else(|| BrandboardError::SlotNotFound(id.to_string()))
    }

    async fn find_board_of_item(&self, id: &ItemId) -> Result<BoardId> {
        self.load_all()
            .await?
            .into_iter()
            .find(|tree| tree.item(id).is_some())
            .map(|tree| tree.board.id)
            .ok_or_else(|| BrandboardError::ItemNotFound(id.to_string()))
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.boards_dir().exists()
    }
}
