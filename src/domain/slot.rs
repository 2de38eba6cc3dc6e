use crate::domain::{
    board::require_name,
    id::{BoardId, SlotId},
};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered column of a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub board_id: BoardId,
    pub name: String,
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

impl Slot {
    pub(crate) fn new(board_id: BoardId, name: &str, position: u32) -> Result<Self> {
        Ok(Self {
            id: SlotId::new(),
            board_id,
            name: require_name(name)?,
            position,
            created_at: Utc::now(),
        })
    }

    /// Renames the slot
    pub fn rename(&mut self, name: &str) -> Result<()> {
        self.name = require_name(name)?;
        Ok(())
    }
}
