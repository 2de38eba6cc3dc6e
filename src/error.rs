use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrandboardError>;

/// Coarse classification of a [`BrandboardError`]
///
/// Callers branch on this to decide whether to re-fetch state and retry
/// (`Validation`, `NotFound`) or to surface the refusal to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Authorization,
    Conflict,
    Storage,
    Configuration,
}

#[derive(Debug, Error)]
pub enum BrandboardError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Actor {actor} is not allowed to {action} board {board}")]
    Unauthorized {
        actor: String,
        action: String,
        board: String,
    },

    #[error("Item {item} cannot move to slot {slot} on another board")]
    CrossBoardMove { item: String, slot: String },

    #[error("Store not initialized")]
    StoreNotInitialized,

    #[error("Corrupted board {board}: {reason}")]
    CorruptedBoard { board: String, reason: String },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParseError(#[from] toml::de::Error),
}

impl BrandboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::BoardNotFound(_) | Self::SlotNotFound(_) | Self::ItemNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::CrossBoardMove { .. } => ErrorKind::Conflict,
            Self::ConfigError(_) | Self::ConfigParseError(_) => ErrorKind::Configuration,
            Self::StoreNotInitialized
            | Self::CorruptedBoard { .. }
            | Self::StorageError(_)
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::DatabaseError(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(feature = "sqlite-storage")]
impl From<rusqlite::Error> for BrandboardError {
    fn from(err: rusqlite::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            BrandboardError::validation("stale order").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            BrandboardError::ItemNotFound("x".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            BrandboardError::CrossBoardMove {
                item: "a".to_string(),
                slot: "b".to_string()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            BrandboardError::StoreNotInitialized.kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_unauthorized_message() {
        let err = BrandboardError::Unauthorized {
            actor: "ana".to_string(),
            action: "delete".to_string(),
            board: "b1".to_string(),
        };
        assert_eq!(err.to_string(), "Actor ana is not allowed to delete board b1");
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }
}
