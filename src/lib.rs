//! # Brandboard Core
//!
//! Ordered board model behind brand-management boards: asset, CI color,
//! content, CTA, SEO, typography, logo, persona and tone-of-voice boards.
//!
//! A board owns ordered slots, and each slot owns ordered items. Every
//! structural change renumbers the affected siblings densely and is
//! committed as one all-or-nothing write of the board, so readers never
//! see duplicate or missing positions. Rendering, authorization policy and
//! file uploads stay with the host application.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use auth::{Actor, AllowAll, Authorizer};
pub use config::BoardsConfig;
pub use domain::{
    board::{Board, BoardDraft, BoardKind, BoardSettings},
    id::{BoardId, ItemId, SlotId},
    item::{Item, ItemPayload},
    slot::Slot,
    tree::{BoardTree, BoardView, SlotView},
};
pub use error::{BrandboardError, ErrorKind, Result};
pub use service::BoardService;
pub use storage::Storage;
