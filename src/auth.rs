use crate::domain::Board;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The user (or integration) issuing a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Authorization collaborator consulted before every mutation
///
/// Deletions are gated by [`Authorizer::can_delete`]; every other change by
/// [`Authorizer::can_update`]. Policies live with the host application.
pub trait Authorizer: Send + Sync {
    fn can_update(&self, actor: &Actor, board: &Board) -> bool;

    fn can_delete(&self, actor: &Actor, board: &Board) -> bool;
}

/// Grants everything, for single-user setups and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn can_update(&self, _actor: &Actor, _board: &Board) -> bool {
        true
    }

    fn can_delete(&self, _actor: &Actor, _board: &Board) -> bool {
        true
    }
}
