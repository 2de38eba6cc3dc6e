use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = crate::error::BrandboardError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|_| {
                    crate::error::BrandboardError::Validation(format!(
                        "Invalid {} id: {}",
                        $label, s
                    ))
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a board
    BoardId,
    "board"
);
entity_id!(
    /// Unique identifier for a slot within a board
    SlotId,
    "slot"
);
entity_id!(
    /// Unique identifier for an item within a slot
    ItemId,
    "item"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parsing() {
        let id = SlotId::new();
        let parsed = SlotId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);

        let err = ItemId::from_str("not-a-uuid").unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Invalid item id: not-a-uuid");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(BoardId::new(), BoardId::new());
    }
}
