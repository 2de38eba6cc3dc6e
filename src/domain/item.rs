use crate::domain::id::{ItemId, SlotId};
use crate::error::{BrandboardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content carried by an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemPayload {
    Card {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
    Keyword {
        term: String,
    },
    Asset {
        file_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media_type: Option<String>,
    },
    Color {
        name: String,
        hex: String,
    },
}

impl ItemPayload {
    /// Short label used in listings and search
    pub fn label(&self) -> &str {
        match self {
            Self::Card { title, .. } => title,
            Self::Keyword { term } => term,
            Self::Asset { file_name, .. } => file_name,
            Self::Color { name, .. } => name,
        }
    }

    /// Rejects blank required text and malformed colors
    pub fn validate(&self) -> Result<()> {
        if self.label().trim().is_empty() {
            return Err(BrandboardError::validation(match self {
                Self::Card { .. } => "Card title is required",
                Self::Keyword { .. } => "Keyword term is required",
                Self::Asset { .. } => "Asset file name is required",
                Self::Color { .. } => "Color name is required",
            }));
        }
        if let Self::Color { hex, .. } = self {
            if !is_hex_color(hex) {
                return Err(BrandboardError::validation(format!(
                    "Invalid color '{}', expected #RRGGBB or #RGB",
                    hex
                )));
            }
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// A card, keyword, asset or color placed in a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub slot_id: SlotId,
    pub payload: ItemPayload,
    pub position: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub(crate) fn new(slot_id: SlotId, payload: ItemPayload, position: u32) -> Result<Self> {
        payload.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: ItemId::new(),
            slot_id,
            payload,
            position,
            created_at: now,
            updated_at: now,
        })
    }

    pub(crate) fn set_payload(&mut self, payload: ItemPayload) -> Result<()> {
        payload.validate()?;
        self.payload = payload;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_validation() {
        let ok = ItemPayload::Color {
            name: "Brand Red".to_string(),
            hex: "#E30613".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = ItemPayload::Color {
            name: "White".to_string(),
            hex: "#fff".to_string(),
        };
        assert!(short.validate().is_ok());

        for hex in ["E30613", "#E3061", "#GGGGGG", ""] {
            let bad = ItemPayload::Color {
                name: "Broken".to_string(),
                hex: hex.to_string(),
            };
            assert!(bad.validate().is_err(), "{hex} should be rejected");
        }
    }

    #[test]
    fn test_blank_label_rejected() {
        let card = ItemPayload::Card {
            title: "  ".to_string(),
            body: Some("body".to_string()),
        };
        assert!(card.validate().is_err());
        assert!(Item::new(SlotId::new(), card, 0).is_err());
    }

    #[test]
    fn test_payload_serialization_is_tagged() {
        let payload = ItemPayload::Keyword {
            term: "eco packaging".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "keyword");
        assert_eq!(json["term"], "eco packaging");
    }
}
