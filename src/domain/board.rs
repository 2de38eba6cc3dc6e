use crate::domain::{id::BoardId, item::ItemPayload};
use crate::error::{BrandboardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Flavor of a brand board
///
/// Every flavor shares the same slot/item ordering model; the kind only
/// decides default slots and which item payloads are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardKind {
    Assets,
    CiColors,
    Content,
    Cta,
    Seo,
    Typography,
    Logo,
    Persona,
    ToneOfVoice,
}

impl BoardKind {
    pub const ALL: [BoardKind; 9] = [
        Self::Assets,
        Self::CiColors,
        Self::Content,
        Self::Cta,
        Self::Seo,
        Self::Typography,
        Self::Logo,
        Self::Persona,
        Self::ToneOfVoice,
    ];

    /// Stable key, identical to the serialized form
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::CiColors => "ci_colors",
            Self::Content => "content",
            Self::Cta => "cta",
            Self::Seo => "seo",
            Self::Typography => "typography",
            Self::Logo => "logo",
            Self::Persona => "persona",
            Self::ToneOfVoice => "tone_of_voice",
        }
    }

    /// Slots seeded on a freshly created board of this kind
    pub fn default_slot_names(&self) -> &'static [&'static str] {
        match self {
            Self::Assets => &["Images", "Videos", "Documents"],
            Self::CiColors => &["Primary", "Secondary", "Accent"],
            Self::Content => &["Ideas", "Drafts", "Published"],
            Self::Cta => &["Primary Actions", "Secondary Actions"],
            Self::Seo => &["Focus Keywords", "Secondary Keywords", "Negative Keywords"],
            Self::Typography => &["Headlines", "Body", "Accents"],
            Self::Logo => &["Primary Logo", "Variants"],
            Self::Persona => &["Personas"],
            Self::ToneOfVoice => &["Do", "Don't"],
        }
    }

    /// Checks if an item payload can live on a board of this kind
    pub fn accepts(&self, payload: &ItemPayload) -> bool {
        match payload {
            ItemPayload::Card { .. } => true,
            ItemPayload::Keyword { .. } => *self == Self::Seo,
            ItemPayload::Asset { .. } => {
                matches!(self, Self::Assets | Self::Logo | Self::Typography)
            }
            ItemPayload::Color { .. } => *self == Self::CiColors,
        }
    }
}

impl fmt::Display for BoardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assets => write!(f, "Assets"),
            Self::CiColors => write!(f, "CI Colors"),
            Self::Content => write!(f, "Content"),
            Self::Cta => write!(f, "CTA"),
            Self::Seo => write!(f, "SEO"),
            Self::Typography => write!(f, "Typography"),
            Self::Logo => write!(f, "Logo"),
            Self::Persona => write!(f, "Persona"),
            Self::ToneOfVoice => write!(f, "Tone of Voice"),
        }
    }
}

impl FromStr for BoardKind {
    type Err = BrandboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "assets" => Ok(Self::Assets),
            "ci_colors" => Ok(Self::CiColors),
            "content" => Ok(Self::Content),
            "cta" => Ok(Self::Cta),
            "seo" => Ok(Self::Seo),
            "typography" => Ok(Self::Typography),
            "logo" => Ok(Self::Logo),
            "persona" => Ok(Self::Persona),
            "tone_of_voice" => Ok(Self::ToneOfVoice),
            _ => Err(BrandboardError::validation(format!(
                "Unknown board kind '{}'",
                s
            ))),
        }
    }
}

/// Fields submitted when creating a board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDraft {
    pub kind: BoardKind,
    pub brand_id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Fields editable from a board's settings form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardSettings {
    pub name: String,
    pub description: Option<String>,
}

/// A brand board, the root of a slot/item hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub kind: BoardKind,
    pub brand_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Creates a board from a draft, validating the required name
    pub fn new(draft: BoardDraft) -> Result<Self> {
        let name = require_name(&draft.name)?;
        if draft.brand_id.trim().is_empty() {
            return Err(BrandboardError::validation("Board brand reference is required"));
        }
        let now = Utc::now();
        Ok(Self {
            id: BoardId::new(),
            kind: draft.kind,
            brand_id: draft.brand_id,
            name,
            description: normalize_description(draft.description),
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies the settings form
    pub fn apply_settings(&mut self, settings: BoardSettings) -> Result<()> {
        self.name = require_name(&settings.name)?;
        self.description = normalize_description(settings.description);
        self.touch();
        Ok(())
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Case-insensitive match on name or description
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self
                .description
                .as_ref()
                .map(|d| d.to_lowercase().contains(&query))
                .unwrap_or(false)
    }
}

pub(crate) fn require_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BrandboardError::validation("Name is required"));
    }
    Ok(trimmed.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> BoardDraft {
        BoardDraft {
            kind: BoardKind::Content,
            brand_id: "acme".to_string(),
            name: name.to_string(),
            description: Some("  Editorial calendar  ".to_string()),
        }
    }

    #[test]
    fn test_board_creation() {
        let board = Board::new(draft("  Blog  ")).unwrap();
        assert_eq!(board.name, "Blog");
        assert_eq!(board.description.as_deref(), Some("Editorial calendar"));
        assert_eq!(board.created_at, board.updated_at);
    }

    #[test]
    fn test_board_requires_name() {
        let err = Board::new(draft("   ")).unwrap_err();
        assert!(matches!(err, BrandboardError::Validation(_)));
    }

    #[test]
    fn test_apply_settings() {
        let mut board = Board::new(draft("Blog")).unwrap();
        board
            .apply_settings(BoardSettings {
                name: "Newsroom".to_string(),
                description: Some("".to_string()),
            })
            .unwrap();
        assert_eq!(board.name, "Newsroom");
        assert_eq!(board.description, None);

        assert!(board.apply_settings(BoardSettings::default()).is_err());
        assert_eq!(board.name, "Newsroom");
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(BoardKind::from_str("tone-of-voice").unwrap(), BoardKind::ToneOfVoice);
        assert_eq!(BoardKind::from_str("CI Colors").unwrap(), BoardKind::CiColors);
        assert!(BoardKind::from_str("kanban").is_err());

        for kind in BoardKind::ALL {
            assert_eq!(BoardKind::from_str(kind.as_key()).unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_key()));
        }
    }

    #[test]
    fn test_kind_accepts_payloads() {
        let keyword = ItemPayload::Keyword {
            term: "brand voice".to_string(),
        };
        assert!(BoardKind::Seo.accepts(&keyword));
        assert!(!BoardKind::Content.accepts(&keyword));

        let card = ItemPayload::Card {
            title: "Launch post".to_string(),
            body: None,
        };
        assert!(BoardKind::ALL.iter().all(|kind| kind.accepts(&card)));
    }

    #[test]
    fn test_every_kind_has_default_slots() {
        for kind in BoardKind::ALL {
            assert!(!kind.default_slot_names().is_empty(), "{kind} has no slots");
        }
    }
}
