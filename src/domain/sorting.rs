use crate::domain::board::Board;
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting board listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Kind,
    Created,
    Updated,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "kind" => Ok(SortField::Kind),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: name, kind, created, updated",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts boards in-place for a listing
///
/// Ties fall back to the board name so listings are stable between
/// requests.
///
/// # Examples
/// ```
/// use brandboard_core::domain::board::{Board, BoardDraft, BoardKind};
/// use brandboard_core::domain::sorting::{sort_boards, SortField, SortOrder};
///
/// let board = |name: &str| {
///     Board::new(BoardDraft {
///         kind: BoardKind::Seo,
///         brand_id: "acme".to_string(),
///         name: name.to_string(),
///         description: None,
///     })
///     .unwrap()
/// };
/// let mut boards = vec![board("Keywords"), board("Audit")];
///
/// sort_boards(&mut boards, SortField::Name, SortOrder::Ascending);
/// assert_eq!(boards[0].name, "Audit");
/// ```
pub fn sort_boards(boards: &mut [Board], field: SortField, order: SortOrder) {
    boards.sort_by(|a, b| {
        let cmp = match field {
            SortField::Name => compare_names(a, b),
            SortField::Kind => compare_kinds(a, b).then_with(|| compare_names(a, b)),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

fn compare_names(a: &Board, b: &Board) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Compare by kind display name, so "CI Colors" sorts before "Content"
fn compare_kinds(a: &Board, b: &Board) -> Ordering {
    a.kind.to_string().cmp(&b.kind.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{BoardDraft, BoardKind};

    fn board(kind: BoardKind, name: &str) -> Board {
        Board::new(BoardDraft {
            kind,
            brand_id: "acme".to_string(),
            name: name.to_string(),
            description: None,
        })
        .unwrap()
    }

    #[test]
    fn test_sort_by_name_case_insensitive() {
        let mut boards = vec![
            board(BoardKind::Content, "zebra"),
            board(BoardKind::Content, "Apple"),
            board(BoardKind::Content, "BANANA"),
        ];

        sort_boards(&mut boards, SortField::Name, SortOrder::Ascending);

        assert_eq!(boards[0].name, "Apple");
        assert_eq!(boards[1].name, "BANANA");
        assert_eq!(boards[2].name, "zebra");
    }

    #[test]
    fn test_sort_by_name_descending() {
        let mut boards = vec![
            board(BoardKind::Content, "Alpha"),
            board(BoardKind::Content, "Charlie"),
            board(BoardKind::Content, "Bravo"),
        ];

        sort_boards(&mut boards, SortField::Name, SortOrder::Descending);

        assert_eq!(boards[0].name, "Charlie");
        assert_eq!(boards[1].name, "Bravo");
        assert_eq!(boards[2].name, "Alpha");
    }

    #[test]
    fn test_sort_by_kind_then_name() {
        let mut boards = vec![
            board(BoardKind::Seo, "Keywords"),
            board(BoardKind::Content, "Blog"),
            board(BoardKind::CiColors, "Palette"),
            board(BoardKind::Content, "Announcements"),
        ];

        sort_boards(&mut boards, SortField::Kind, SortOrder::Ascending);

        let names: Vec<&str> = boards.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Palette", "Announcements", "Blog", "Keywords"]);
    }

    #[test]
    fn test_sort_by_created() {
        let mut first = board(BoardKind::Logo, "First");
        let second = board(BoardKind::Logo, "Second");
        first.created_at = second.created_at - chrono::Duration::days(1);

        let mut boards = vec![second, first];
        sort_boards(&mut boards, SortField::Created, SortOrder::Ascending);

        assert_eq!(boards[0].name, "First");
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!(SortField::from_str("Updated").unwrap(), SortField::Updated);
        assert_eq!(SortOrder::from_str("DESC").unwrap(), SortOrder::Descending);
        assert!(SortField::from_str("position").is_err());
        assert!(SortOrder::from_str("up").is_err());
    }
}
