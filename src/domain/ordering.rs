//! Dense position bookkeeping shared by slots and items
//!
//! Every structural change renumbers a sibling group to exactly `0..n`.
//! Groups are small (bounded by what a board can display), so the O(n)
//! rewrite per change is cheap and no gap or fractional indexing is kept.

use crate::error::{BrandboardError, Result};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

/// Checks that a submitted order names exactly the current members
///
/// Any omission, addition or duplicate means the client worked from stale
/// state and must re-fetch before resubmitting.
pub fn validate_membership<T>(group: &str, current: &[T], requested: &[T]) -> Result<()>
where
    T: Eq + Hash + Display,
{
    let mut seen = HashSet::with_capacity(requested.len());
    let duplicates: Vec<String> = requested
        .iter()
        .filter(|id| !seen.insert(*id))
        .map(|id| id.to_string())
        .collect();
    if !duplicates.is_empty() {
        return Err(BrandboardError::validation(format!(
            "Reorder of {} lists duplicates: {}",
            group,
            duplicates.join(", ")
        )));
    }

    let current_set: HashSet<&T> = current.iter().collect();
    let missing: Vec<String> = current
        .iter()
        .filter(|id| !seen.contains(id))
        .map(|id| id.to_string())
        .collect();
    let unexpected: Vec<String> = requested
        .iter()
        .filter(|id| !current_set.contains(id))
        .map(|id| id.to_string())
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing {}", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        problems.push(format!("unknown {}", unexpected.join(", ")));
    }
    Err(BrandboardError::validation(format!(
        "Reorder of {} does not match current members ({})",
        group,
        problems.join("; ")
    )))
}

/// Maps each id to its index in `ordered`
pub fn renumber<T>(ordered: &[T]) -> HashMap<T, u32>
where
    T: Eq + Hash + Copy,
{
    ordered
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as u32))
        .collect()
}

/// Position for an entity appended to a group
pub fn next_position(positions: impl IntoIterator<Item = u32>) -> u32 {
    positions.into_iter().max().map(|max| max + 1).unwrap_or(0)
}

/// Inserts `value` at `index`, appending when the index is past the end
///
/// Returns the index actually used.
pub fn insert_clamped<T>(ordered: &mut Vec<T>, index: usize, value: T) -> usize {
    let index = index.min(ordered.len());
    ordered.insert(index, value);
    index
}

/// True when the positions are exactly `0..n` in some order
pub fn is_dense(positions: impl IntoIterator<Item = u32>) -> bool {
    let mut positions: Vec<u32> = positions.into_iter().collect();
    positions.sort_unstable();
    positions
        .iter()
        .enumerate()
        .all(|(index, position)| *position == index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_exact_match() {
        assert!(validate_membership("slots", &[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(validate_membership::<u32>("slots", &[], &[]).is_ok());
    }

    #[test]
    fn test_membership_missing() {
        let err = validate_membership("slots", &[1, 2, 3], &[3, 1]).unwrap_err();
        assert!(err.to_string().contains("missing 2"), "{err}");
    }

    #[test]
    fn test_membership_unknown() {
        let err = validate_membership("items", &[1, 2], &[1, 2, 9]).unwrap_err();
        assert!(err.to_string().contains("unknown 9"), "{err}");
    }

    #[test]
    fn test_membership_duplicates() {
        let err = validate_membership("items", &[1, 2], &[1, 1]).unwrap_err();
        assert!(err.to_string().contains("duplicates: 1"), "{err}");
    }

    #[test]
    fn test_renumber() {
        let positions = renumber(&['c', 'a', 'b']);
        assert_eq!(positions[&'c'], 0);
        assert_eq!(positions[&'a'], 1);
        assert_eq!(positions[&'b'], 2);
    }

    #[test]
    fn test_next_position() {
        assert_eq!(next_position([]), 0);
        assert_eq!(next_position([0, 1, 2]), 3);
        assert_eq!(next_position([4, 1]), 5);
    }

    #[test]
    fn test_insert_clamped() {
        let mut ordered = vec!['a', 'b'];
        assert_eq!(insert_clamped(&mut ordered, 0, 'x'), 0);
        assert_eq!(insert_clamped(&mut ordered, 99, 'y'), 3);
        assert_eq!(ordered, vec!['x', 'a', 'b', 'y']);
    }

    #[test]
    fn test_is_dense() {
        assert!(is_dense([]));
        assert!(is_dense([2, 0, 1]));
        assert!(!is_dense([0, 2]));
        assert!(!is_dense([0, 0, 1]));
    }
}
