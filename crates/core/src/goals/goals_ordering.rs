//! Pure ordering rules for goal priorities.
//!
//! Stores call these inside their write transaction so the dense `1..=N`
//! invariant is checked against the state actually being written.

use std::collections::HashSet;

use super::goals_model::MoveDirection;
use crate::errors::{Error, Result};

/// Checks that `requested` contains every id of `existing` exactly once and
/// nothing else.
pub fn validate_permutation(existing: &[i64], requested: &[i64]) -> Result<()> {
    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !seen.insert(*id) {
            return Err(Error::InvalidOrdering(format!(
                "Goal {} appears more than once",
                id
            )));
        }
    }

    let existing_set: HashSet<i64> = existing.iter().copied().collect();
    if let Some(extra) = requested.iter().find(|id| !existing_set.contains(*id)) {
        return Err(Error::InvalidOrdering(format!("Goal {} does not exist", extra)));
    }
    if let Some(missing) = existing.iter().find(|id| !seen.contains(*id)) {
        return Err(Error::InvalidOrdering(format!(
            "Goal {} is missing from the ordering",
            missing
        )));
    }
    Ok(())
}

/// Pairs every id with its 1-based position.
pub fn assign_orders(ordered_ids: &[i64]) -> Vec<(i64, i32)> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i32 + 1))
        .collect()
}

/// Returns the ordering after swapping `goal_id` with its neighbour.
///
/// `ordered_ids` must be sorted by current order. Returns `Ok(None)` when the
/// goal is already first (moving up) or last (moving down).
pub fn moved_ordering(
    ordered_ids: &[i64],
    goal_id: i64,
    direction: MoveDirection,
) -> Result<Option<Vec<i64>>> {
    let position = ordered_ids
        .iter()
        .position(|id| *id == goal_id)
        .ok_or_else(|| Error::not_found("Goal", goal_id))?;

    let neighbour = match direction {
        MoveDirection::Up if position > 0 => position - 1,
        MoveDirection::Down if position + 1 < ordered_ids.len() => position + 1,
        _ => return Ok(None),
    };

    let mut reordered = ordered_ids.to_vec();
    reordered.swap(position, neighbour);
    Ok(Some(reordered))
}

/// New orders for the goals that shift down after the goal at
/// `deleted_order` is removed. Goals below it are not returned.
pub fn compacted_orders(remaining: &[(i64, i32)], deleted_order: i32) -> Vec<(i64, i32)> {
    remaining
        .iter()
        .filter(|(_, order)| *order > deleted_order)
        .map(|(id, order)| (*id, order - 1))
        .collect()
}

/// True when `orders` is exactly `{1..=len}`.
pub fn is_dense(orders: &[i32]) -> bool {
    let mut sorted = orders.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, order)| *order == index as i32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_accepts_any_order_of_the_same_ids() {
        assert!(validate_permutation(&[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(validate_permutation(&[], &[]).is_ok());
    }

    #[test]
    fn permutation_rejects_missing_extra_and_duplicate_ids() {
        let missing = validate_permutation(&[1, 2, 3], &[1, 2]).unwrap_err();
        assert!(matches!(missing, Error::InvalidOrdering(_)));

        let extra = validate_permutation(&[1, 2], &[1, 2, 9]).unwrap_err();
        assert!(matches!(extra, Error::InvalidOrdering(_)));

        let duplicate = validate_permutation(&[1, 2, 3], &[1, 1, 2, 3]).unwrap_err();
        assert!(matches!(duplicate, Error::InvalidOrdering(_)));

        // Same length, but one id swapped for a duplicate.
        let swapped = validate_permutation(&[1, 2, 3], &[1, 2, 2]).unwrap_err();
        assert!(matches!(swapped, Error::InvalidOrdering(_)));
    }

    #[test]
    fn move_up_swaps_with_previous() {
        let moved = moved_ordering(&[10, 20, 30], 30, MoveDirection::Up).unwrap();
        assert_eq!(moved, Some(vec![10, 30, 20]));
    }

    #[test]
    fn move_down_swaps_with_next() {
        let moved = moved_ordering(&[10, 20, 30], 10, MoveDirection::Down).unwrap();
        assert_eq!(moved, Some(vec![20, 10, 30]));
    }

    #[test]
    fn move_past_the_edge_is_a_noop() {
        assert_eq!(moved_ordering(&[10, 20], 10, MoveDirection::Up).unwrap(), None);
        assert_eq!(moved_ordering(&[10, 20], 20, MoveDirection::Down).unwrap(), None);
        assert_eq!(moved_ordering(&[10], 10, MoveDirection::Down).unwrap(), None);
    }

    #[test]
    fn move_of_unknown_goal_is_not_found() {
        let err = moved_ordering(&[10, 20], 99, MoveDirection::Up).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn compaction_shifts_only_goals_after_the_deleted_one() {
        let remaining = [(1, 1), (3, 3), (4, 4)];
        assert_eq!(compacted_orders(&remaining, 2), vec![(3, 2), (4, 3)]);
    }

    #[test]
    fn dense_check() {
        assert!(is_dense(&[2, 1, 3]));
        assert!(is_dense(&[]));
        assert!(!is_dense(&[1, 3]));
        assert!(!is_dense(&[1, 1, 2]));
    }

    #[test]
    fn assign_orders_is_one_based() {
        assert_eq!(assign_orders(&[7, 5]), vec![(7, 1), (5, 2)]);
    }
}
