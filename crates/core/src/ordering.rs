//! Position ordering within a scope.
//!
//! Pure planning functions: given a snapshot of sibling slots, decide which
//! position a new row gets, which two rows a move swaps, and which rows the
//! compactor rewrites. Storage adapters apply the resulting plans atomically
//! and conditionally on the positions they were planned against.

use std::fmt;

use crate::entity::Scope;
use crate::error::CoreError;
use crate::types::{DbId, Position};

/// Direction of a single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards position 0.
    Up,
    /// Towards the last position.
    Down,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sibling's identity and current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: DbId,
    pub position: Position,
}

/// Size summary of a scope, as read by the Position Assigner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeStats {
    pub count: i64,
    pub max_position: Option<Position>,
}

/// Two siblings exchanging positions.
///
/// After the swap `moving` holds `neighbor.position` and `neighbor` holds
/// `moving.position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSwap {
    pub moving: Slot,
    pub neighbor: Slot,
}

/// A single position rewrite produced by the compactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionChange {
    pub id: DbId,
    pub from: Position,
    pub to: Position,
}

/// Why a move could not be planned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("row {0} is not part of the scope")]
    NotInScope(DbId),

    #[error("row {id} cannot move {direction} any further")]
    AtEdge { id: DbId, direction: Direction },

    #[error("position {position} is held by more than one sibling; update positions first")]
    DuplicatePosition { position: Position },
}

/* --------------------------------------------------------------------------
Position Assigner
-------------------------------------------------------------------------- */

/// Position for a row appended to a scope.
///
/// Equals the sibling count while the scope is dense. If a removal left a
/// gap (count is then already taken) the row goes after the last sibling.
/// `position == count` therefore only holds for dense scopes; after
/// [`compact`] it holds again.
pub fn next_position(stats: ScopeStats) -> Result<Position, CoreError> {
    let count = Position::try_from(stats.count)
        .map_err(|_| CoreError::Internal(format!("scope holds {} rows", stats.count)))?;
    match stats.max_position {
        Some(max) if max >= count => max
            .checked_add(1)
            .ok_or_else(|| CoreError::Internal("position overflow".to_string())),
        _ => Ok(count),
    }
}

/* --------------------------------------------------------------------------
Swap-Based Mover
-------------------------------------------------------------------------- */

/// Plan a move of `id` one step in `direction` among `siblings`.
///
/// The neighbour is the sibling with the next-lower (up) or next-higher
/// (down) position, so gaps left by removals are skipped over.
pub fn plan_swap(
    siblings: &[Slot],
    id: DbId,
    direction: Direction,
) -> Result<PositionSwap, MoveError> {
    if let Some(position) = first_duplicate_position(siblings) {
        return Err(MoveError::DuplicatePosition { position });
    }

    let moving = *siblings
        .iter()
        .find(|s| s.id == id)
        .ok_or(MoveError::NotInScope(id))?;

    let neighbor = match direction {
        Direction::Up => siblings
            .iter()
            .filter(|s| s.position < moving.position)
            .max_by_key(|s| s.position),
        Direction::Down => siblings
            .iter()
            .filter(|s| s.position > moving.position)
            .min_by_key(|s| s.position),
    };

    match neighbor {
        Some(neighbor) => Ok(PositionSwap {
            moving,
            neighbor: *neighbor,
        }),
        None => Err(MoveError::AtEdge { id, direction }),
    }
}

fn first_duplicate_position(siblings: &[Slot]) -> Option<Position> {
    let mut positions: Vec<Position> = siblings.iter().map(|s| s.position).collect();
    positions.sort_unstable();
    positions.windows(2).find(|w| w[0] == w[1]).map(|w| w[0])
}

/* --------------------------------------------------------------------------
Position Compactor
-------------------------------------------------------------------------- */

/// Sort slots into display order: position, then id.
pub fn sort_display_order(slots: &mut [Slot]) {
    slots.sort_by_key(|s| (s.position, s.id));
}

/// Rewrites that make one scope dense and zero-based.
///
/// `slots` must already be in display order. Rows already at their index
/// produce no change.
pub fn compact(slots: &[Slot]) -> Result<Vec<PositionChange>, CoreError> {
    let mut changes = Vec::new();
    for (index, slot) in slots.iter().enumerate() {
        let to = Position::try_from(index)
            .map_err(|_| CoreError::Internal(format!("scope holds {} rows", slots.len())))?;
        if slot.position != to {
            changes.push(PositionChange {
                id: slot.id,
                from: slot.position,
                to,
            });
        }
    }
    Ok(changes)
}

/// Compact every scope of a table.
///
/// Input rows may arrive in any order; they are grouped per scope and put in
/// display order before compaction.
pub fn compact_scopes(rows: Vec<(Scope, Slot)>) -> Result<Vec<PositionChange>, CoreError> {
    let mut rows = rows;
    rows.sort_by_key(|(scope, slot)| (*scope, slot.position, slot.id));

    let mut changes = Vec::new();
    for group in rows.chunk_by(|a, b| a.0 == b.0) {
        let slots: Vec<Slot> = group.iter().map(|(_, slot)| *slot).collect();
        changes.extend(compact(&slots)?);
    }
    Ok(changes)
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn slots(pairs: &[(DbId, Position)]) -> Vec<Slot> {
        pairs
            .iter()
            .map(|&(id, position)| Slot { id, position })
            .collect()
    }

    // -- next_position --

    #[test]
    fn empty_scope_starts_at_zero() {
        assert_eq!(next_position(ScopeStats::default()).unwrap(), 0);
    }

    #[test]
    fn dense_scope_appends_at_count() {
        let stats = ScopeStats {
            count: 3,
            max_position: Some(2),
        };
        assert_eq!(next_position(stats).unwrap(), 3);
    }

    #[test]
    fn scope_with_gap_appends_after_last() {
        // Rows at 0 and 2 after the middle one was removed.
        let stats = ScopeStats {
            count: 2,
            max_position: Some(2),
        };
        assert_eq!(next_position(stats).unwrap(), 3);
    }

    #[test]
    fn trailing_gap_still_uses_count() {
        let stats = ScopeStats {
            count: 2,
            max_position: Some(1),
        };
        assert_eq!(next_position(stats).unwrap(), 2);
    }

    // -- plan_swap --

    #[test]
    fn move_up_swaps_with_previous_sibling() {
        let s = slots(&[(10, 0), (11, 1), (12, 2)]);
        let swap = plan_swap(&s, 12, Direction::Up).unwrap();
        assert_eq!(swap.moving, Slot { id: 12, position: 2 });
        assert_eq!(swap.neighbor, Slot { id: 11, position: 1 });
    }

    #[test]
    fn move_down_swaps_with_next_sibling() {
        let s = slots(&[(10, 0), (11, 1), (12, 2)]);
        let swap = plan_swap(&s, 10, Direction::Down).unwrap();
        assert_eq!(swap.neighbor, Slot { id: 11, position: 1 });
    }

    #[test]
    fn move_skips_over_gaps() {
        let s = slots(&[(10, 0), (12, 5)]);
        let swap = plan_swap(&s, 12, Direction::Up).unwrap();
        assert_eq!(swap.neighbor.id, 10);
    }

    #[test]
    fn first_sibling_cannot_move_up() {
        let s = slots(&[(10, 0), (11, 1)]);
        assert_matches!(
            plan_swap(&s, 10, Direction::Up),
            Err(MoveError::AtEdge {
                id: 10,
                direction: Direction::Up
            })
        );
    }

    #[test]
    fn last_sibling_cannot_move_down() {
        let s = slots(&[(10, 0), (11, 1)]);
        assert_matches!(
            plan_swap(&s, 11, Direction::Down),
            Err(MoveError::AtEdge { id: 11, .. })
        );
    }

    #[test]
    fn duplicate_positions_fail_loudly() {
        let s = slots(&[(10, 0), (11, 1), (12, 1)]);
        assert_matches!(
            plan_swap(&s, 10, Direction::Down),
            Err(MoveError::DuplicatePosition { position: 1 })
        );
    }

    #[test]
    fn unknown_row_is_not_in_scope() {
        let s = slots(&[(10, 0)]);
        assert_matches!(
            plan_swap(&s, 99, Direction::Up),
            Err(MoveError::NotInScope(99))
        );
    }

    #[test]
    fn edge_error_message_names_edge() {
        let err = MoveError::AtEdge {
            id: 4,
            direction: Direction::Down,
        };
        assert_eq!(err.to_string(), "row 4 cannot move down any further");
    }

    // -- compact --

    #[test]
    fn dense_scope_needs_no_changes() {
        let s = slots(&[(1, 0), (3, 1), (2, 2)]);
        assert!(compact(&s).unwrap().is_empty());
    }

    #[test]
    fn gaps_are_closed_in_display_order() {
        let mut s = slots(&[(1, 0), (2, 4), (3, 2)]);
        sort_display_order(&mut s);
        let changes = compact(&s).unwrap();
        assert_eq!(
            changes,
            vec![
                PositionChange { id: 3, from: 2, to: 1 },
                PositionChange { id: 2, from: 4, to: 2 },
            ]
        );
    }

    #[test]
    fn duplicates_are_broken_by_id() {
        let mut s = slots(&[(7, 1), (5, 1), (9, 0)]);
        sort_display_order(&mut s);
        let changes = compact(&s).unwrap();
        assert_eq!(changes, vec![PositionChange { id: 7, from: 1, to: 2 }]);
    }

    #[test]
    fn compact_scopes_handles_each_scope_independently() {
        let rows = vec![
            (Scope::Parent(2), Slot { id: 20, position: 3 }),
            (Scope::Parent(1), Slot { id: 10, position: 0 }),
            (Scope::Parent(1), Slot { id: 11, position: 2 }),
            (Scope::Parent(2), Slot { id: 21, position: 1 }),
        ];
        let changes = compact_scopes(rows).unwrap();
        assert_eq!(
            changes,
            vec![
                PositionChange { id: 11, from: 2, to: 1 },
                PositionChange { id: 21, from: 1, to: 0 },
                PositionChange { id: 20, from: 3, to: 1 },
            ]
        );
    }

    #[test]
    fn compacting_twice_is_idempotent() {
        let rows = vec![
            (Scope::Global, Slot { id: 1, position: 5 }),
            (Scope::Global, Slot { id: 2, position: 9 }),
        ];
        let changes = compact_scopes(rows).unwrap();
        let rewritten: Vec<_> = changes
            .iter()
            .map(|c| (Scope::Global, Slot { id: c.id, position: c.to }))
            .collect();
        assert!(compact_scopes(rewritten).unwrap().is_empty());
    }
}
