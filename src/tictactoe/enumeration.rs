//! Reachable-state enumeration

use std::collections::{HashSet, VecDeque};

use super::{BoardState, Player};

/// Every position reachable from the empty board where `agent` is to move or
/// the game is already over.
///
/// The walk is breadth first with moves expanded in cell order, so the result
/// is ordered by number of pieces and then by discovery. The empty board comes
/// first when `agent` is X.
pub fn reachable_states(agent: Player) -> Vec<BoardState> {
    let root = BoardState::new();
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    let mut states = Vec::new();

    while let Some(state) = queue.pop_front() {
        if state.is_terminal() || state.to_move == agent {
            states.push(state);
        }

        for mv in state.legal_moves() {
            let Ok(next) = state.make_move(mv) else {
                continue;
            };
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    states
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_reachable_positions() {
        // 5478 legal positions; keep those with X to move or finished
        let all = reachable_states(Player::X);
        assert_eq!(all[0], BoardState::new());
        assert!(all.iter().all(|s| s.is_terminal() || s.to_move == Player::X));

        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());

        let live = all.iter().filter(|s| !s.is_terminal()).count();
        assert_eq!(live, 2423);
        assert_eq!(all.len() - live, 958);
    }

    #[test]
    fn every_non_terminal_state_has_moves() {
        for state in reachable_states(Player::X) {
            if !state.is_terminal() {
                assert!(!state.legal_moves().is_empty());
            }
        }
    }
}
