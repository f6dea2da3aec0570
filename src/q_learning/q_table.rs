//! Q-table for tabular Q-learning

use std::{collections::HashMap, fmt::Debug, hash::Hash};

use crate::{Error, Result, mdp::StateSpace, policy::Policy};

/// `Q(s, a)` for every legal pair of the state space, starting at zero.
///
/// Each state keeps its actions in enumeration order so greedy selection can
/// break ties towards the first one. Terminal states are present with no
/// actions, which makes `max_q` of a terminal state zero while still
/// rejecting states outside the space.
#[derive(Debug, Clone)]
pub struct QTable<S, A> {
    q_values: HashMap<S, Vec<(A, f64)>>,
}

impl<S, A> QTable<S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Debug,
{
    pub fn new<M>(space: &M) -> Self
    where
        M: StateSpace<State = S, Action = A>,
    {
        let q_values = space
            .states()
            .iter()
            .map(|state| {
                let actions = space
                    .legal_actions(state)
                    .into_iter()
                    .map(|a| (a, 0.0))
                    .collect();
                (state.clone(), actions)
            })
            .collect();
        Self { q_values }
    }

    /// Actions and their values for `state`, in enumeration order
    pub fn actions(&self, state: &S) -> Result<&[(A, f64)]> {
        self.q_values
            .get(state)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::invalid_state(state))
    }

    pub fn get(&self, state: &S, action: &A) -> Result<f64> {
        self.actions(state)?
            .iter()
            .find(|(a, _)| a == action)
            .map(|&(_, q)| q)
            .ok_or_else(|| Error::invalid_action(state, action))
    }

    pub fn set(&mut self, state: &S, action: &A, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::NonFiniteValue {
                state: format!("{state:?}"),
                value,
            });
        }
        let entries = self
            .q_values
            .get_mut(state)
            .ok_or_else(|| Error::invalid_state(state))?;
        let slot = entries
            .iter_mut()
            .find(|(a, _)| a == action)
            .ok_or_else(|| Error::invalid_action(state, action))?;
        slot.1 = value;
        Ok(())
    }

    /// Largest Q-value in `state`, zero when it has no actions
    pub fn max_q(&self, state: &S) -> Result<f64> {
        let entries = self.actions(state)?;
        Ok(entries
            .iter()
            .map(|&(_, q)| q)
            .reduce(f64::max)
            .unwrap_or(0.0))
    }

    /// Highest-valued action in `state`; ties go to the first enumerated
    pub fn greedy_action(&self, state: &S) -> Result<&A> {
        let mut best: Option<&(A, f64)> = None;
        for entry in self.actions(state)? {
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(a, _)| a).ok_or_else(|| Error::NoActionsAvailable {
            state: format!("{state:?}"),
        })
    }

    /// Temporal-difference update
    ///
    /// Q(s,a) ← (1 − α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))
    ///
    /// Returns the absolute change to Q(s,a).
    pub fn update(
        &mut self,
        state: &S,
        action: &A,
        reward: f64,
        next_state: &S,
        learning_rate: f64,
        discount: f64,
    ) -> Result<f64> {
        let current = self.get(state, action)?;
        let target = reward + discount * self.max_q(next_state)?;
        let updated = (1.0 - learning_rate) * current + learning_rate * target;
        self.set(state, action, updated)?;
        Ok((updated - current).abs())
    }

    /// Greedy action in every state that has actions
    pub fn greedy_policy(&self) -> Result<Policy<S, A>> {
        let mut policy = Policy::new();
        for (state, entries) in &self.q_values {
            if entries.is_empty() {
                continue;
            }
            let action = self.greedy_action(state)?;
            policy.insert(state.clone(), action.clone());
        }
        Ok(policy)
    }

    /// Number of (state, action) pairs
    pub fn len(&self) -> usize {
        self.q_values.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.q_values.keys()
    }
}

impl<S: Eq + Hash, A: PartialEq> PartialEq for QTable<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.q_values == other.q_values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GameConfig,
        tictactoe::{BoardState, TicTacToeMdp},
    };

    fn table() -> QTable<BoardState, usize> {
        let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
        QTable::new(&mdp)
    }

    #[test]
    fn covers_every_legal_pair() {
        let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
        let table = QTable::new(&mdp);
        let pairs: usize = mdp
            .states()
            .iter()
            .map(|s| mdp.legal_actions(s).len())
            .sum();
        assert_eq!(table.len(), pairs);
        assert_eq!(table.get(&BoardState::new(), &4).unwrap(), 0.0);

        let finished = BoardState::from_label("XXXOO...._O").unwrap();
        assert!(table.actions(&finished).unwrap().is_empty());
        assert_eq!(table.max_q(&finished).unwrap(), 0.0);
    }

    #[test]
    fn rejects_unknown_pairs() {
        let mut table = table();
        let o_to_move = BoardState::from_label("X........_O").unwrap();
        assert!(matches!(
            table.get(&o_to_move, &1),
            Err(Error::InvalidStateQuery { .. })
        ));
        let occupied = BoardState::from_label("X...O...._X").unwrap();
        assert!(matches!(
            table.set(&occupied, &4, 1.0),
            Err(Error::InvalidAction { .. })
        ));
        assert!(table.set(&BoardState::new(), &0, f64::INFINITY).is_err());
    }

    #[test]
    fn greedy_ties_go_to_first_action() {
        let mut table = table();
        let start = BoardState::new();
        assert_eq!(*table.greedy_action(&start).unwrap(), 0);

        table.set(&start, &2, 1.5).unwrap();
        table.set(&start, &6, 1.5).unwrap();
        table.set(&start, &4, 0.5).unwrap();
        assert_eq!(*table.greedy_action(&start).unwrap(), 2);
        assert_eq!(table.max_q(&start).unwrap(), 1.5);
    }

    #[test]
    fn max_q_of_a_single_negative_value() {
        let mut table = table();
        let state = BoardState::from_label("XOXXOOOX._X").unwrap();
        table.set(&state, &8, -2.0).unwrap();
        assert_eq!(table.max_q(&state).unwrap(), -2.0);
    }

    #[test]
    fn temporal_difference_update() {
        let mut table = table();
        let start = BoardState::new();
        let next = BoardState::from_label("X...O...._X").unwrap();
        table.set(&next, &1, 1.0).unwrap();
        table.set(&next, &2, 2.0).unwrap();

        let change = table.update(&start, &0, 0.5, &next, 0.5, 0.9).unwrap();
        // 0.5 * 0 + 0.5 * (0.5 + 0.9 * 2.0) = 1.15
        assert!((table.get(&start, &0).unwrap() - 1.15).abs() < 1e-12);
        assert!((change - 1.15).abs() < 1e-12);

        // terminal successors contribute nothing beyond the reward
        let won = BoardState::from_label("XXXOO...._O").unwrap();
        let before = table.get(&next, &1).unwrap();
        table.update(&next, &1, 10.0, &won, 0.1, 0.9).unwrap();
        let expected = 0.9 * before + 0.1 * 10.0;
        assert!((table.get(&next, &1).unwrap() - expected).abs() < 1e-12);
    }
}
