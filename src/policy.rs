//! Trained policies: a fixed action per non-terminal state

use std::{collections::HashMap, fmt::Debug, hash::Hash};

use crate::{Error, Result, mdp::StateSpace};

/// Mapping from state to the action to take there.
///
/// Terminal states never have an action. Looking up a state without one is
/// an error rather than a default move.
#[derive(Debug, Clone)]
pub struct Policy<S, A> {
    actions: HashMap<S, A>,
}

impl<S, A> Policy<S, A>
where
    S: Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    pub fn from_map(actions: HashMap<S, A>) -> Self {
        Self { actions }
    }

    /// Assign `action` to `state`, returning the previous assignment
    pub fn insert(&mut self, state: S, action: A) -> Option<A> {
        self.actions.insert(state, action)
    }

    /// The action for `state`.
    ///
    /// # Errors
    ///
    /// [`Error::PolicyUnavailable`] when no action has been assigned, which
    /// includes every terminal state.
    pub fn action(&self, state: &S) -> Result<&A> {
        self.actions
            .get(state)
            .ok_or_else(|| Error::PolicyUnavailable {
                state: format!("{state:?}"),
            })
    }

    pub fn get(&self, state: &S) -> Option<&A> {
        self.actions.get(state)
    }

    pub fn contains(&self, state: &S) -> bool {
        self.actions.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &A)> {
        self.actions.iter()
    }

    /// Whether every non-terminal state of `space` has an action that is
    /// legal there, and nothing else does
    pub fn is_complete_for<M>(&self, space: &M) -> bool
    where
        M: StateSpace<State = S, Action = A>,
        A: PartialEq,
    {
        let mut expected = 0;
        for state in space.states() {
            if space.is_terminal(state) {
                if self.contains(state) {
                    return false;
                }
                continue;
            }
            expected += 1;
            match self.get(state) {
                Some(action) if space.legal_actions(state).contains(action) => {}
                _ => return false,
            }
        }
        expected == self.len()
    }
}

impl<S: Eq + Hash, A: PartialEq> PartialEq for Policy<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.actions == other.actions
    }
}

impl<S, A> Default for Policy<S, A>
where
    S: Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> FromIterator<(S, A)> for Policy<S, A>
where
    S: Eq + Hash + Debug,
{
    fn from_iter<I: IntoIterator<Item = (S, A)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::BoardState;

    #[test]
    fn lookup_and_missing_states() {
        let start = BoardState::new();
        let mut policy = Policy::new();
        assert!(policy.is_empty());
        assert!(policy.insert(start, 4).is_none());
        assert_eq!(policy.insert(start, 0), Some(4));

        assert_eq!(*policy.action(&start).unwrap(), 0);
        assert_eq!(policy.len(), 1);

        let other = BoardState::from_label("X...O...._X").unwrap();
        let err = policy.action(&other).unwrap_err();
        assert!(matches!(err, Error::PolicyUnavailable { .. }));
        assert!(err.to_string().contains("X...O...._X"));
    }

    #[test]
    fn collects_from_pairs() {
        let policy: Policy<u8, char> = [(1, 'a'), (2, 'b')].into_iter().collect();
        assert_eq!(policy.len(), 2);
        assert_eq!(*policy.action(&2).unwrap(), 'b');
        assert!(policy.action(&3).is_err());
    }
}
