//! State-value table with sweep-at-a-time commits

use std::{collections::HashMap, fmt::Debug, hash::Hash};

use crate::{Error, Result};

/// `V(s)` for every enumerated state, starting at zero.
///
/// Values only change through [`ValueTable::commit`], which applies a whole
/// sweep's worth of updates at once. A sweep therefore reads the previous
/// sweep's values no matter what order states are visited in.
#[derive(Debug, Clone)]
pub struct ValueTable<S> {
    values: HashMap<S, f64>,
}

impl<S> ValueTable<S>
where
    S: Clone + Eq + Hash + Debug,
{
    pub fn new(states: &[S]) -> Self {
        Self {
            values: states.iter().map(|s| (s.clone(), 0.0)).collect(),
        }
    }

    /// # Errors
    ///
    /// [`Error::InvalidStateQuery`] if `state` was not enumerated.
    pub fn get(&self, state: &S) -> Result<f64> {
        self.values
            .get(state)
            .copied()
            .ok_or_else(|| Error::invalid_state(state))
    }

    /// Apply a batch of updates and return the largest absolute change.
    ///
    /// Nothing is written unless every update names a known state and a
    /// finite value.
    pub fn commit(&mut self, updates: Vec<(S, f64)>) -> Result<f64> {
        let mut max_change: f64 = 0.0;
        for (state, value) in &updates {
            let old = self.get(state)?;
            if !value.is_finite() {
                return Err(Error::NonFiniteValue {
                    state: format!("{state:?}"),
                    value: *value,
                });
            }
            max_change = max_change.max((value - old).abs());
        }

        for (state, value) in updates {
            self.values.insert(state, value);
        }
        Ok(max_change)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, f64)> {
        self.values.iter().map(|(s, &v)| (s, v))
    }
}

impl<S: Eq + Hash> PartialEq for ValueTable<S> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}
