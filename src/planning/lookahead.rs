//! One-step lookahead shared by value iteration and policy iteration

use crate::{
    Error, Result,
    mdp::{TransitionModel, check_distribution},
    planning::ValueTable,
    policy::Policy,
};

/// `Σ p · (r + γ·V(s'))` over the outcomes of `action` in `state`
pub fn expected_return<M: TransitionModel>(
    model: &M,
    values: &ValueTable<M::State>,
    discount: f64,
    state: &M::State,
    action: &M::Action,
) -> Result<f64> {
    let outcomes = model.transitions(state, action)?;
    check_distribution(state, &outcomes)?;

    let mut total = 0.0;
    for outcome in &outcomes {
        let next_value = values.get(&outcome.next_state)?;
        total += outcome.probability * (outcome.reward + discount * next_value);
    }
    Ok(total)
}

/// Highest-return legal action in `state` and its return.
///
/// Ties go to the action enumerated first.
///
/// # Errors
///
/// [`Error::NoActionsAvailable`] if a non-terminal state has no legal action.
pub fn best_action<M: TransitionModel>(
    model: &M,
    values: &ValueTable<M::State>,
    discount: f64,
    state: &M::State,
) -> Result<(M::Action, f64)> {
    let mut best: Option<(M::Action, f64)> = None;
    for action in model.legal_actions(state) {
        let value = expected_return(model, values, discount, state, &action)?;
        if best.as_ref().is_none_or(|(_, b)| value > *b) {
            best = Some((action, value));
        }
    }
    best.ok_or_else(|| Error::NoActionsAvailable {
        state: format!("{state:?}"),
    })
}

/// Greedy policy with respect to `values` over every non-terminal state
pub fn greedy_policy<M: TransitionModel>(
    model: &M,
    values: &ValueTable<M::State>,
    discount: f64,
) -> Result<Policy<M::State, M::Action>> {
    let mut policy = Policy::new();
    for state in model.states() {
        if model.is_terminal(state) {
            continue;
        }
        let (action, _) = best_action(model, values, discount, state)?;
        policy.insert(state.clone(), action);
    }
    Ok(policy)
}
