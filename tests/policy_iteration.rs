mod common;

use common::{CHAIN_DISCOUNT, CHAIN_VALUES, ChainMdp, TOLERANCE, approx_eq};
use tttmdp::{
    BoardState, Error, GameConfig, OpponentKind, PolicyIterationConfig, PolicyIterationSolver,
    RewardConfig, TicTacToeMdp, ValueIterationConfig, ValueIterationSolver, ports::Solver,
};

fn game(rewards: RewardConfig, opponent: OpponentKind) -> TicTacToeMdp {
    TicTacToeMdp::new(
        GameConfig::default()
            .with_rewards(rewards)
            .with_opponent(opponent),
    )
    .unwrap()
}

#[test]
fn chain_converges_to_the_analytic_optimum() {
    for seed in 0..5 {
        let config = PolicyIterationConfig::default()
            .with_discount(CHAIN_DISCOUNT)
            .with_seed(seed);
        let mut solver = PolicyIterationSolver::new(ChainMdp::new(), config).unwrap();
        let report = solver.train().unwrap();
        assert!(report.converged);

        let policy = solver.policy().unwrap();
        assert_eq!(*policy.action(&0).unwrap(), "go", "seed {seed}");
        assert_eq!(*policy.action(&1).unwrap(), "finish", "seed {seed}");
        for (state, expected) in CHAIN_VALUES.iter().enumerate() {
            let value = solver.value(&(state as u8)).unwrap();
            assert!(approx_eq(value, *expected, TOLERANCE), "V({state}) = {value}");
        }
    }
}

#[test]
fn terminates_on_the_full_game() {
    let config = PolicyIterationConfig::default().with_seed(11);
    let mut solver =
        PolicyIterationSolver::new(game(RewardConfig::default(), OpponentKind::Uniform), config)
            .unwrap();
    let report = solver.train().unwrap();
    assert!(report.converged);
    // the agent moves at most five times, so improvements settle quickly
    assert!(report.iterations <= 20, "took {} rounds", report.iterations);
    assert_eq!(report.policy_size, solver.policy().unwrap().len());
}

#[test]
fn agrees_with_value_iteration_at_the_start() {
    let rewards = RewardConfig::new(10.0, -10.0, -0.1, 0.0);
    let start = BoardState::new();

    for opponent in [
        OpponentKind::Uniform,
        OpponentKind::Defensive,
        OpponentKind::Minimax,
    ] {
        let mut vi = ValueIterationSolver::new(
            game(rewards, opponent),
            ValueIterationConfig::default().with_discount(0.9),
        )
        .unwrap();
        vi.train().unwrap();

        let mut pi = PolicyIterationSolver::new(
            game(rewards, opponent),
            PolicyIterationConfig::default().with_discount(0.9).with_seed(5),
        )
        .unwrap();
        pi.train().unwrap();

        let vi_value = vi.value(&start).unwrap();
        let pi_value = pi.value(&start).unwrap();
        assert!(
            approx_eq(vi_value, pi_value, 1e-5),
            "{opponent}: value iteration {vi_value}, policy iteration {pi_value}"
        );
    }
}

#[test]
fn takes_an_immediate_win() {
    let config = PolicyIterationConfig::default().with_seed(2);
    let mut solver = PolicyIterationSolver::new(
        game(RewardConfig::new(10.0, -10.0, -0.1, 0.0), OpponentKind::Uniform),
        config,
    )
    .unwrap();
    solver.train().unwrap();

    let state = BoardState::from_label("XOO.X...._X").unwrap();
    assert_eq!(*solver.policy().unwrap().action(&state).unwrap(), 8);
}

#[test]
fn perfect_opponent_holds_the_game_to_a_draw() {
    let config = PolicyIterationConfig::default().with_seed(4);
    let mut solver =
        PolicyIterationSolver::new(game(RewardConfig::default(), OpponentKind::Minimax), config)
            .unwrap();
    solver.train().unwrap();
    assert!(solver.value(&BoardState::new()).unwrap().abs() < TOLERANCE);
}

#[test]
fn invalid_configuration_is_rejected_up_front() {
    let config = PolicyIterationConfig::default().with_delta(0.0);
    let err = PolicyIterationSolver::new(ChainMdp::new(), config).err();
    assert!(matches!(err, Some(Error::InvalidConfiguration { .. })));

    let config = PolicyIterationConfig::default().with_discount(1.5);
    assert!(PolicyIterationSolver::new(ChainMdp::new(), config).is_err());
}
