mod common;

use common::{ChainEnvironment, ChainMdp, approx_eq};
use tttmdp::{
    BoardState, Error, GameConfig, OpponentKind, QLearningConfig, QLearningSolver,
    TicTacToeEnvironment, TicTacToeMdp, evaluate_policy, ports::Solver,
};

#[test]
fn learns_the_chain_from_samples() {
    let config = QLearningConfig::default()
        .with_discount(common::CHAIN_DISCOUNT)
        .with_epsilon(0.2)
        .with_episodes(5_000)
        .with_seed(1);
    let mut solver = QLearningSolver::new(ChainEnvironment::new(2), config).unwrap();
    let report = solver.train().unwrap();
    assert_eq!(report.iterations, 5_000);

    let table = solver.q_table();
    assert!(approx_eq(table.get(&1, &"finish").unwrap(), 20.0, 0.5));
    assert!(table.get(&1, &"back").unwrap() < table.get(&1, &"finish").unwrap());
    assert_eq!(table.max_q(&ChainMdp::TERMINAL).unwrap(), 0.0);

    let policy = solver.policy().unwrap();
    assert_eq!(*policy.action(&1).unwrap(), "finish");
    assert!(policy.action(&ChainMdp::TERMINAL).is_err());
}

// A run from the empty board may never visit this position, so its Q-values
// stay at zero there. Starting the episodes at it checks the win is learned.
#[test]
fn takes_an_immediate_win_from_a_custom_start() {
    let start = BoardState::from_label("XOO.X...._X").unwrap();
    let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
    let env = TicTacToeEnvironment::new(mdp, Some(21))
        .with_start_state(start)
        .unwrap();
    let config = QLearningConfig::default()
        .with_epsilon(0.2)
        .with_episodes(5_000)
        .with_seed(20);
    let mut solver = QLearningSolver::new(env, config).unwrap();
    solver.train().unwrap();

    assert_eq!(*solver.policy().unwrap().action(&start).unwrap(), 8);
    assert!(approx_eq(solver.q_table().get(&start, &8).unwrap(), 10.0, 1e-3));
}

#[test]
fn trained_agent_never_loses_to_a_random_opponent() {
    let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
    let config = QLearningConfig::default().with_seed(42);
    let mut solver = QLearningSolver::tictactoe(mdp, config).unwrap();
    let report = solver.train().unwrap();
    assert_eq!(report.iterations, 50_000);

    let policy = solver.policy().unwrap();
    assert!(policy.is_complete_for(solver.environment()));

    let summary = evaluate_policy(policy, OpponentKind::Uniform, 10_000, Some(3)).unwrap();
    // other seeds can leave a few losing lines under-explored
    assert_eq!(
        summary.losses, 0,
        "lost {} of {} games",
        summary.losses, summary.games
    );
    assert!(summary.win_rate() > summary.loss_rate());
}

#[test]
fn unknown_pairs_are_rejected() {
    let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
    let solver = QLearningSolver::tictactoe(mdp, QLearningConfig::default()).unwrap();
    let table = solver.q_table();

    let theirs = BoardState::from_label("X........_O").unwrap();
    assert!(matches!(
        table.get(&theirs, &0),
        Err(Error::InvalidStateQuery { .. })
    ));

    let occupied = BoardState::from_label("X...O...._X").unwrap();
    assert!(matches!(
        table.get(&occupied, &4),
        Err(Error::InvalidAction { .. })
    ));
    assert_eq!(table.get(&occupied, &8).unwrap(), 0.0);
}

#[test]
fn terminal_custom_start_is_refused() {
    let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
    let won = BoardState::from_label("XXXOO...._O").unwrap();
    let err = TicTacToeEnvironment::new(mdp, Some(0))
        .with_start_state(won)
        .unwrap_err();
    assert!(matches!(err, Error::TerminalState { .. }));
}

#[test]
fn invalid_learning_rate_is_rejected() {
    let config = QLearningConfig::default().with_learning_rate(0.0);
    let err = QLearningSolver::new(ChainEnvironment::new(0), config).err();
    assert!(matches!(err, Some(Error::InvalidConfiguration { .. })));
}
