use tempfile::TempDir;
use tttmdp::{
    Algorithm, BoardState, GameConfig, OpponentKind, PolicyMetadata, RewardConfig, SavedPolicy,
    StoppingRule, TicTacToeMdp, ValueIterationConfig, ValueIterationSolver, evaluate_policy,
    mdp::StateSpace, ports::Solver,
};

#[test]
fn saved_policy_plays_like_the_trained_one() {
    let game = GameConfig::default().with_opponent(OpponentKind::Defensive);
    let mdp = TicTacToeMdp::new(game).unwrap();
    let config = ValueIterationConfig::default().with_stopping_rule(StoppingRule::Sweeps(10));
    let mut solver = ValueIterationSolver::new(mdp, config.clone()).unwrap();
    let report = solver.train().unwrap();
    let policy = solver.policy().unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("defensive.msgpack");
    let metadata = PolicyMetadata::new(config.discount, game.rewards, game.opponent)
        .with_report(report.clone());
    SavedPolicy::new(Algorithm::ValueIteration, metadata, policy)
        .save(&path)
        .unwrap();

    let loaded = SavedPolicy::load(&path).unwrap();
    assert_eq!(loaded.metadata.report.as_ref(), Some(&report));
    assert_eq!(loaded.metadata.rewards, RewardConfig::default());
    let restored = loaded.to_policy().unwrap();
    assert_eq!(&restored, policy);
    assert!(restored.is_complete_for(solver.model()));

    let before = evaluate_policy(policy, OpponentKind::Uniform, 300, Some(9)).unwrap();
    let after = evaluate_policy(&restored, OpponentKind::Uniform, 300, Some(9)).unwrap();
    assert_eq!(before, after);
}

#[test]
fn every_saved_entry_is_a_live_state() {
    let mdp = TicTacToeMdp::new(GameConfig::default()).unwrap();
    let mut solver = ValueIterationSolver::new(mdp, ValueIterationConfig::default()).unwrap();
    solver.train().unwrap();
    let metadata = PolicyMetadata::new(0.9, RewardConfig::default(), OpponentKind::Uniform);
    let saved = SavedPolicy::new(
        Algorithm::ValueIteration,
        metadata,
        solver.policy().unwrap(),
    );

    assert_eq!(saved.entries.len(), 2423);
    for label in saved.entries.keys() {
        let state = BoardState::from_label(label).unwrap();
        assert!(solver.model().contains(&state));
        assert!(!state.is_terminal());
    }
}
