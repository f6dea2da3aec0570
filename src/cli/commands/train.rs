//! Train command - run a solver on the Tic-Tac-Toe MDP

use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use serde_json::to_writer_pretty;

use crate::{
    cli::{
        config::TrainingFile,
        output::{
            create_spinner, format_number, format_share, print_board, print_kv, print_section,
            print_subsection,
        },
    },
    config::{Algorithm, StoppingRule},
    evaluation::evaluate_policy,
    mdp::StateSpace,
    observers::{HistoryObserver, ProgressObserver},
    planning::{PolicyIterationSolver, ValueIterationSolver},
    policy::Policy,
    ports::{Observer, Solver, TrainingReport},
    q_learning::QLearningSolver,
    serialization::{PolicyMetadata, SavedPolicy},
    tictactoe::{BoardState, OpponentKind, TicTacToeMdp},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    #[value(alias = "vi")]
    ValueIteration,
    #[value(alias = "pi")]
    PolicyIteration,
    #[value(alias = "q")]
    QLearning,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::ValueIteration => Algorithm::ValueIteration,
            AlgorithmArg::PolicyIteration => Algorithm::PolicyIteration,
            AlgorithmArg::QLearning => Algorithm::QLearning,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train a Tic-Tac-Toe policy")]
pub struct TrainArgs {
    /// Solving algorithm
    #[arg(value_enum)]
    pub algorithm: AlgorithmArg,

    /// JSON config file; flags given here override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Opponent folded into the dynamics (uniform, defensive, minimax)
    #[arg(long, short = 'o')]
    pub opponent: Option<OpponentKind>,

    /// Discount factor γ
    #[arg(long)]
    pub discount: Option<f64>,

    /// Reward for winning
    #[arg(long, allow_hyphen_values = true)]
    pub win: Option<f64>,

    /// Reward for losing
    #[arg(long, allow_hyphen_values = true)]
    pub loss: Option<f64>,

    /// Reward for a move that does not end the game
    #[arg(long, allow_hyphen_values = true)]
    pub living: Option<f64>,

    /// Reward for a draw
    #[arg(long, allow_hyphen_values = true)]
    pub draw: Option<f64>,

    /// Value iteration: run exactly this many sweeps
    #[arg(long, conflicts_with_all = ["threshold", "max_sweeps"])]
    pub sweeps: Option<usize>,

    /// Value iteration: stop once no value changes by more than this
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Value iteration: sweep budget when stopping on a threshold
    #[arg(long)]
    pub max_sweeps: Option<usize>,

    /// Policy iteration: evaluation tolerance δ
    #[arg(long)]
    pub delta: Option<f64>,

    /// Policy iteration: cap on evaluation/improvement rounds
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Policy iteration: cap on sweeps within one evaluation
    #[arg(long)]
    pub max_evaluation_sweeps: Option<usize>,

    /// Q-learning: learning rate α
    #[arg(long, alias = "alpha")]
    pub learning_rate: Option<f64>,

    /// Q-learning: exploration rate ε
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Q-learning: multiplicative ε decay per episode
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Q-learning: floor for ε under decay
    #[arg(long)]
    pub min_epsilon: Option<f64>,

    /// Q-learning: number of episodes
    #[arg(long)]
    pub episodes: Option<usize>,

    /// Random seed for reproducibility (policy iteration and Q-learning)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Save the trained policy (.json for JSON, anything else MessagePack)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the per-sweep/per-episode convergence history as JSON
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Play this many games against the training opponent afterwards
    #[arg(long, default_value_t = 0)]
    pub eval_games: usize,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl TrainArgs {
    /// Fold command line overrides into the loaded configuration
    fn apply(&self, file: &mut TrainingFile) {
        if let Some(opponent) = self.opponent {
            file.game.opponent = opponent;
        }
        let rewards = &mut file.game.rewards;
        for (flag, slot) in [
            (self.win, &mut rewards.win),
            (self.loss, &mut rewards.loss),
            (self.living, &mut rewards.living),
            (self.draw, &mut rewards.draw),
        ] {
            if let Some(value) = flag {
                *slot = value;
            }
        }

        if let Some(discount) = self.discount {
            file.value_iteration.discount = discount;
            file.policy_iteration.discount = discount;
            file.q_learning.discount = discount;
        }

        if let Some(sweeps) = self.sweeps {
            file.value_iteration.stopping = StoppingRule::Sweeps(sweeps);
        } else if self.threshold.is_some() || self.max_sweeps.is_some() {
            let (threshold, max_sweeps) = match file.value_iteration.stopping {
                StoppingRule::Converged {
                    threshold,
                    max_sweeps,
                } => (threshold, max_sweeps),
                StoppingRule::Sweeps(_) => (
                    StoppingRule::DEFAULT_THRESHOLD,
                    StoppingRule::DEFAULT_MAX_SWEEPS,
                ),
            };
            file.value_iteration.stopping = StoppingRule::Converged {
                threshold: self.threshold.unwrap_or(threshold),
                max_sweeps: self.max_sweeps.unwrap_or(max_sweeps),
            };
        }

        let pi = &mut file.policy_iteration;
        pi.delta = self.delta.unwrap_or(pi.delta);
        pi.max_iterations = self.max_iterations.unwrap_or(pi.max_iterations);
        pi.max_evaluation_sweeps = self
            .max_evaluation_sweeps
            .unwrap_or(pi.max_evaluation_sweeps);

        let ql = &mut file.q_learning;
        ql.learning_rate = self.learning_rate.unwrap_or(ql.learning_rate);
        ql.epsilon = self.epsilon.unwrap_or(ql.epsilon);
        ql.epsilon_decay = self.epsilon_decay.unwrap_or(ql.epsilon_decay);
        ql.min_epsilon = self.min_epsilon.unwrap_or(ql.min_epsilon);
        ql.episodes = self.episodes.unwrap_or(ql.episodes);

        if self.seed.is_some() {
            file.policy_iteration.seed = self.seed;
            file.q_learning.seed = self.seed;
        }
    }
}

/// What every solver hands back to the command
struct Trained {
    report: TrainingReport,
    policy: Policy<BoardState, usize>,
    discount: f64,
    seed: Option<u64>,
    start_value: f64,
}

fn run<S>(solver: &mut S) -> Result<(TrainingReport, Policy<BoardState, usize>)>
where
    S: Solver<State = BoardState, Action = usize>,
{
    let report = solver
        .train()
        .with_context(|| format!("{} did not complete", solver.algorithm()))?;
    let policy = solver.policy()?.clone();
    Ok((report, policy))
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut file = match &args.config {
        Some(path) => TrainingFile::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TrainingFile::default(),
    };
    args.apply(&mut file);
    let algorithm = Algorithm::from(args.algorithm);

    let spinner = if args.no_progress {
        None
    } else {
        Some(create_spinner("Enumerating reachable states")?)
    };
    let mdp = TicTacToeMdp::new(file.game).context("Invalid game configuration")?;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    print_section(&format!("Training: {}", algorithm.label()));
    let rewards = file.game.rewards;
    print_kv("Opponent", file.game.opponent.label());
    print_kv("States", &format_number(mdp.states().len()));
    print_kv(
        "Rewards",
        &format!(
            "win {}, loss {}, living {}, draw {}",
            rewards.win, rewards.loss, rewards.living, rewards.draw
        ),
    );

    let history = args.history.as_ref().map(|_| HistoryObserver::new());
    let mut observers: Vec<Box<dyn Observer>> = Vec::new();
    if !args.no_progress {
        observers.push(Box::new(ProgressObserver::new()));
    }
    if let Some(observer) = &history {
        observers.push(Box::new(observer.clone()));
    }

    let start = mdp.initial_state();
    let trained = match algorithm {
        Algorithm::ValueIteration => {
            let config = file.value_iteration.clone();
            print_kv("Discount", &config.discount.to_string());
            print_kv("Stopping", &format!("{:?}", config.stopping));
            let mut solver = ValueIterationSolver::new(mdp, config.clone())
                .context("Invalid value iteration configuration")?;
            for observer in observers {
                solver.add_observer(observer);
            }
            let (report, policy) = run(&mut solver)?;
            Trained {
                report,
                policy,
                discount: config.discount,
                seed: None,
                start_value: solver.value(&start)?,
            }
        }
        Algorithm::PolicyIteration => {
            let config = file.policy_iteration.clone();
            print_kv("Discount", &config.discount.to_string());
            print_kv("Delta", &format!("{:e}", config.delta));
            let mut solver = PolicyIterationSolver::new(mdp, config.clone())
                .context("Invalid policy iteration configuration")?;
            for observer in observers {
                solver.add_observer(observer);
            }
            let (report, policy) = run(&mut solver)?;
            Trained {
                report,
                policy,
                discount: config.discount,
                seed: config.seed,
                start_value: solver.value(&start)?,
            }
        }
        Algorithm::QLearning => {
            let config = file.q_learning.clone();
            print_kv("Discount", &config.discount.to_string());
            print_kv(
                "Alpha / epsilon",
                &format!("{} / {}", config.learning_rate, config.epsilon),
            );
            print_kv("Episodes", &format_number(config.episodes));
            let mut solver = QLearningSolver::tictactoe(mdp, config.clone())
                .context("Invalid Q-learning configuration")?;
            for observer in observers {
                solver.add_observer(observer);
            }
            let (report, policy) = run(&mut solver)?;
            Trained {
                report,
                policy,
                discount: config.discount,
                seed: config.seed,
                start_value: solver.q_table().max_q(&start)?,
            }
        }
    };

    let report = &trained.report;
    print_subsection("Result");
    print_kv("Iterations", &format_number(report.iterations));
    if report.sweeps > 0 {
        print_kv("Sweeps", &format_number(report.sweeps));
    }
    print_kv("Final delta", &format!("{:.3e}", report.final_delta));
    print_kv("Converged", if report.converged { "yes" } else { "no" });
    print_kv("Policy states", &format_number(report.policy_size));
    print_kv("Elapsed", &format!("{:.2?}", report.elapsed));
    print_kv("Value of start", &format!("{:.4}", trained.start_value));

    let opening = *trained.policy.action(&start)?;
    print_kv("Opening move", &opening.to_string());
    print_board(&start, Some(opening));

    if args.eval_games > 0 {
        let summary = evaluate_policy(
            &trained.policy,
            file.game.opponent,
            args.eval_games,
            trained.seed,
        )
        .context("Evaluation failed")?;
        print_subsection(&format!("Evaluation vs {}", summary.opponent));
        print_kv("Wins", &format_share(summary.wins, summary.win_rate()));
        print_kv("Draws", &format_share(summary.draws, summary.draw_rate()));
        print_kv("Losses", &format_share(summary.losses, summary.loss_rate()));
    }

    if let Some(path) = &args.output {
        let metadata = PolicyMetadata::new(trained.discount, rewards, file.game.opponent)
            .with_seed(trained.seed)
            .with_report(trained.report.clone());
        SavedPolicy::new(algorithm, metadata, &trained.policy)
            .save(path)
            .with_context(|| format!("Failed to save policy to {}", path.display()))?;
        println!("\nSaved policy to {}", path.display());
    }

    if let (Some(path), Some(observer)) = (&args.history, &history) {
        let handle = observer.history();
        let recorded = handle
            .lock()
            .map_err(|_| anyhow!("convergence history lock poisoned"))?;
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        to_writer_pretty(BufWriter::new(file), &*recorded)
            .with_context(|| format!("Failed to write history to {}", path.display()))?;
        println!("Saved convergence history to {}", path.display());
    }

    Ok(())
}
