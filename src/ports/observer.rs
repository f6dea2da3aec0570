//! Observer port - watching a training run
//!
//! Solvers call these hooks as they work. Every hook has a no-op default so
//! an observer only overrides what it cares about.

use crate::{Result, config::Algorithm, ports::TrainingReport};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(algorithm, budget)` once. The budget is the sweep
///    cap, the iteration cap or the episode count.
/// 2. Per unit of work, depending on the algorithm:
///    - `on_sweep(sweep, max_delta)` after each committed Bellman sweep
///    - `on_policy_improvement(iteration, changed)` after each improvement pass
///    - `on_episode_end(episode, total_reward)` after each Q-learning episode
/// 3. `on_training_end(report)` once, only if training succeeded.
///
/// # Examples
///
/// ```
/// use tttmdp::ports::Observer;
///
/// struct SweepCounter(usize);
///
/// impl Observer for SweepCounter {
///     fn on_sweep(&mut self, _sweep: usize, _max_delta: f64) -> tttmdp::Result<()> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    fn on_training_start(&mut self, _algorithm: Algorithm, _budget: usize) -> Result<()> {
        Ok(())
    }

    /// `sweep` counts from 1 over the whole run
    fn on_sweep(&mut self, _sweep: usize, _max_delta: f64) -> Result<()> {
        Ok(())
    }

    /// `changed` is the number of states whose action was switched
    fn on_policy_improvement(&mut self, _iteration: usize, _changed: usize) -> Result<()> {
        Ok(())
    }

    /// `episode` counts from 1
    fn on_episode_end(&mut self, _episode: usize, _total_reward: f64) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self, _report: &TrainingReport) -> Result<()> {
        Ok(())
    }
}

/// Fan a hook out to every registered observer, stopping at the first error
pub(crate) fn notify_all<F>(observers: &mut [Box<dyn Observer>], mut hook: F) -> Result<()>
where
    F: FnMut(&mut dyn Observer) -> Result<()>,
{
    for observer in observers.iter_mut() {
        hook(observer.as_mut())?;
    }
    Ok(())
}
