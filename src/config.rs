//! Engine configuration parameters.

use std::time::Duration;

use crate::error::ConfigError;
use crate::position::{Outcome, Side};

/// Default iteration budget per decision.
pub const DEFAULT_ITERATIONS: u32 = 1500;

/// Default cap on search tree nodes per worker.
pub const DEFAULT_MAX_NODES: usize = 10_000_000;

/// Scores credited to a node for each kind of rollout result.
///
/// The defaults are three distinct constants, with a
/// loss weighing more than a win.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeValues {
    /// Score of a win for side A.
    pub win_a: f64,
    /// Score of a win for side B.
    pub win_b: f64,
    /// Score of a draw.
    pub draw: f64,
}

impl Default for OutcomeValues {
    fn default() -> Self {
        Self {
            win_a: 0.7,
            win_b: -1.0,
            draw: 0.2,
        }
    }
}

impl OutcomeValues {
    /// Score of a single outcome.
    pub fn value_of(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Win(Side::A) => self.win_a,
            Outcome::Win(Side::B) => self.win_b,
            Outcome::Draw => self.draw,
        }
    }

    /// Values seen from `side`: unchanged for A, win values swapped for B.
    ///
    /// The engine maximises scores, so it searches with the values oriented
    /// towards the side about to act.
    pub fn oriented_for(&self, side: Side) -> Self {
        match side {
            Side::A => *self,
            Side::B => Self {
                win_a: self.win_b,
                win_b: self.win_a,
                draw: self.draw,
            },
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("win_a", self.win_a), ("win_b", self.win_b), ("draw", self.draw)] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidOutcomeValue { name, value });
            }
        }
        Ok(())
    }
}

/// Configuration for one engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of select/expand/simulate/backpropagate passes per decision.
    pub iterations: u32,

    /// Rollouts simulated and backpropagated from the chosen node in each
    /// iteration.
    pub simulations_per_iteration: u32,

    /// Node cap of each search tree. Once reached, leaves are simulated
    /// without being expanded.
    pub max_nodes: usize,

    /// Exploration constant `C` of the UCT formula.
    pub exploration: f64,

    /// Rollout result scores, expressed for side A.
    pub outcome_values: OutcomeValues,

    /// Worker threads for root-parallel search. 1 searches on the calling
    /// thread, 0 uses one worker per logical CPU.
    pub threads: usize,

    /// Seed for the random source. `None` draws a fresh seed per decision.
    pub seed: Option<u64>,

    /// Wall-clock bound per decision, checked between iterations.
    pub time_limit: Option<Duration>,

    /// Play an immediate win, or block an immediate loss, without searching.
    pub immediate_tactics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            simulations_per_iteration: 1,
            max_nodes: DEFAULT_MAX_NODES,
            exploration: std::f64::consts::SQRT_2,
            outcome_values: OutcomeValues::default(),
            threads: 1,
            seed: None,
            time_limit: None,
            immediate_tactics: false,
        }
    }
}

impl EngineConfig {
    /// A small, seeded config for tests.
    pub fn for_testing() -> Self {
        Self {
            iterations: 200,
            seed: Some(42),
            ..Self::default()
        }
    }

    /// Builder pattern: set the iteration budget.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder pattern: set the rollouts per iteration.
    pub fn with_simulations_per_iteration(mut self, simulations: u32) -> Self {
        self.simulations_per_iteration = simulations;
        self
    }

    /// Builder pattern: cap the number of tree nodes.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Builder pattern: set the outcome values.
    pub fn with_outcome_values(mut self, values: OutcomeValues) -> Self {
        self.outcome_values = values;
        self
    }

    /// Builder pattern: set the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Builder pattern: set a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder pattern: bound the wall-clock time of a decision.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Builder pattern: enable or disable the immediate win/block shortcut.
    pub fn with_immediate_tactics(mut self, enabled: bool) -> Self {
        self.immediate_tactics = enabled;
        self
    }

    /// Thread count with 0 resolved to the number of logical CPUs.
    pub fn effective_threads(&self) -> usize {
        match self.threads {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.simulations_per_iteration == 0 {
            return Err(ConfigError::ZeroSimulations);
        }
        if self.max_nodes == 0 || u32::try_from(self.max_nodes).is_err() {
            return Err(ConfigError::InvalidMaxNodes(self.max_nodes));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        self.outcome_values.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.iterations, 1500);
        assert!((config.exploration - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(config.threads, 1);
        assert_eq!(config.simulations_per_iteration, 1);
        assert_eq!(config.max_nodes, DEFAULT_MAX_NODES);
        assert!(!config.immediate_tactics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::default()
            .with_iterations(300)
            .with_exploration(1.0)
            .with_seed(9)
            .with_threads(4)
            .with_simulations_per_iteration(3)
            .with_max_nodes(500)
            .with_immediate_tactics(true);
        assert_eq!(config.iterations, 300);
        assert!((config.exploration - 1.0).abs() < 1e-12);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.effective_threads(), 4);
        assert_eq!(config.simulations_per_iteration, 3);
        assert_eq!(config.max_nodes, 500);
        assert!(config.immediate_tactics);
    }

    #[test]
    fn test_zero_threads_means_all_cpus() {
        let config = EngineConfig::default().with_threads(0);
        assert!(config.effective_threads() >= 1);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            EngineConfig::default().with_iterations(0).validate(),
            Err(ConfigError::ZeroIterations)
        );
        assert_eq!(
            EngineConfig::default().with_simulations_per_iteration(0).validate(),
            Err(ConfigError::ZeroSimulations)
        );
        assert_eq!(
            EngineConfig::default().with_max_nodes(0).validate(),
            Err(ConfigError::InvalidMaxNodes(0))
        );
        assert!(matches!(
            EngineConfig::default().with_exploration(-1.0).validate(),
            Err(ConfigError::InvalidExploration(_))
        ));
        let values = OutcomeValues {
            draw: f64::INFINITY,
            ..OutcomeValues::default()
        };
        assert!(matches!(
            EngineConfig::default().with_outcome_values(values).validate(),
            Err(ConfigError::InvalidOutcomeValue { name: "draw", .. })
        ));
    }

    #[test]
    fn test_outcome_values_are_distinct() {
        let values = OutcomeValues::default();
        assert_ne!(values.win_a, values.win_b);
        assert_ne!(values.win_a, values.draw);
        assert_ne!(values.win_b, values.draw);
    }

    #[test]
    fn test_oriented_for_side_b_swaps_wins() {
        let values = OutcomeValues::default();
        let for_b = values.oriented_for(Side::B);
        assert_eq!(for_b.value_of(Outcome::Win(Side::B)), values.win_a);
        assert_eq!(for_b.value_of(Outcome::Win(Side::A)), values.win_b);
        assert_eq!(for_b.value_of(Outcome::Draw), values.draw);
        assert_eq!(values.oriented_for(Side::A), values);
    }
}
