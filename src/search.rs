//! MCTS search implementation.
//!
//! Implements the core MCTS algorithm:
//! 1. Selection: descend from the root by UCT until a node without children
//! 2. Expansion: give the leaf one child per legal column unless it is terminal
//! 3. Simulation: play uniformly random discs from a random new child to the end
//! 4. Backpropagation: record the rollout result from that child up to the root
//!
//! Steps 3 and 4 repeat `simulations_per_iteration` times per iteration.
//!
//! After the budget is spent the root child with the best average score wins.
//!
//! [`Search`] drives a single tree. [`Engine`] owns the configuration and,
//! when more than one thread is configured, runs independent searches on
//! private trees in a rayon pool and merges the root statistics by column.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use crate::config::{EngineConfig, OutcomeValues};
use crate::error::{EngineError, MoveError};
use crate::game_state::GameState;
use crate::node::{NodeId, Stats};
use crate::position::Outcome;
use crate::tactics::{immediate_tactic, Tactic};
use crate::tree::SearchTree;
use crate::uct::select_best_child;

/// How the engine arrived at its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Search,
    ImmediateWin,
    ForcedBlock,
}

/// Statistics of one root child after a search.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSummary {
    pub column: usize,
    pub stats: Stats,
    /// Average score from the acting side's point of view.
    pub average_score: Option<f64>,
}

/// The engine's answer for one position.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Column to play
    pub column: usize,
    pub source: DecisionSource,
    /// Completed iterations, summed over all workers
    pub iterations: u32,
    /// Rollouts backpropagated per iteration
    pub simulations_per_iteration: u32,
    /// Nodes allocated, summed over all workers
    pub nodes: usize,
    /// Root children in ascending column order (empty for tactical moves)
    pub children: Vec<ChildSummary>,
    /// Seed of the base random generator
    pub seed: u64,
    pub elapsed: Duration,
}

/// Stop conditions checked between iterations.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    pub iterations: u32,
    pub deadline: Option<Instant>,
    pub stop: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    pub fn iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    /// True once no further iteration may start.
    pub fn reached(&self, completed: u32) -> bool {
        completed >= self.iterations
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
            || self
                .stop
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Result of one random playout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollout {
    pub outcome: Outcome,
    /// Random discs played before the game ended
    pub plays: usize,
}

/// Plays uniformly random columns from a copy of `state` until the game ends.
///
/// A terminal `state` returns its outcome with zero plays. Every play fills a
/// cell, so a rollout never exceeds the number of cells on the board.
pub fn simulate_rollout<R: Rng + ?Sized>(
    state: &GameState,
    rng: &mut R,
) -> Result<Rollout, MoveError> {
    let mut state = *state;
    let mut plays = 0;
    loop {
        if let Some(outcome) = state.status().outcome() {
            return Ok(Rollout { outcome, plays });
        }
        state.random_play(rng)?;
        plays += 1;
    }
}

/// One decision's search tree and random source.
#[derive(Debug)]
pub struct Search<R: Rng> {
    tree: SearchTree,
    values: OutcomeValues,
    exploration: f64,
    simulations: u32,
    rng: R,
    iterations: u32,
}

impl<R: Rng> Search<R> {
    /// Creates a search rooted at `state`, scoring outcomes for the side to move.
    pub fn new(state: GameState, config: &EngineConfig, rng: R) -> Self {
        Self {
            tree: SearchTree::with_max_nodes(state, config.max_nodes),
            values: config.outcome_values.oriented_for(state.to_move()),
            exploration: config.exploration,
            simulations: config.simulations_per_iteration.max(1),
            rng,
            iterations: 0,
        }
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Outcome values oriented towards the side to move at the root.
    pub fn values(&self) -> &OutcomeValues {
        &self.values
    }

    /// Completed iterations.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Follows the best UCT child from the root until a node without children.
    pub fn select(&self) -> NodeId {
        let mut current = self.tree.root();
        while let Some(child) = select_best_child(&self.tree, current, &self.values, self.exploration) {
            current = child;
        }
        current
    }

    /// Runs one select → expand pass followed by the configured number of
    /// simulate → backpropagate passes from the same node.
    ///
    /// # Returns
    /// The outcomes recorded along the path during this iteration.
    pub fn iterate(&mut self) -> Result<Stats, EngineError> {
        let leaf = self.select();
        if !self.tree.get(leaf).state.status().is_terminal() {
            self.tree.expand(leaf);
        }

        let target = self.tree.random_child(leaf, &mut self.rng).unwrap_or(leaf);
        let start = self.tree.get(target).state;
        let mut recorded = Stats::default();
        for _ in 0..self.simulations {
            let rollout = simulate_rollout(&start, &mut self.rng)?;
            self.tree.backpropagate(target, rollout.outcome);
            recorded.record(rollout.outcome);
        }
        self.iterations += 1;

        trace!(
            iteration = self.iterations,
            depth = self.tree.depth(target),
            wins_a = recorded.wins_a,
            wins_b = recorded.wins_b,
            draws = recorded.draws,
            "MCTS iteration complete"
        );

        Ok(recorded)
    }

    /// Iterates until `limits` says stop.
    ///
    /// # Returns
    /// Total completed iterations of this search.
    pub fn run(&mut self, limits: &SearchLimits) -> Result<u32, EngineError> {
        while !limits.reached(self.iterations) {
            self.iterate()?;
        }
        Ok(self.iterations)
    }

    /// Root children in ascending column order.
    pub fn summaries(&self) -> Vec<ChildSummary> {
        let root = self.tree.root();
        self.tree
            .children(root)
            .iter()
            .filter_map(|&id| {
                let node = self.tree.get(id);
                node.column.map(|column| ChildSummary {
                    column,
                    stats: node.stats,
                    average_score: node.average_score(self.values()),
                })
            })
            .collect()
    }

    /// Column leading to the root child with the best average score.
    pub fn best_column(&self) -> Result<usize, EngineError> {
        let root = self.tree.root();
        if self.tree.children(root).is_empty() {
            return Err(EngineError::NoChildren(root));
        }
        let best = self
            .tree
            .best_child_by_score(root, self.values())
            .ok_or(EngineError::NoEvaluatedMoves)?;
        let before = self.tree.get(root).state;
        let after = self.tree.get(best).state;
        before
            .position()
            .column_played(after.position())
            .ok_or(EngineError::NoChildren(root))
    }
}

/// Picks the first summary with the highest average score.
fn best_summary(children: &[ChildSummary]) -> Option<&ChildSummary> {
    let mut best: Option<(&ChildSummary, f64)> = None;
    for child in children {
        let Some(score) = child.average_score else { continue };
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((child, score)),
        }
    }
    best.map(|(child, _)| child)
}

/// Splits `total` iterations over `workers`, the first workers taking the remainder.
pub fn split_budget(total: u32, workers: usize) -> Vec<u32> {
    let workers = workers.max(1) as u32;
    let share = total / workers;
    let remainder = total % workers;
    (0..workers)
        .map(|index| share + u32::from(index < remainder))
        .collect()
}

struct WorkerReport {
    iterations: u32,
    nodes: usize,
    children: Vec<ChildSummary>,
}

/// The MCTS engine.
pub struct Engine {
    config: EngineConfig,
    /// Present only when searching on more than one thread
    pool: Option<ThreadPool>,
    stop: Option<Arc<AtomicBool>>,
}

impl Engine {
    /// Creates an engine after validating `config`.
    ///
    /// A rayon pool is built once here when more than one thread is configured.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let threads = config.effective_threads();
        let pool = if threads > 1 {
            Some(ThreadPoolBuilder::new().num_threads(threads).build()?)
        } else {
            None
        };
        Ok(Self {
            config,
            pool,
            stop: None,
        })
    }

    /// Lets another thread cut a running decision short.
    ///
    /// Raising the flag stops the search after the current iteration; the
    /// flag is never cleared by the engine.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Changes the budget used by later decisions.
    pub fn set_iterations(&mut self, iterations: u32) -> Result<(), EngineError> {
        let mut config = self.config.clone();
        config.iterations = iterations;
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Chooses a column for the side to move in `state`.
    ///
    /// Fails with [`EngineError::TerminalPosition`] if the game is already
    /// over and with [`EngineError::NoEvaluatedMoves`] if the limits stopped
    /// the search before any root child was visited.
    pub fn decide(&self, state: &GameState) -> Result<Decision, EngineError> {
        let start = Instant::now();
        let status = state.status();
        if status.is_terminal() {
            return Err(EngineError::TerminalPosition(status));
        }

        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());

        if self.config.immediate_tactics {
            if let Some(tactic) = immediate_tactic(state) {
                let source = match tactic {
                    Tactic::ImmediateWin(_) => DecisionSource::ImmediateWin,
                    Tactic::ForcedBlock(_) => DecisionSource::ForcedBlock,
                };
                debug!(column = tactic.column(), ?source, "Tactical move, search skipped");
                return Ok(Decision {
                    column: tactic.column(),
                    source,
                    iterations: 0,
                    simulations_per_iteration: 0,
                    nodes: 0,
                    children: Vec::new(),
                    seed,
                    elapsed: start.elapsed(),
                });
            }
        }

        let limits = SearchLimits {
            iterations: self.config.iterations,
            deadline: self.config.time_limit.map(|limit| start + limit),
            stop: self.stop.clone(),
        };
        let rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        debug!(
            side = %state.to_move(),
            iterations = limits.iterations,
            simulations = self.config.simulations_per_iteration,
            threads = self.config.effective_threads(),
            seed,
            "Starting MCTS search"
        );

        let (column, report) = match &self.pool {
            None => {
                let mut search = Search::new(*state, &self.config, rng);
                if search.run(&limits)? == 0 {
                    return Err(EngineError::NoEvaluatedMoves);
                }
                let column = search.best_column()?;
                let report = WorkerReport {
                    iterations: search.iterations(),
                    nodes: search.tree().len(),
                    children: search.summaries(),
                };
                (column, report)
            }
            Some(pool) => {
                let report = self.search_parallel(pool, state, rng, &limits)?;
                let column = best_summary(&report.children)
                    .map(|child| child.column)
                    .ok_or(EngineError::NoEvaluatedMoves)?;
                (column, report)
            }
        };

        let elapsed = start.elapsed();
        debug!(
            column,
            iterations = report.iterations,
            nodes = report.nodes,
            elapsed_ms = elapsed.as_millis() as u64,
            "MCTS search finished"
        );

        Ok(Decision {
            column,
            source: DecisionSource::Search,
            iterations: report.iterations,
            simulations_per_iteration: self.config.simulations_per_iteration,
            nodes: report.nodes,
            children: report.children,
            seed,
            elapsed,
        })
    }

    /// Root-parallel search: one private tree per worker, merged by column.
    fn search_parallel(
        &self,
        pool: &ThreadPool,
        state: &GameState,
        rng: Xoshiro256PlusPlus,
        limits: &SearchLimits,
    ) -> Result<WorkerReport, EngineError> {
        let shares = split_budget(limits.iterations, pool.current_num_threads());

        let reports = pool.install(|| {
            shares
                .par_iter()
                .enumerate()
                .map(|(index, &share)| {
                    // Each worker gets its own non-overlapping stream.
                    let mut worker_rng = rng.clone();
                    for _ in 0..index {
                        worker_rng.jump();
                    }
                    let worker_limits = SearchLimits {
                        iterations: share,
                        ..limits.clone()
                    };
                    let mut search = Search::new(*state, &self.config, worker_rng);
                    search.run(&worker_limits)?;
                    Ok(WorkerReport {
                        iterations: search.iterations(),
                        nodes: search.tree().len(),
                        children: search.summaries(),
                    })
                })
                .collect::<Result<Vec<_>, EngineError>>()
        })?;

        let values = self.config.outcome_values.oriented_for(state.to_move());
        let mut merged: BTreeMap<usize, Stats> = BTreeMap::new();
        let mut iterations = 0;
        let mut nodes = 0;
        for report in reports {
            iterations += report.iterations;
            nodes += report.nodes;
            for child in report.children {
                merged.entry(child.column).or_default().merge(&child.stats);
            }
        }

        let children = merged
            .into_iter()
            .map(|(column, stats)| ChildSummary {
                column,
                stats,
                average_score: stats.average_score(&values),
            })
            .collect();

        Ok(WorkerReport {
            iterations,
            nodes,
            children,
        })
    }
}
