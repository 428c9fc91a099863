//! MCTS tree node representation.
//!
//! Each node wraps the game state reached by playing one column from its
//! parent, plus the rollout results recorded through it.

use crate::config::OutcomeValues;
use crate::game_state::GameState;
use crate::position::{Outcome, Side};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Visit and outcome counters of a node.
///
/// After every completed backpropagation `visits == wins_a + wins_b + draws`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub visits: u32,
    pub wins_a: u32,
    pub wins_b: u32,
    pub draws: u32,
}

impl Stats {
    /// Counts one rollout result.
    pub fn record(&mut self, outcome: Outcome) {
        self.visits += 1;
        match outcome {
            Outcome::Win(Side::A) => self.wins_a += 1,
            Outcome::Win(Side::B) => self.wins_b += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    /// Adds another node's counters, used when merging parallel searches.
    pub fn merge(&mut self, other: &Stats) {
        self.visits += other.visits;
        self.wins_a += other.wins_a;
        self.wins_b += other.wins_b;
        self.draws += other.draws;
    }

    /// Mean score of the recorded outcomes. `None` until the first visit.
    pub fn average_score(&self, values: &OutcomeValues) -> Option<f64> {
        if self.visits == 0 {
            return None;
        }
        let total: f64 = [
            (Outcome::Win(Side::A), self.wins_a),
            (Outcome::Win(Side::B), self.wins_b),
            (Outcome::Draw, self.draws),
        ]
        .into_iter()
        .map(|(outcome, count)| count as f64 * values.value_of(outcome))
        .sum();
        Some(total / self.visits as f64)
    }

    pub fn is_consistent(&self) -> bool {
        self.visits == self.wins_a + self.wins_b + self.draws
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// State at this node (owned; never shared with another node)
    pub state: GameState,

    /// Parent node index (`None` for the root). A back-reference only;
    /// the arena owns every node.
    pub parent: Option<NodeId>,

    /// Column played from the parent to reach this node
    pub column: Option<usize>,

    /// Children in ascending column order. Empty until expanded.
    pub children: Vec<NodeId>,

    pub stats: Stats,
}

impl SearchNode {
    pub fn new_root(state: GameState) -> Self {
        Self {
            state,
            parent: None,
            column: None,
            children: Vec::new(),
            stats: Stats::default(),
        }
    }

    pub fn new_child(parent: NodeId, column: usize, state: GameState) -> Self {
        Self {
            state,
            parent: Some(parent),
            column: Some(column),
            children: Vec::new(),
            stats: Stats::default(),
        }
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Counts one rollout result passing through this node.
    pub fn record_outcome(&mut self, outcome: Outcome) {
        self.stats.record(outcome);
    }

    pub fn average_score(&self, values: &OutcomeValues) -> Option<f64> {
        self.stats.average_score(values)
    }
}
