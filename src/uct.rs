//! Upper Confidence Bound applied to Trees.

use crate::config::OutcomeValues;
use crate::node::{NodeId, Stats};
use crate::tree::{first_max_by_key, SearchTree};

/// Calculates the UCT score of a child.
///
/// Unvisited children score `f64::INFINITY` so that every child is tried
/// once before any sibling is revisited. Otherwise the score is
/// `average + c * sqrt(ln(parent_visits) / visits)`.
///
/// # Arguments
/// * `parent_visits` - Visit count of the parent node
/// * `stats` - Counters of the child being scored
/// * `values` - Outcome scores used for the average
/// * `exploration` - The exploration constant `C`
pub fn uct_value(parent_visits: u32, stats: &Stats, values: &OutcomeValues, exploration: f64) -> f64 {
    match stats.average_score(values) {
        None => f64::INFINITY,
        Some(average) => {
            let visits = stats.visits as f64;
            average + exploration * ((parent_visits as f64).ln() / visits).sqrt()
        }
    }
}

/// Returns the child of `id` with the highest UCT score.
///
/// Ties go to the first child in column order. Returns `None` for a node
/// without children; callers descend only through expanded nodes.
pub fn select_best_child(
    tree: &SearchTree,
    id: NodeId,
    values: &OutcomeValues,
    exploration: f64,
) -> Option<NodeId> {
    let parent_visits = tree.get(id).stats.visits;
    first_max_by_key(tree.children(id), |&child| {
        Some(uct_value(parent_visits, &tree.get(child).stats, values, exploration))
    })
}
