//! MCTS tree structure with arena allocation.
//!
//! Nodes live in one contiguous `Vec` and refer to each other by [`NodeId`].
//! Children are owned by the arena, and the parent link is a plain index, so
//! the tree has no ownership cycles and is dropped in one go after a decision.

use rand::Rng;

use crate::config::OutcomeValues;
use crate::error::EngineError;
use crate::game_state::GameState;
use crate::node::{NodeId, SearchNode};
use crate::position::Outcome;

/// MCTS tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct SearchTree {
    /// Arena storing all nodes
    nodes: Vec<SearchNode>,

    /// Root node index (always 0)
    root: NodeId,

    /// Node cap, never above `u32::MAX` so every index fits a [`NodeId`]
    max_nodes: usize,
}

impl SearchTree {
    /// Create a new tree whose root wraps `state`.
    pub fn new(state: GameState) -> Self {
        Self::with_max_nodes(state, u32::MAX as usize)
    }

    /// Create a tree that holds at most `max_nodes` nodes, root included.
    pub fn with_max_nodes(state: GameState, max_nodes: usize) -> Self {
        Self {
            nodes: vec![SearchNode::new_root(state)],
            root: NodeId(0),
            max_nodes: max_nodes.clamp(1, u32::MAX as usize),
        }
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// True if `count` more nodes fit under the cap.
    pub fn has_room_for(&self, count: usize) -> bool {
        self.max_nodes - self.nodes.len() >= count
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    /// Add a child reached from `parent` by playing `column`.
    ///
    /// Fails with [`EngineError::TreeFull`] once the node cap is reached.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        column: usize,
        state: GameState,
    ) -> Result<NodeId, EngineError> {
        let full = EngineError::TreeFull {
            limit: self.max_nodes,
        };
        if !self.has_room_for(1) {
            return Err(full);
        }
        let index = u32::try_from(self.nodes.len()).map_err(|_| full)?;
        let id = NodeId(index);
        self.nodes.push(SearchNode::new_child(parent, column, state));
        self.get_mut(parent).children.push(id);
        Ok(id)
    }

    /// Materialise one child per legal column of `id`.
    ///
    /// Does nothing if the node is already expanded, its position is
    /// terminal, or the children would not all fit under the node cap. Calling
    /// it twice leaves the child count unchanged.
    ///
    /// # Returns
    /// The number of children of the node afterwards.
    pub fn expand(&mut self, id: NodeId) -> usize {
        let node = self.get(id);
        if node.is_expanded() || node.state.status().is_terminal() {
            return node.children.len();
        }
        let successors = node.state.successors();
        if !self.has_room_for(successors.len()) {
            return 0;
        }
        for (column, state) in successors {
            if self.add_child(id, column, state).is_err() {
                break;
            }
        }
        self.children(id).len()
    }

    pub fn record_outcome(&mut self, id: NodeId, outcome: Outcome) {
        self.get_mut(id).record_outcome(outcome);
    }

    /// Record `outcome` on `id` and every ancestor up to the root inclusive.
    ///
    /// # Returns
    /// The number of nodes updated.
    pub fn backpropagate(&mut self, id: NodeId, outcome: Outcome) -> usize {
        let mut current = Some(id);
        let mut updated = 0;
        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.record_outcome(outcome);
            current = node.parent;
            updated += 1;
        }
        updated
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.get(parent).parent;
        }
        depth
    }

    /// The child with the highest average score, for the final move choice.
    ///
    /// Unvisited children are skipped and ties go to the first child in
    /// column order. Returns `None` when no child has been visited.
    pub fn best_child_by_score(&self, id: NodeId, values: &OutcomeValues) -> Option<NodeId> {
        first_max_by_key(self.children(id), |&child| {
            self.get(child).average_score(values)
        })
    }

    /// A uniformly random child, or `None` for a leaf.
    pub fn random_child<R: Rng + ?Sized>(&self, id: NodeId, rng: &mut R) -> Option<NodeId> {
        let children = self.children(id);
        if children.is_empty() {
            return None;
        }
        Some(children[rng.random_range(0..children.len())])
    }
}

/// Returns the first element with the largest defined key.
///
/// `Iterator::max_by` keeps the last of equal elements; search ties must go
/// to the first child instead.
pub(crate) fn first_max_by_key<F>(ids: &[NodeId], mut key: F) -> Option<NodeId>
where
    F: FnMut(&NodeId) -> Option<f64>,
{
    let mut best: Option<(NodeId, f64)> = None;
    for id in ids {
        let Some(score) = key(id) else { continue };
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((*id, score)),
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Position, Side};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn empty_tree() -> SearchTree {
        SearchTree::new(GameState::new(Position::new(), Side::A))
    }

    #[test]
    fn test_expand_root() {
        let mut tree = empty_tree();
        assert_eq!(tree.expand(tree.root()), 7);
        assert_eq!(tree.len(), 8);
        for (column, &child) in tree.children(tree.root()).iter().enumerate() {
            let node = tree.get(child);
            assert_eq!(node.parent, Some(tree.root()));
            assert_eq!(node.column, Some(column));
            assert_eq!(node.state.to_move(), Side::B);
        }
    }

    #[test]
    fn test_expand_is_idempotent() {
        let mut tree = empty_tree();
        let once = tree.expand(tree.root());
        let twice = tree.expand(tree.root());
        assert_eq!(once, twice);
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn test_expand_terminal_node_is_noop() {
        let won: Position = "
            .......
            .......
            .......
            .......
            BBB....
            AAAA...
        "
        .parse()
        .unwrap();
        let mut tree = SearchTree::new(GameState::new(won, Side::B));
        assert_eq!(tree.expand(tree.root()), 0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_expand_respects_node_cap() {
        let state = GameState::new(Position::new(), Side::A);
        let mut tree = SearchTree::with_max_nodes(state, 10);
        assert_eq!(tree.expand(tree.root()), 7);

        // Two free slots cannot hold seven children.
        let child = tree.children(tree.root())[0];
        assert_eq!(tree.expand(child), 0);
        assert_eq!(tree.len(), 8);

        let next = state.successor(0).unwrap();
        tree.add_child(child, 0, next).unwrap();
        tree.add_child(child, 1, next).unwrap();
        assert!(matches!(
            tree.add_child(child, 2, next),
            Err(EngineError::TreeFull { limit: 10 })
        ));
        assert_eq!(tree.len(), 10);
    }

    #[test]
    fn test_node_cap_is_clamped_to_index_range() {
        let state = GameState::new(Position::new(), Side::A);
        assert_eq!(SearchTree::new(state).max_nodes(), u32::MAX as usize);
        assert_eq!(SearchTree::with_max_nodes(state, 0).max_nodes(), 1);
        assert_eq!(SearchTree::with_max_nodes(state, usize::MAX).max_nodes(), u32::MAX as usize);
    }

    #[test]
    fn test_backpropagate_updates_path() {
        let mut tree = empty_tree();
        tree.expand(tree.root());
        let child = tree.children(tree.root())[2];
        tree.expand(child);
        let grandchild = tree.children(child)[0];
        assert_eq!(tree.depth(grandchild), 2);

        assert_eq!(tree.backpropagate(grandchild, Outcome::Win(Side::B)), 3);
        tree.backpropagate(grandchild, Outcome::Win(Side::A));
        tree.backpropagate(grandchild, Outcome::Draw);

        for id in [grandchild, child, tree.root()] {
            let stats = tree.get(id).stats;
            assert_eq!(stats.visits, 3);
            assert_eq!(stats.wins_a, 1);
            assert_eq!(stats.wins_b, 1);
            assert_eq!(stats.draws, 1);
        }
        // Siblings are untouched.
        let sibling = tree.children(tree.root())[3];
        assert_eq!(tree.get(sibling).stats.visits, 0);
    }

    #[test]
    fn test_best_child_by_score() {
        let values = OutcomeValues::default();
        let mut tree = empty_tree();
        tree.expand(tree.root());
        let children = tree.children(tree.root()).to_vec();
        tree.record_outcome(children[0], Outcome::Win(Side::A));
        tree.record_outcome(children[0], Outcome::Win(Side::B));
        tree.record_outcome(children[1], Outcome::Win(Side::A));
        tree.record_outcome(children[1], Outcome::Win(Side::A));
        tree.record_outcome(children[2], Outcome::Win(Side::A));
        tree.record_outcome(children[2], Outcome::Draw);
        assert_eq!(tree.best_child_by_score(tree.root(), &values), Some(children[1]));
    }

    #[test]
    fn test_best_child_tie_goes_to_first() {
        let values = OutcomeValues::default();
        let mut tree = empty_tree();
        tree.expand(tree.root());
        let children = tree.children(tree.root()).to_vec();
        tree.record_outcome(children[4], Outcome::Draw);
        tree.record_outcome(children[2], Outcome::Draw);
        tree.record_outcome(children[6], Outcome::Draw);
        assert_eq!(tree.best_child_by_score(tree.root(), &values), Some(children[2]));
    }

    #[test]
    fn test_best_child_of_unvisited_or_leaf() {
        let values = OutcomeValues::default();
        let mut tree = empty_tree();
        assert_eq!(tree.best_child_by_score(tree.root(), &values), None);
        tree.expand(tree.root());
        assert_eq!(tree.best_child_by_score(tree.root(), &values), None);
    }

    #[test]
    fn test_random_child() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut tree = empty_tree();
        assert_eq!(tree.random_child(tree.root(), &mut rng), None);
        tree.expand(tree.root());
        let mut seen = [false; 7];
        for _ in 0..200 {
            let child = tree.random_child(tree.root(), &mut rng).unwrap();
            seen[tree.get(child).column.unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
