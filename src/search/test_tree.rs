//! Synthetic game trees for checking the search against plain negamax.
//!
//! Every node is distinct, so the node id doubles as a collision-free hash
//! and the tree has no transpositions. Leaf scores are drawn from a seeded
//! generator and are already from the side-to-move's perspective.

use rand::Rng;

use crate::rules::search_position::{MoveTraits, PieceKind, SearchPosition, Side};
use crate::search::board_scoring::BoardScorer;

#[derive(Debug, Clone)]
struct TreeNode {
    children: Vec<usize>,
    eval: i32,
}

#[derive(Debug, Clone)]
pub struct TreePosition {
    nodes: Vec<TreeNode>,
    path: Vec<usize>,
}

impl TreePosition {
    /// Uniform-depth tree with between one and `max_branching` children per
    /// interior node.
    pub fn random<R: Rng>(rng: &mut R, depth: u8, max_branching: usize) -> Self {
        let mut nodes = vec![TreeNode {
            children: Vec::new(),
            eval: rng.random_range(-300..=300),
        }];
        let mut frontier = vec![0usize];
        for _ in 0..depth {
            let mut next = Vec::new();
            for parent in frontier {
                let count = rng.random_range(1..=max_branching.max(1));
                for _ in 0..count {
                    let id = nodes.len();
                    nodes.push(TreeNode {
                        children: Vec::new(),
                        eval: rng.random_range(-300..=300),
                    });
                    nodes[parent].children.push(id);
                    next.push(id);
                }
            }
            frontier = next;
        }
        Self {
            nodes,
            path: vec![0],
        }
    }

    fn current(&self) -> usize {
        self.path.last().copied().unwrap_or(0)
    }

    pub fn at_root(&self) -> bool {
        self.path.len() == 1
    }
}

impl SearchPosition for TreePosition {
    type Move = usize;

    fn make_move(&mut self, mv: usize) {
        assert!(self.nodes[self.current()].children.contains(&mv));
        self.path.push(mv);
    }

    fn unmake_move(&mut self, mv: usize) {
        assert_eq!(self.path.pop(), Some(mv));
    }

    fn legal_moves(&self, captures_only: bool) -> Vec<usize> {
        if captures_only {
            Vec::new()
        } else {
            self.nodes[self.current()].children.clone()
        }
    }

    fn is_in_check(&self) -> bool {
        false
    }

    fn is_draw(&self) -> bool {
        false
    }

    fn position_hash(&self) -> u64 {
        self.current() as u64
    }

    fn side_to_move(&self) -> Side {
        if self.path.len() % 2 == 1 {
            Side::First
        } else {
            Side::Second
        }
    }

    fn move_traits(&self, _mv: usize) -> MoveTraits {
        MoveTraits::quiet(PieceKind::Pawn)
    }

    fn is_target_attacked(&self, _mv: usize) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeScorer;

impl BoardScorer<TreePosition> for TreeScorer {
    fn score(&self, position: &TreePosition) -> i32 {
        position.nodes[position.current()].eval
    }
}

/// Full-width negamax with no pruning and no table.
pub fn reference_negamax(position: &TreePosition, depth: u8) -> i32 {
    fn walk(nodes: &[TreeNode], id: usize, depth: u8) -> i32 {
        let node = &nodes[id];
        if depth == 0 {
            return node.eval;
        }
        if node.children.is_empty() {
            return 0;
        }
        node.children
            .iter()
            .map(|&child| -walk(nodes, child, depth - 1))
            .max()
            .unwrap_or(0)
    }
    walk(&position.nodes, position.current(), depth)
}
