//! The Monte Carlo search tree and the four phases of each iteration:
//! selection, expansion, rollout and backpropagation.

use board_game_traits::Color;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};

use crate::position::{GameState, Move};
use crate::rules::Rules;

/// A search tree of every node seen this turn, stored as an index-addressed
/// arena. Child links are owning indices; the parent link is a plain
/// back-index walked only during backpropagation.
pub struct Tree<'a, R: Rules> {
    rules: &'a R,
    nodes: Vec<Node>,
}

/// One node of the search tree.
///
/// `untried_moves` and the children's moves always partition the legal moves
/// of `state`, and `visits` counts exactly the rollouts whose backpropagation
/// passed through this node.
pub(crate) struct Node {
    pub(crate) state: GameState,
    pub(crate) mv: Option<Move>,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) untried_moves: Vec<Move>,
    pub(crate) visits: u32,
    pub(crate) wins: f64,
}

impl<'a, R: Rules> Tree<'a, R> {
    pub(crate) const ROOT: usize = 0;

    /// A tree holding only the root, with no parent and no move.
    pub fn new(rules: &'a R, state: GameState) -> Self {
        let untried_moves = rules.valid_moves(&state);
        Tree {
            rules,
            nodes: vec![Node {
                state,
                mv: None,
                parent: None,
                children: vec![],
                untried_moves,
                visits: 0,
                wins: 0.0,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn visits(&self) -> u32 {
        self.nodes[Self::ROOT].visits
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Descend from the root along best-UCB1 children, stopping at the first
    /// node that is terminal or still has untried moves.
    pub fn select(&self, exploration: f64) -> usize {
        let mut index = Self::ROOT;
        while !self.is_terminal(index) {
            if !self.nodes[index].untried_moves.is_empty() {
                return index;
            }
            match self.best_child(index, exploration) {
                Some(child) => index = child,
                None => return index,
            }
        }
        index
    }

    /// The child of `index` with the best UCB1 score,
    /// `wins / visits + exploration * sqrt(ln(parent visits) / visits)`.
    /// With `exploration` 0 this degenerates to pure win rate. Ties go to the
    /// first child seen.
    pub fn best_child(&self, index: usize, exploration: f64) -> Option<usize> {
        let parent_visits = self.nodes[index].visits as f64;
        let mut best: Option<(usize, f64)> = None;
        for &child_index in &self.nodes[index].children {
            let child = &self.nodes[child_index];
            let visits = child.visits as f64;
            let ucb1 = child.wins / visits + exploration * (parent_visits.ln() / visits).sqrt();
            if best.map_or(true, |(_, best_score)| ucb1 > best_score) {
                best = Some((child_index, ucb1));
            }
        }
        best.map(|(child_index, _)| child_index)
    }

    /// Whether `index` ends the game: no legal move remains, or the move that
    /// produced it is reported winning for either identity. The either-identity
    /// check means a node can be classified terminal even when the actual
    /// mover did not win.
    pub fn is_terminal(&self, index: usize) -> bool {
        let node = &self.nodes[index];
        if node.untried_moves.is_empty() && node.children.is_empty() {
            return true;
        }
        match node.mv {
            None => false,
            Some(mv) => {
                self.rules.is_winning_move(&node.state, mv, Color::White).is_some()
                    || self.rules.is_winning_move(&node.state, mv, Color::Black).is_some()
            }
        }
    }

    /// Create one child of `index` by drawing an untried move at random and
    /// playing it as `player`. The node must not be terminal.
    pub fn expand(&mut self, index: usize, player: Color, rng: &mut impl Rng) -> usize {
        let mv = {
            let untried = &mut self.nodes[index].untried_moves;
            debug_assert!(!untried.is_empty());
            let i = rng.gen_range(0..untried.len());
            untried.swap_remove(i)
        };

        let state = self.nodes[index].state.child(mv, player);
        let untried_moves = self.rules.valid_moves(&state);

        let child_index = self.nodes.len();
        self.nodes.push(Node {
            state,
            mv: Some(mv),
            parent: Some(index),
            children: vec![],
            untried_moves,
            visits: 0,
            wins: 0.0,
        });
        self.nodes[index].children.push(child_index);
        child_index
    }

    /// Play out the game from `index`'s state with random moves, biased
    /// towards cells adjacent to the last move played. Returns 1.0 if
    /// `player` wins, 0.0 if the opponent does, 0.5 for a full board.
    pub fn rollout(
        &self,
        index: usize,
        player: Color,
        uniform_coin: &Bernoulli,
        rng: &mut impl Rng,
    ) -> f64 {
        let node = &self.nodes[index];
        let mut state = node.state.clone();
        let mut last_move = node.mv;
        let mut to_move = player;

        loop {
            let moves = self.rules.valid_moves(&state);
            if moves.is_empty() {
                return GameResultForUs::Draw.score();
            }

            let mv = self.pick_rollout_move(&moves, &state, last_move, uniform_coin, rng);
            let wins = self.rules.is_winning_move(&state, mv, to_move).is_some();
            state.place(mv, to_move);

            if wins {
                let result = if to_move == player {
                    GameResultForUs::Win
                } else {
                    GameResultForUs::Loss
                };
                return result.score();
            }

            last_move = Some(mv);
            to_move = !to_move;
        }
    }

    fn pick_rollout_move(
        &self,
        moves: &[Move],
        state: &GameState,
        last_move: Option<Move>,
        uniform_coin: &Bernoulli,
        rng: &mut impl Rng,
    ) -> Move {
        if let Some(last) = last_move {
            if !uniform_coin.sample(rng) {
                let neighbors = self.rules.neighbors(state.size(), last);
                let close: Vec<Move> = moves
                    .iter()
                    .copied()
                    .filter(|mv| neighbors.contains(mv))
                    .collect();
                if let Some(&mv) = close.choose(rng) {
                    return mv;
                }
            }
        }
        *moves.choose(rng).unwrap()
    }

    /// Add one visit and `result` to `index` and every ancestor up to the root.
    pub fn backpropagate(&mut self, index: usize, result: f64) {
        let mut current = Some(index);
        while let Some(i) = current {
            let node = &mut self.nodes[i];
            node.visits += 1;
            node.wins += result;
            current = node.parent;
        }
    }

    /// The move of the root's best child by pure win rate, if any child was
    /// ever expanded.
    pub fn best_move(&self) -> Option<Move> {
        self.best_child(Self::ROOT, 0.0)
            .and_then(|index| self.nodes[index].mv)
    }
}

/// A rollout outcome from the searching player's perspective.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum GameResultForUs {
    Win,
    Loss,
    Draw,
}

impl GameResultForUs {
    fn score(self) -> f64 {
        match self {
            GameResultForUs::Win => 1.0,
            GameResultForUs::Loss => 0.0,
            GameResultForUs::Draw => 0.5,
        }
    }
}
