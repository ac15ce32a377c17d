//! Memoization of static evaluations, keyed by exact grid contents.

use std::collections::HashMap;

use crate::position::GameState;
use crate::search::Score;

/// An exact-key transposition table mapping a board configuration to a
/// previously computed score.
///
/// The key carries no search depth: a score stored by a shallow search is
/// reused unchanged by a deeper one. Entries stay valid across turns, since
/// the mapping is from grid contents alone.
#[derive(Clone, Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<GameState, Score>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        TranspositionTable {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, state: &GameState) -> Option<Score> {
        self.entries.get(state).copied()
    }

    pub fn insert(&mut self, state: GameState, score: Score) {
        self.entries.insert(state, score);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
