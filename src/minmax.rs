//! Depth-limited minmax search with alpha-beta pruning, memoization and
//! iterative deepening under a wall-clock budget.

use std::fmt;
use std::time::{Duration, Instant};

use board_game_traits::Color;
use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution};

use crate::position::{GameState, Move};
use crate::rules::{Clock, Rules};
use crate::search::Score;
use crate::tt::TranspositionTable;
use crate::value_eval;

/// Tunable parameters for the minmax engine.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MinmaxSetting {
    max_depth: u16,
    shuffle_probability: f64,
}

impl Default for MinmaxSetting {
    fn default() -> Self {
        MinmaxSetting {
            max_depth: 2,
            shuffle_probability: 0.7,
        }
    }
}

impl MinmaxSetting {
    /// The deepest iteration of the iterative-deepening loop.
    pub fn max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Probability of shuffling the candidate moves before searching, to
    /// diversify move ordering between otherwise identical turns.
    pub fn shuffle_probability(mut self, shuffle_probability: f64) -> Self {
        assert!((0.0..=1.0).contains(&shuffle_probability));
        self.shuffle_probability = shuffle_probability;
        self
    }
}

/// Raised inside the recursive search when the wall-clock budget runs out.
/// Unwinds the depth in progress and never escapes `choose_move`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchTimeout;

impl fmt::Display for SearchTimeout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "search aborted, time budget exhausted")
    }
}

/// The minmax engine. Owns its collaborators and a transposition cache that
/// persists between turns.
pub struct MinmaxPlayer<R: Rules, C: Clock> {
    rules: R,
    player: Color,
    clock: C,
    settings: MinmaxSetting,
    table: TranspositionTable,
    shuffle_coin: Bernoulli,
    rng: SmallRng,
}

impl<R: Rules, C: Clock> MinmaxPlayer<R, C> {
    pub fn new(rules: R, player: Color, clock: C) -> Self {
        Self::with_settings(rules, player, clock, MinmaxSetting::default())
    }

    pub fn with_settings(rules: R, player: Color, clock: C, settings: MinmaxSetting) -> Self {
        Self::from_rng(rules, player, clock, settings, SmallRng::from_entropy())
    }

    /// Fixed-seed constructor, for deterministic tests.
    pub fn from_seed(rules: R, player: Color, clock: C, settings: MinmaxSetting, seed: u64) -> Self {
        Self::from_rng(rules, player, clock, settings, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rules: R, player: Color, clock: C, settings: MinmaxSetting, rng: SmallRng) -> Self {
        let shuffle_coin = Bernoulli::new(settings.shuffle_probability).unwrap();
        MinmaxPlayer {
            rules,
            player,
            clock,
            settings,
            table: TranspositionTable::new(),
            shuffle_coin,
            rng,
        }
    }

    /// Drop all memoized evaluations.
    pub fn clear_cache(&mut self) {
        self.table.clear();
    }

    /// Pick a move for the configured player. Called once per turn by the
    /// match driver; the only other effect is warming the transposition cache.
    ///
    /// Searches depth 1, then 2, up to the configured maximum, as long as the
    /// clock allows. A depth interrupted by the budget is discarded whole, and
    /// the best move of the last completed depth is returned. If not even
    /// depth 1 completed, the first candidate stands in.
    ///
    /// # Panics
    /// If `state` has no legal moves.
    pub fn choose_move(&mut self, state: &GameState) -> Move {
        let mut moves = self.rules.valid_moves(state);
        assert!(
            !moves.is_empty(),
            "choose_move called with no legal moves on\n{}",
            state
        );

        if self.shuffle_coin.sample(&mut self.rng) {
            moves.shuffle(&mut self.rng);
        }

        let start_time = Instant::now();
        let budget = self.clock.remaining(self.player);

        let mut best_move = None;

        'deepening: for depth in 1..=self.settings.max_depth {
            let mut depth_best: Option<(Move, Score)> = None;
            for &mv in &moves {
                let child = state.child(mv, self.player);
                match self.search(
                    &child,
                    depth,
                    Score::NEG_INFINITY,
                    Score::INFINITY,
                    false,
                    start_time,
                    budget,
                ) {
                    Ok(value) => {
                        if depth_best.map_or(true, |(_, best_value)| value > best_value) {
                            depth_best = Some((mv, value));
                        }
                    }
                    Err(SearchTimeout) => {
                        debug!("minmax: depth {} interrupted, discarding", depth);
                        break 'deepening;
                    }
                }
            }
            if let Some((mv, value)) = depth_best {
                best_move = Some(mv);
                debug!("minmax: depth {} complete, {} scores {:.1}", depth, mv, value);
            }
        }

        best_move.unwrap_or(moves[0])
    }

    /// Alpha-beta search of `state`, `depth` plies deep, where `maximizing`
    /// states are those with the engine's own player to move.
    ///
    /// The timeout is checked on entry and propagated with `?` through every
    /// level, so an exhausted budget unwinds the whole depth.
    pub(crate) fn search(
        &mut self,
        state: &GameState,
        depth: u16,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
        start_time: Instant,
        budget: Duration,
    ) -> Result<Score, SearchTimeout> {
        if start_time.elapsed() > budget {
            return Err(SearchTimeout);
        }

        if let Some(score) = self.table.get(state) {
            return Ok(score);
        }

        let moves = self.rules.valid_moves(state);
        if depth == 0 || moves.is_empty() || self.rules.has_won(state, self.player) {
            let eval = value_eval::static_eval(&self.rules, state, self.player);
            self.table.insert(state.clone(), eval);
            return Ok(eval);
        }

        let to_move = if maximizing { self.player } else { !self.player };
        let mut best = if maximizing {
            Score::NEG_INFINITY
        } else {
            Score::INFINITY
        };

        for mv in moves {
            let child = state.child(mv, to_move);
            let eval = self.search(
                &child,
                depth - 1,
                alpha,
                beta,
                !maximizing,
                start_time,
                budget,
            )?;
            if maximizing {
                best = best.max(eval);
                alpha = alpha.max(eval);
            } else {
                best = best.min(eval);
                beta = beta.min(eval);
            }
            if beta <= alpha {
                break;
            }
        }

        self.table.insert(state.clone(), best);
        Ok(best)
    }
}
