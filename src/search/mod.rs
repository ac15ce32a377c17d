//! A time-budgeted Monte Carlo Tree Search engine, with UCB1 selection,
//! single-child expansion and locality-biased random rollouts.
//!
//! This module holds the public-facing engine; the tree and the
//! select/expand/rollout/backpropagate cycle live in `mcts_core`.

use std::time::Instant;

use board_game_traits::Color;
use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::Bernoulli;

use crate::position::{GameState, Move};
use crate::rules::{Clock, Rules};

mod mcts_core;

pub use mcts_core::Tree;

/// Type alias for evaluation scores.
pub type Score = f32;

/// Tunable parameters for the MCTS engine.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MctsSetting {
    exploration: f64,
    time_fraction: f64,
    max_iterations: u32,
    rollout_randomness: f64,
}

impl Default for MctsSetting {
    fn default() -> Self {
        MctsSetting {
            exploration: 1.2,
            time_fraction: 0.9,
            max_iterations: 1000,
            rollout_randomness: 0.5,
        }
    }
}

impl MctsSetting {
    /// The UCB1 exploration constant used during selection.
    pub fn exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// The share of the remaining game clock a single turn may consume.
    /// The rest is a safety margin.
    pub fn time_fraction(mut self, time_fraction: f64) -> Self {
        assert!((0.0..=1.0).contains(&time_fraction));
        self.time_fraction = time_fraction;
        self
    }

    /// Hard cap on search iterations per turn, regardless of the clock.
    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Probability of a rollout move being picked uniformly at random rather
    /// than near the last move played.
    pub fn rollout_randomness(mut self, rollout_randomness: f64) -> Self {
        assert!((0.0..=1.0).contains(&rollout_randomness));
        self.rollout_randomness = rollout_randomness;
        self
    }
}

/// The MCTS engine. Builds a fresh search tree every turn.
pub struct MctsPlayer<R: Rules, C: Clock> {
    rules: R,
    player: Color,
    clock: C,
    settings: MctsSetting,
    rollout_coin: Bernoulli,
    rng: SmallRng,
}

impl<R: Rules, C: Clock> MctsPlayer<R, C> {
    pub fn new(rules: R, player: Color, clock: C) -> Self {
        Self::with_settings(rules, player, clock, MctsSetting::default())
    }

    pub fn with_settings(rules: R, player: Color, clock: C, settings: MctsSetting) -> Self {
        Self::from_rng(rules, player, clock, settings, SmallRng::from_entropy())
    }

    /// Fixed-seed constructor, for deterministic tests.
    pub fn from_seed(rules: R, player: Color, clock: C, settings: MctsSetting, seed: u64) -> Self {
        Self::from_rng(rules, player, clock, settings, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rules: R, player: Color, clock: C, settings: MctsSetting, rng: SmallRng) -> Self {
        let rollout_coin = Bernoulli::new(settings.rollout_randomness).unwrap();
        MctsPlayer {
            rules,
            player,
            clock,
            settings,
            rollout_coin,
            rng,
        }
    }

    /// Pick a move for the configured player. Called once per turn by the
    /// match driver.
    ///
    /// An immediate win is played, and an immediate opponent win blocked,
    /// before any search is run, so both hold under arbitrarily small
    /// budgets. Otherwise the tree search runs until 90% of the remaining
    /// clock or the iteration cap is spent, and the root child with the best
    /// win rate is played.
    ///
    /// # Panics
    /// If `state` has no legal moves.
    pub fn choose_move(&mut self, state: &GameState) -> Move {
        let moves = self.rules.valid_moves(state);
        assert!(
            !moves.is_empty(),
            "choose_move called with no legal moves on\n{}",
            state
        );

        for &mv in &moves {
            if self.rules.is_winning_move(state, mv, self.player).is_some() {
                return mv;
            }
        }
        for &mv in &moves {
            if self.rules.is_winning_move(state, mv, !self.player).is_some() {
                return mv;
            }
        }

        let start_time = Instant::now();
        let time_limit = self
            .clock
            .remaining(self.player)
            .mul_f64(self.settings.time_fraction);

        let mut tree = Tree::new(&self.rules, state.clone());
        let mut iterations = 0;
        while start_time.elapsed() < time_limit && iterations < self.settings.max_iterations {
            let selected = tree.select(self.settings.exploration);
            let node = if tree.is_terminal(selected) {
                selected
            } else {
                tree.expand(selected, self.player, &mut self.rng)
            };
            let result = tree.rollout(node, self.player, &self.rollout_coin, &mut self.rng);
            tree.backpropagate(node, result);
            iterations += 1;
        }

        match tree.best_move() {
            Some(mv) => {
                debug!(
                    "mcts: {} iterations over {} nodes, playing {}",
                    iterations,
                    tree.len(),
                    mv
                );
                mv
            }
            // The budget did not allow a single expansion.
            None => *moves.choose(&mut self.rng).unwrap(),
        }
    }
}
