//! Time-budgeted decision engines for two-player grid connection games.
//!
//! Two engines choose moves for an automated player on a square grid:
//! depth-limited minmax with alpha-beta pruning and a transposition cache
//! ([`minmax::MinmaxPlayer`]), and Monte Carlo Tree Search with UCB1
//! selection and locality-biased rollouts ([`search::MctsPlayer`]). Both run
//! under a cooperative wall-clock budget and degrade to the best answer found
//! so far when it runs out.
//!
//! The game rules and the game clock are collaborators supplied by the
//! caller, behind the traits in [`rules`]; a reference k-in-a-row ruleset
//! and a countdown clock are included.

pub mod minmax;
pub mod position;
pub mod rules;
pub mod search;
pub mod tt;
pub mod value_eval;

mod tests;

pub use board_game_traits::Color;
