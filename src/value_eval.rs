//! Static evaluation of a grid position from one player's perspective.

use board_game_traits::Color;

use crate::position::GameState;
use crate::rules::Rules;
use crate::search::Score;

const IMMEDIATE_WIN_WEIGHT: Score = 10.0;

/// Score `state` for `player`, higher being better. Pure function.
///
/// Material difference plus a large bonus per legal move that would win
/// immediately, minus the same bonus for the opponent's winning moves. Each
/// candidate move costs a full win check, which makes this the dominant
/// per-leaf cost in the minmax search.
pub fn static_eval<R: Rules>(rules: &R, state: &GameState, player: Color) -> Score {
    let opponent = !player;
    let material = state.count(player) as Score - state.count(opponent) as Score;

    let moves = rules.valid_moves(state);
    let own_wins = moves
        .iter()
        .filter(|&&mv| rules.is_winning_move(state, mv, player).is_some())
        .count();
    let opponent_wins = moves
        .iter()
        .filter(|&&mv| rules.is_winning_move(state, mv, opponent).is_some())
        .count();

    material + IMMEDIATE_WIN_WEIGHT * (own_wins as Score - opponent_wins as Score)
}
