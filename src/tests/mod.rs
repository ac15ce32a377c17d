#[cfg(test)]
mod eval_tests;
#[cfg(test)]
mod mcts_tests;

#[cfg(test)]
use crate::position::GameState;

#[cfg(test)]
fn state(rows: &str) -> GameState {
    rows.parse()
        .unwrap_or_else(|err| panic!("bad test position {:?}: {}", rows, err))
}
