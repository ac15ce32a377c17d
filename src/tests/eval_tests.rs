use board_game_traits::Color;

use crate::position::GameState;
use crate::rules::ConnectRules;
use crate::tests::state;
use crate::value_eval::static_eval;

#[test]
fn empty_board_is_balanced_test() {
    let rules = ConnectRules::new(3);
    let empty = GameState::new(3);
    assert_eq!(static_eval(&rules, &empty, Color::White), 0.0);
    assert_eq!(static_eval(&rules, &empty, Color::Black), 0.0);
}

#[test]
fn material_and_threats_test() {
    let rules = ConnectRules::new(3);
    // White is a stone up and threatens (0, 2); Black has no threat.
    let position = state("XX./O../...");
    assert_eq!(static_eval(&rules, &position, Color::White), 11.0);
    assert_eq!(static_eval(&rules, &position, Color::Black), -11.0);
}

#[test]
fn mutual_threats_cancel_test() {
    let rules = ConnectRules::new(3);
    // One immediate winning move each, equal material.
    let position = state("XX./OO./...");
    assert_eq!(static_eval(&rules, &position, Color::White), 0.0);
    assert_eq!(static_eval(&rules, &position, Color::Black), 0.0);
}

#[test]
fn idempotent_test() {
    let rules = ConnectRules::new(3);
    let position = state("X.O/.X./O..");
    let first = static_eval(&rules, &position, Color::White);
    let second = static_eval(&rules, &position, Color::White);
    assert_eq!(first, second);
    assert_eq!(static_eval(&rules, &position.clone(), Color::White), first);
}
