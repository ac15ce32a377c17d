//! Contracts for the engines' external collaborators, plus reference
//! implementations used by the test suite and by simple match drivers.
//!
//! The engines are generic over these traits and assume nothing else about
//! the game: legality, win detection and adjacency all go through [`Rules`],
//! and the per-player time budget through [`Clock`].

use std::cell::Cell;
use std::time::Duration;

use arrayvec::ArrayVec;
use board_game_traits::Color;

use crate::position::{GameState, Move};

/// Legality and win-detection queries for one family of grid games.
pub trait Rules {
    /// Auxiliary information about a completed win. Opaque to the engines,
    /// which only ever ask whether it is present.
    type Win;

    /// All legal moves on `state`, in a fixed enumeration order.
    /// An empty result means no moves remain.
    fn valid_moves(&self, state: &GameState) -> Vec<Move>;

    /// Whether `mv`, considered as occupied by `player`, completes a win on
    /// `state`. The cell's actual content is immaterial, so the same query
    /// serves both "what if `player` played here" and "did the move just
    /// played win".
    fn is_winning_move(&self, state: &GameState, mv: Move, player: Color) -> Option<Self::Win>;

    /// The cells adjacent to `mv` on a `board_size` × `board_size` grid.
    fn neighbors(&self, board_size: usize, mv: Move) -> ArrayVec<Move, 8>;

    /// Whether `player` has already won on `state`.
    fn has_won(&self, state: &GameState, player: Color) -> bool {
        state
            .occupied(player)
            .any(|mv| self.is_winning_move(state, mv, player).is_some())
    }
}

impl<R: Rules + ?Sized> Rules for &R {
    type Win = R::Win;

    fn valid_moves(&self, state: &GameState) -> Vec<Move> {
        (**self).valid_moves(state)
    }

    fn is_winning_move(&self, state: &GameState, mv: Move, player: Color) -> Option<Self::Win> {
        (**self).is_winning_move(state, mv, player)
    }

    fn neighbors(&self, board_size: usize, mv: Move) -> ArrayVec<Move, 8> {
        (**self).neighbors(board_size, mv)
    }

    fn has_won(&self, state: &GameState, player: Color) -> bool {
        (**self).has_won(state, player)
    }
}

/// Remaining wall-clock budget per player, for the whole game rather than a
/// single move. Engines carve their own per-move slice out of it.
pub trait Clock {
    fn remaining(&self, player: Color) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn remaining(&self, player: Color) -> Duration {
        (**self).remaining(player)
    }
}

/// A fixed budget, identical for both players. Convenient in tests.
impl Clock for Duration {
    fn remaining(&self, _player: Color) -> Duration {
        *self
    }
}

/// A per-player countdown, decremented by the match driver between turns.
#[derive(Debug, Clone)]
pub struct GameClock {
    remaining: [Cell<Duration>; 2],
}

impl GameClock {
    pub fn new(initial: Duration) -> Self {
        GameClock {
            remaining: [Cell::new(initial), Cell::new(initial)],
        }
    }

    pub fn set_remaining(&self, player: Color, remaining: Duration) {
        self.remaining[clock_index(player)].set(remaining);
    }

    /// Subtract `spent` from `player`'s budget, saturating at zero.
    pub fn subtract(&self, player: Color, spent: Duration) {
        let cell = &self.remaining[clock_index(player)];
        cell.set(cell.get().saturating_sub(spent));
    }
}

impl Clock for GameClock {
    fn remaining(&self, player: Color) -> Duration {
        self.remaining[clock_index(player)].get()
    }
}

fn clock_index(player: Color) -> usize {
    match player {
        Color::White => 0,
        Color::Black => 1,
    }
}

/// The line orientation that completed a win under [`ConnectRules`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineDirection {
    Row,
    Column,
    Diagonal,
    AntiDiagonal,
}

impl LineDirection {
    const ALL: [(Self, i32, i32); 4] = [
        (LineDirection::Row, 0, 1),
        (LineDirection::Column, 1, 0),
        (LineDirection::Diagonal, 1, 1),
        (LineDirection::AntiDiagonal, 1, -1),
    ];
}

/// Rules for plain connection games: any empty cell is playable, and
/// `win_length` own cells in a straight line win.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectRules {
    win_length: usize,
}

impl ConnectRules {
    pub fn new(win_length: usize) -> Self {
        assert!(win_length >= 2, "bad win length {}", win_length);
        ConnectRules { win_length }
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// Longest straight line of `player`'s cells through `mv` along
    /// `(row_step, col_step)`, with `mv` itself counted as `player`'s.
    fn line_length(
        &self,
        state: &GameState,
        mv: Move,
        player: Color,
        row_step: i32,
        col_step: i32,
    ) -> usize {
        let size = state.size() as i32;
        let mut length = 1;
        for sign in [1, -1] {
            let mut row = mv.row() as i32 + sign * row_step;
            let mut col = mv.col() as i32 + sign * col_step;
            while (0..size).contains(&row)
                && (0..size).contains(&col)
                && state.get(Move::new(row as u8, col as u8)) == Some(player)
            {
                length += 1;
                row += sign * row_step;
                col += sign * col_step;
            }
        }
        length
    }
}

impl Default for ConnectRules {
    fn default() -> Self {
        ConnectRules::new(4)
    }
}

impl Rules for ConnectRules {
    type Win = LineDirection;

    fn valid_moves(&self, state: &GameState) -> Vec<Move> {
        let mut moves = Vec::new();
        for row in 0..state.size() {
            for col in 0..state.size() {
                let mv = Move::new(row as u8, col as u8);
                if state.is_empty_cell(mv) {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    fn is_winning_move(&self, state: &GameState, mv: Move, player: Color) -> Option<LineDirection> {
        LineDirection::ALL
            .iter()
            .find(|(_, row_step, col_step)| {
                self.line_length(state, mv, player, *row_step, *col_step) >= self.win_length
            })
            .map(|(direction, _, _)| *direction)
    }

    fn neighbors(&self, board_size: usize, mv: Move) -> ArrayVec<Move, 8> {
        let size = board_size as i32;
        let mut neighbors = ArrayVec::new();
        for row_step in -1..=1 {
            for col_step in -1..=1 {
                if row_step == 0 && col_step == 0 {
                    continue;
                }
                let row = mv.row() as i32 + row_step;
                let col = mv.col() as i32 + col_step;
                if (0..size).contains(&row) && (0..size).contains(&col) {
                    neighbors.push(Move::new(row as u8, col as u8));
                }
            }
        }
        neighbors
    }
}
