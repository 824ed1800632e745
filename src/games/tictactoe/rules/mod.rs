//! Game rules for tic-tac-toe.
//!
//! Pure functions for evaluating a board. Rules are kept apart from board
//! storage so the protocol layer can ask "is this legal" and "is this over"
//! without owning a game.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;

use super::{Board, Player, Position};
use tracing::instrument;

/// Classification of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Outcome {
    /// Moves remain and nobody has three in a row.
    #[display("open")]
    Open,
    /// A player completed a line.
    #[display("won by {_0}")]
    Won(Player),
    /// Board is full with no line.
    #[display("drawn")]
    Drawn,
}

impl Outcome {
    /// True for `Won` and `Drawn`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Open)
    }
}

/// Evaluates the board: a completed line wins, otherwise a full board is a
/// draw, otherwise the game is open.
#[instrument(level = "trace", skip(board))]
pub fn evaluate(board: &Board) -> Outcome {
    if let Some(winner) = check_winner(board) {
        Outcome::Won(winner)
    } else if is_full(board) {
        Outcome::Drawn
    } else {
        Outcome::Open
    }
}

/// Resolves a wire position to a board position if it may be played.
///
/// Returns `None` when the number is outside 1-9 or the cell is taken.
pub fn legal_position(board: &Board, number: u8) -> Option<Position> {
    Position::from_number(number).filter(|pos| board.is_open(*pos))
}

/// True iff `number` is in 1-9 and its cell is still open.
pub fn is_legal_move(board: &Board, number: u8) -> bool {
    legal_position(board, number).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_empty_is_open() {
        assert_eq!(evaluate(&Board::new()), Outcome::Open);
    }

    #[test]
    fn test_evaluate_won_beats_full() {
        let board = Board::from_payload(b"XXXOOXOXO").unwrap();
        assert_eq!(evaluate(&board), Outcome::Won(Player::X));
    }

    #[test]
    fn test_evaluate_drawn() {
        let board = Board::from_payload(b"XOXOXXOXO").unwrap();
        assert_eq!(evaluate(&board), Outcome::Drawn);
        assert!(evaluate(&board).is_terminal());
    }

    #[test]
    fn test_legal_move_rejects_out_of_range() {
        let board = Board::new();
        for number in [0u8, 10, 11, 0x31, 255] {
            assert!(!is_legal_move(&board, number), "{number}");
        }
        for number in 1..=9 {
            assert!(is_legal_move(&board, number));
        }
    }

    #[test]
    fn test_legal_move_rejects_occupied() {
        let mut board = Board::new();
        board.apply_move(Position::Center, Player::O);
        assert!(!is_legal_move(&board, 5));
        assert_eq!(legal_position(&board, 4), Some(Position::MiddleLeft));
    }
}
