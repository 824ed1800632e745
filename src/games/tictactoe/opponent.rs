//! Automated opponent: picks the server's move.

use super::rules::legal_position;
use super::{Board, Position};
use rand::Rng;
use tracing::{instrument, warn};

/// Random draws attempted before move selection gives up.
pub const MOVE_ATTEMPTS: usize = 50;

/// Picks a uniformly random legal position.
///
/// Draws candidates 1-9 until one is open, at most [`MOVE_ATTEMPTS`] times.
/// `None` means no legal move was found; callers must handle it.
#[instrument(level = "debug", skip(board, rng))]
pub fn choose_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Position> {
    let found = (0..MOVE_ATTEMPTS).find_map(|_| legal_position(board, rng.gen_range(1..=9)));
    if found.is_none() {
        warn!(board = %board.display(), attempts = MOVE_ATTEMPTS, "No legal move found");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::Player;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_choose_move_is_always_open() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut board = Board::new();
        board.apply_move(Position::Center, Player::O);
        board.apply_move(Position::TopLeft, Player::X);
        for _ in 0..200 {
            let pos = choose_move(&board, &mut rng).unwrap();
            assert!(board.is_open(pos));
        }
    }

    #[test]
    fn test_choose_move_covers_every_open_cell() {
        let mut rng = StdRng::seed_from_u64(42);
        let board = Board::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(choose_move(&board, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn test_choose_move_full_board_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let board = Board::from_payload(b"XOXOXXOXO").unwrap();
        assert_eq!(choose_move(&board, &mut rng), None);
    }
}
