//! Tic-tac-toe game engine: board, rules, and the server's opponent.

mod opponent;
mod position;
pub mod rules;
mod types;

pub use opponent::{MOVE_ATTEMPTS, choose_move};
pub use position::Position;
pub use rules::{Outcome, evaluate, is_legal_move, legal_position};
pub use types::{BOARD_PAYLOAD_LEN, Board, BoardError, Cell, Player};

/// Alias for clarity in session management.
pub type Mark = Player;

/// Mark placed by the server.
pub const SERVER_MARK: Mark = Player::X;

/// Mark placed by the remote client.
pub const CLIENT_MARK: Mark = Player::O;
