//! Core domain types for tic-tac-toe.

use super::position::Position;
use derive_more::{Display, Error};
use tracing::instrument;

/// Number of bytes in a serialized board (one per cell, row-major).
pub const BOARD_PAYLOAD_LEN: usize = 9;

/// Player in the game.
///
/// The server always plays `X`; the remote client plays `O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Player {
    /// Player X (the server).
    X,
    /// Player O (the client).
    O,
}

impl Player {
    /// Byte used for this mark in a board payload.
    pub fn symbol(self) -> u8 {
        match self {
            Player::X => b'X',
            Player::O => b'O',
        }
    }
}

/// A cell on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Never played; carries its own position.
    Open(Position),
    /// Occupied by a player.
    Marked(Player),
}

/// Error returned when a board payload cannot be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Byte is neither a mark nor an open-cell digit.
    #[display("Invalid byte 0x{byte:02x} for cell {index}")]
    InvalidCell {
        /// Zero-based cell index in row-major order.
        index: usize,
        /// Offending byte.
        byte: u8,
    },
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Cells in row-major order (0-8).
    cells: [Cell; 9],
}

impl Board {
    /// Creates a new board with every cell open.
    pub fn new() -> Self {
        Self {
            cells: Position::ALL.map(Cell::Open),
        }
    }

    /// Gets the cell at the given position.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.index()]
    }

    /// Returns true if the cell at `pos` has never been played.
    pub fn is_open(&self, pos: Position) -> bool {
        matches!(self.get(pos), Cell::Open(_))
    }

    /// Writes `player`'s mark at `pos`.
    ///
    /// The caller validates legality first; an occupied cell is overwritten.
    pub fn apply_move(&mut self, pos: Position, player: Player) {
        self.cells[pos.index()] = Cell::Marked(player);
    }

    /// Returns all cells as a slice.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Positions that are still open, in board order.
    pub fn open_positions(&self) -> Vec<Position> {
        Position::ALL
            .iter()
            .copied()
            .filter(|pos| self.is_open(*pos))
            .collect()
    }

    /// Builds a board from a RESUME payload.
    ///
    /// Byte `n` fills cell `n` (row `n / 3`, column `n % 3`). `X` and `O`
    /// are marks; an ASCII digit `1`-`9` leaves the cell open.
    #[instrument]
    pub fn from_payload(payload: &[u8; BOARD_PAYLOAD_LEN]) -> Result<Self, BoardError> {
        let mut board = Board::new();
        for (index, &byte) in payload.iter().enumerate() {
            board.cells[index] = match byte {
                b'X' => Cell::Marked(Player::X),
                b'O' => Cell::Marked(Player::O),
                b'1'..=b'9' => Cell::Open(Position::ALL[index]),
                _ => return Err(BoardError::InvalidCell { index, byte }),
            };
        }
        Ok(board)
    }

    /// Serializes the board the way clients send it in a RESUME payload.
    pub fn to_payload(&self) -> [u8; BOARD_PAYLOAD_LEN] {
        self.cells.map(|cell| match cell {
            Cell::Open(pos) => b'0' + pos.number(),
            Cell::Marked(player) => player.symbol(),
        })
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let symbol = match self.cells[row * 3 + col] {
                    Cell::Open(pos) => pos.number().to_string(),
                    Cell::Marked(player) => player.to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
