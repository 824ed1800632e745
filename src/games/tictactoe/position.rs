//! Board positions as numbered on the wire.

use strum::{EnumIter, FromRepr};

/// A position on the tic-tac-toe board.
///
/// Discriminants are the protocol's cell numbers: 1 is the top-left
/// corner, 9 the bottom-right, counting row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, FromRepr)]
#[repr(u8)]
pub enum Position {
    /// Top-left (position 1)
    TopLeft = 1,
    /// Top-center (position 2)
    TopCenter = 2,
    /// Top-right (position 3)
    TopRight = 3,
    /// Middle-left (position 4)
    MiddleLeft = 4,
    /// Center (position 5)
    Center = 5,
    /// Middle-right (position 6)
    MiddleRight = 6,
    /// Bottom-left (position 7)
    BottomLeft = 7,
    /// Bottom-center (position 8)
    BottomCenter = 8,
    /// Bottom-right (position 9)
    BottomRight = 9,
}

impl Position {
    /// All 9 positions in board order.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Parses a wire position (1-9).
    pub fn from_number(number: u8) -> Option<Self> {
        Self::from_repr(number)
    }

    /// Wire number of this position (1-9).
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Row-major board index (0-8).
    pub fn index(self) -> usize {
        usize::from(self.number() - 1)
    }

    /// Row of this position (0-2).
    pub fn row(self) -> usize {
        self.index() / 3
    }

    /// Column of this position (0-2).
    pub fn column(self) -> usize {
        self.index() % 3
    }

    /// Get label for this position (for display).
    pub fn label(&self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label(), self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_from_number_bounds() {
        assert_eq!(Position::from_number(0), None);
        assert_eq!(Position::from_number(1), Some(Position::TopLeft));
        assert_eq!(Position::from_number(9), Some(Position::BottomRight));
        assert_eq!(Position::from_number(10), None);
        assert_eq!(Position::from_number(255), None);
    }

    #[test]
    fn test_row_and_column_mapping() {
        for pos in Position::iter() {
            let n = usize::from(pos.number());
            assert_eq!(pos.row(), (n - 1) / 3);
            assert_eq!(pos.column(), (n - 1) % 3);
        }
        assert_eq!((Position::Center.row(), Position::Center.column()), (1, 1));
        assert_eq!((Position::BottomLeft.row(), Position::BottomLeft.column()), (2, 0));
    }

    #[test]
    fn test_all_matches_iteration_order() {
        assert_eq!(Position::iter().collect::<Vec<_>>(), Position::ALL.to_vec());
    }
}
