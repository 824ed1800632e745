//! Games hosted by the server.

pub mod tictactoe;
