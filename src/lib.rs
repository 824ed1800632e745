//! ttts - a tic-tac-toe session server.
//!
//! Clients connect over TCP and play against the server using a fixed
//! 5-byte message protocol. A bounded pool of sessions is served by a
//! single event loop; clients find servers through a multicast probe.
//!
//! # Architecture
//!
//! - **Protocol**: wire codec and stream framer
//! - **Games**: tic-tac-toe board, rules and move selection
//! - **Machine**: per-session protocol state machine
//! - **Pool / Supervisor**: session slots and idle timeouts
//! - **Server**: tokio event loop tying it together
//!
//! # Example
//!
//! ```no_run
//! use ttts::{GameServer, ServerConfig};
//!
//! # async fn example() -> Result<(), ttts::ServerError> {
//! let server = GameServer::bind(ServerConfig::new(4000)).await?;
//! server.run().await
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod discovery;
mod error;
mod games;
mod machine;
mod pool;
mod protocol;
mod server;
mod session;
mod supervisor;

// Crate-level exports - Configuration and errors
pub use config::{ConfigError, DiscoveryConfig, ServerConfig};
pub use error::ServerError;

// Crate-level exports - Wire protocol
pub use protocol::{Command, Frame, FrameKind, Framer, MESSAGE_LEN, Message, PROTOCOL_VERSION};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    BOARD_PAYLOAD_LEN, Board, BoardError, CLIENT_MARK, Cell, MOVE_ATTEMPTS, Mark, Outcome, Player,
    Position, SERVER_MARK, choose_move, evaluate, is_legal_move,
};

// Crate-level exports - Sessions
pub use machine::{Action, NoLegalMove, handle_board, handle_message, process_bytes, server_reply};
pub use pool::{MAX_POOL_SIZE, SessionPool};
pub use session::{Session, SessionId};
pub use supervisor::{TimeoutPolicy, advance_idle, sweep};

// Crate-level exports - Discovery and server
pub use discovery::{PROBE_LEN, REPLY_LEN, respond};
pub use server::GameServer;
