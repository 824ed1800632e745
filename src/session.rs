//! Per-connection game session state.

use crate::games::tictactoe::Board;
use crate::protocol::{FrameKind, Framer, Message};
use std::time::Duration;
use tracing::{debug, instrument};

/// Identifier of a session: its slot index in the pool.
///
/// Ids travel in a single wire byte.
pub type SessionId = u8;

/// One game bound to a client connection.
///
/// Fields are crate-visible so the state machine and supervisor can work on
/// them directly; everything else reads through accessors.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) board: Board,
    pub(crate) in_progress: bool,
    pub(crate) idle: Duration,
    /// Wider than the wire byte so `current_seq - 1` is never a match at 0.
    pub(crate) current_seq: i32,
    pub(crate) resends: u32,
    pub(crate) last_sent: Option<Message>,
    pub(crate) framer: Framer,
}

impl Session {
    /// Creates an idle session for slot `id`.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            board: Board::new(),
            in_progress: false,
            idle: Duration::ZERO,
            current_seq: 0,
            resends: 0,
            last_sent: None,
            framer: Framer::new(),
        }
    }

    /// Slot id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Whether a game is being played.
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Time since bytes last arrived.
    pub fn idle(&self) -> Duration {
        self.idle
    }

    /// Sequence number of the current exchange.
    pub fn current_seq(&self) -> i32 {
        self.current_seq
    }

    /// Retransmissions of the last message since the last fresh one.
    pub fn resends(&self) -> u32 {
        self.resends
    }

    /// Most recent message sent to the client.
    pub fn last_sent(&self) -> Option<&Message> {
        self.last_sent.as_ref()
    }

    /// True while the trailing board of a RESUME is still arriving.
    pub fn awaiting_board(&self) -> bool {
        self.framer.expecting() == FrameKind::Board
    }

    /// Low byte of `current_seq`, as carried on the wire.
    pub(crate) fn wire_seq(&self) -> u8 {
        (self.current_seq & 0xff) as u8
    }

    /// Starts a fresh game: empty board, counters at zero, in progress.
    ///
    /// The framer is left alone so bytes already queued behind the
    /// triggering message are not lost.
    #[instrument(skip(self), fields(session_id = self.id))]
    pub(crate) fn start_game(&mut self) {
        debug!("Initializing game");
        self.board = Board::new();
        self.in_progress = true;
        self.idle = Duration::ZERO;
        self.current_seq = 0;
        self.resends = 0;
        self.last_sent = None;
    }

    /// Returns the slot to its pristine state for a new connection.
    pub(crate) fn reset(&mut self) {
        *self = Session::new(self.id);
    }
}
