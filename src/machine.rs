//! Per-session protocol state machine.
//!
//! The machine works on a [`Session`] and never touches a socket. Each
//! completed frame yields an [`Action`] for the transport layer to carry
//! out.
//!
//! Sequence numbers pair up: the client sends `k + 1`, the server answers
//! with `k + 2`. A message carrying `k - 1` means the client missed the
//! last reply, so it is sent again unchanged. Anything further ahead than
//! `k + 1` means the two sides lost track of each other and the session is
//! abandoned.

use crate::games::tictactoe::{
    BOARD_PAYLOAD_LEN, Board, CLIENT_MARK, Outcome, SERVER_MARK, choose_move, evaluate,
    legal_position,
};
use crate::protocol::{Command, Frame, FrameKind, Message, PROTOCOL_VERSION};
use crate::session::Session;
use derive_more::{Display, Error};
use rand::Rng;
use tracing::{debug, info, instrument, trace, warn};

/// What the transport layer must do after a frame was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write this message to the client.
    Reply(Message),
    /// Abandon the session and close its transport.
    Close,
    /// Nothing to send.
    Nothing,
}

/// Move selection gave up without finding an open cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("No legal move found for the server")]
pub struct NoLegalMove;

/// Feeds bytes read from the session's transport through its framer and
/// handles every completed frame, in order.
///
/// Processing stops at the first [`Action::Close`]; bytes after it are
/// discarded.
#[instrument(skip(session, bytes, rng), fields(session_id = session.id, len = bytes.len()))]
pub fn process_bytes<R: Rng + ?Sized>(
    session: &mut Session,
    bytes: &[u8],
    rng: &mut R,
) -> Vec<Action> {
    let mut actions = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let (used, frame) = session.framer.push(rest);
        rest = &rest[used..];
        let Some(frame) = frame else { continue };

        let action = handle_frame(session, frame, rng);
        actions.push(action);
        if action == Action::Close {
            if !rest.is_empty() {
                warn!(
                    discarded = rest.len(),
                    "Dropping bytes received after the session was closed"
                );
            }
            break;
        }
    }
    actions
}

/// Handles one completed frame.
pub fn handle_frame<R: Rng + ?Sized>(session: &mut Session, frame: Frame, rng: &mut R) -> Action {
    match frame {
        Frame::Message(msg) => handle_message(session, msg, rng),
        Frame::Board(payload) => handle_board(session, &payload, rng),
    }
}

/// Handles one decoded message.
#[instrument(skip(session, rng), fields(session_id = session.id, current_seq = session.current_seq))]
pub fn handle_message<R: Rng + ?Sized>(session: &mut Session, msg: Message, rng: &mut R) -> Action {
    trace!(%msg, "RECVD");

    if msg.version != PROTOCOL_VERSION {
        warn!(version = msg.version, "Bad protocol version, disconnecting");
        session.in_progress = false;
        return Action::Close;
    }

    match msg.command {
        Command::NewGame => new_game(session, rng),
        Command::Move => client_move(session, msg, rng),
        Command::GameOver => game_over(session, msg),
        Command::Resume => resume(session, msg),
        Command::Unknown(byte) => {
            debug!(command = byte, "Unknown command, ignoring");
            Action::Nothing
        }
    }
}

fn new_game<R: Rng + ?Sized>(session: &mut Session, rng: &mut R) -> Action {
    if session.in_progress {
        info!("NEWGAME for a game in progress, assuming the first reply was lost");
        return resend_last(session);
    }

    session.start_game();
    session.current_seq = 1;
    info!("Created new game");
    reply_or_abandon(session, rng)
}

fn client_move<R: Rng + ?Sized>(session: &mut Session, msg: Message, rng: &mut R) -> Action {
    if !session.in_progress {
        debug!("MOVE for a game not in progress, ignoring");
        return Action::Nothing;
    }
    if msg.id != session.id {
        debug!(claimed_id = msg.id, "MOVE for another session id, ignoring");
        return Action::Nothing;
    }

    let seq = i32::from(msg.seq);
    let expected = session.current_seq + 1;
    if seq == expected {
        session.resends = 0;
        session.current_seq += 2;
        play_round(session, msg.position, rng)
    } else if seq == session.current_seq - 1 {
        session.resends += 1;
        info!(
            seq,
            expected,
            resends = session.resends,
            "Duplicate MOVE, resending last message"
        );
        resend_last(session)
    } else if seq > expected {
        warn!(seq, expected, "Client is more than one exchange out of sync, ending game");
        session.in_progress = false;
        Action::Close
    } else {
        debug!(seq, expected, "Stale MOVE, ignoring");
        Action::Nothing
    }
}

fn play_round<R: Rng + ?Sized>(session: &mut Session, position: u8, rng: &mut R) -> Action {
    let Some(pos) = legal_position(&session.board, position) else {
        warn!(position, "Illegal client move, abandoning game");
        session.in_progress = false;
        return Action::Close;
    };

    session.board.apply_move(pos, CLIENT_MARK);
    info!(%pos, "Client moved");
    reply_or_abandon(session, rng)
}

fn game_over(session: &mut Session, msg: Message) -> Action {
    if msg.id != session.id {
        debug!(claimed_id = msg.id, "GAMEOVER for another session id, ignoring");
        return Action::Nothing;
    }
    let outcome = evaluate(&session.board);
    if !outcome.is_terminal() {
        debug!("GAMEOVER but the board is still open, ignoring");
        return Action::Nothing;
    }

    info!(%outcome, "Client acknowledged game over, closing session");
    session.in_progress = false;
    Action::Close
}

fn resume(session: &mut Session, msg: Message) -> Action {
    session.start_game();
    session.current_seq = i32::from(msg.seq);
    session.framer.expect(FrameKind::Board);
    info!(seq = msg.seq, "RESUME received, waiting for board");
    Action::Nothing
}

/// Handles the board payload that completes a RESUME.
#[instrument(skip(session, payload, rng), fields(session_id = session.id))]
pub fn handle_board<R: Rng + ?Sized>(
    session: &mut Session,
    payload: &[u8; BOARD_PAYLOAD_LEN],
    rng: &mut R,
) -> Action {
    let board = match Board::from_payload(payload) {
        Ok(board) => board,
        Err(e) => {
            warn!(error = %e, "Malformed RESUME board, dropping game");
            session.in_progress = false;
            return Action::Close;
        }
    };

    session.board = board;
    session.current_seq += 1;
    info!(board = %session.board.display(), "Resumed game");
    reply_or_abandon(session, rng)
}

fn resend_last(session: &Session) -> Action {
    match session.last_sent {
        Some(msg) => Action::Reply(msg),
        None => {
            debug!("Nothing sent yet, no resend");
            Action::Nothing
        }
    }
}

fn reply_or_abandon<R: Rng + ?Sized>(session: &mut Session, rng: &mut R) -> Action {
    match server_reply(session, rng) {
        Ok(reply) => {
            session.last_sent = Some(reply);
            Action::Reply(reply)
        }
        Err(e) => {
            warn!(error = %e, "Abandoning game");
            session.in_progress = false;
            Action::Close
        }
    }
}

/// Builds the server's answer to the current board.
///
/// An open board gets the server's move. A board that was already over
/// gets a GAMEOVER and the game stops being in progress right away. If the
/// server's own move ends the game, the MOVE is still sent and the session
/// stays in progress until the client sends its GAMEOVER.
#[instrument(level = "debug", skip(session, rng), fields(session_id = session.id))]
pub fn server_reply<R: Rng + ?Sized>(
    session: &mut Session,
    rng: &mut R,
) -> Result<Message, NoLegalMove> {
    let (id, seq) = (session.id, session.wire_seq());

    if evaluate(&session.board) != Outcome::Open {
        info!("Game over detected, sending GAMEOVER");
        session.in_progress = false;
        return Ok(Message::new(Command::GameOver, 0, id, seq));
    }

    let pos = choose_move(&session.board, rng).ok_or(NoLegalMove)?;
    session.board.apply_move(pos, SERVER_MARK);
    info!(%pos, "Server moved");

    let outcome = evaluate(&session.board);
    if outcome.is_terminal() {
        info!(%outcome, "Game over after server move, waiting for GAMEOVER");
    }
    Ok(Message::new(Command::Move, pos.number(), id, seq))
}
