//! Reassembly of fixed-size frames from a byte stream.
//!
//! A TCP read may return part of a message, or the tail of one message and
//! the head of the next. The [`Framer`] keeps the bytes of the frame in
//! flight and takes only what that frame still needs from each read; the
//! caller feeds whatever is left into the next frame.

use super::message::{MESSAGE_LEN, Message};
use crate::games::tictactoe::BOARD_PAYLOAD_LEN;
use tracing::{debug, trace};

const BUFFER_LEN: usize = if MESSAGE_LEN > BOARD_PAYLOAD_LEN {
    MESSAGE_LEN
} else {
    BOARD_PAYLOAD_LEN
};

/// Kind of frame the framer is assembling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameKind {
    /// A protocol message.
    #[default]
    Message,
    /// The 9-byte board that follows a RESUME message.
    Board,
}

impl FrameKind {
    /// Bytes in a complete frame of this kind.
    pub fn size(self) -> usize {
        match self {
            FrameKind::Message => MESSAGE_LEN,
            FrameKind::Board => BOARD_PAYLOAD_LEN,
        }
    }
}

/// A completed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Decoded protocol message.
    Message(Message),
    /// Raw RESUME board payload.
    Board([u8; BOARD_PAYLOAD_LEN]),
}

/// Per-session reassembly state.
#[derive(Debug, Clone, Default)]
pub struct Framer {
    buf: [u8; BUFFER_LEN],
    filled: usize,
    expecting: FrameKind,
}

impl Framer {
    /// Creates a framer waiting for a message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kind of frame currently being assembled.
    pub fn expecting(&self) -> FrameKind {
        self.expecting
    }

    /// Bytes of the current frame received so far.
    pub fn buffered(&self) -> usize {
        self.filled
    }

    /// Switches to assembling `kind`, dropping any partial frame.
    pub fn expect(&mut self, kind: FrameKind) {
        self.expecting = kind;
        self.filled = 0;
    }

    /// Back to waiting for a message with nothing buffered.
    pub fn reset(&mut self) {
        self.expect(FrameKind::Message);
    }

    /// Takes bytes from `input` toward the current frame.
    ///
    /// Returns how many bytes were consumed and the frame, if it is now
    /// complete. At most the missing bytes are consumed. A completed board
    /// frame switches the framer back to messages.
    pub fn push(&mut self, input: &[u8]) -> (usize, Option<Frame>) {
        let needed = self.expecting.size() - self.filled;
        let take = needed.min(input.len());
        if input.len() > needed {
            debug!(
                read = input.len(),
                needed,
                carried_over = input.len() - needed,
                "Read ran past the current frame"
            );
        }
        self.buf[self.filled..self.filled + take].copy_from_slice(&input[..take]);
        self.filled += take;
        trace!(
            buffered = self.filled,
            frame_len = self.expecting.size(),
            "Buffered frame bytes"
        );

        if self.filled < self.expecting.size() {
            return (take, None);
        }

        let frame = match self.expecting {
            FrameKind::Message => {
                let mut bytes = [0u8; MESSAGE_LEN];
                bytes.copy_from_slice(&self.buf[..MESSAGE_LEN]);
                Frame::Message(Message::decode(&bytes))
            }
            FrameKind::Board => {
                let mut bytes = [0u8; BOARD_PAYLOAD_LEN];
                bytes.copy_from_slice(&self.buf[..BOARD_PAYLOAD_LEN]);
                Frame::Board(bytes)
            }
        };
        self.reset();
        (take, Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::{Command, PROTOCOL_VERSION};

    fn wire() -> [u8; MESSAGE_LEN] {
        Message::new(Command::Move, 5, 0, 2).encode()
    }

    #[test]
    fn test_single_read_yields_message() {
        let mut framer = Framer::new();
        let (used, frame) = framer.push(&wire());
        assert_eq!(used, MESSAGE_LEN);
        assert_eq!(frame, Some(Frame::Message(Message::decode(&wire()))));
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn test_split_two_then_three() {
        let bytes = wire();
        let mut framer = Framer::new();

        let (used, frame) = framer.push(&bytes[..2]);
        assert_eq!((used, frame), (2, None));
        assert_eq!(framer.buffered(), 2);

        let (used, frame) = framer.push(&bytes[2..]);
        assert_eq!(used, 3);
        assert_eq!(frame, Some(Frame::Message(Message::decode(&bytes))));
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn test_byte_at_a_time() {
        let bytes = wire();
        let mut framer = Framer::new();
        for byte in &bytes[..MESSAGE_LEN - 1] {
            assert_eq!(framer.push(std::slice::from_ref(byte)), (1, None));
        }
        let (_, frame) = framer.push(&bytes[MESSAGE_LEN - 1..]);
        assert!(matches!(frame, Some(Frame::Message(m)) if m.position == 5));
    }

    #[test]
    fn test_overlong_read_takes_only_what_is_needed() {
        let mut input = wire().to_vec();
        input.extend_from_slice(&[PROTOCOL_VERSION, 0x00]);
        let mut framer = Framer::new();
        let (used, frame) = framer.push(&input);
        assert_eq!(used, MESSAGE_LEN);
        assert!(frame.is_some());

        let (used, frame) = framer.push(&input[used..]);
        assert_eq!((used, frame), (2, None));
        assert_eq!(framer.buffered(), 2);
    }

    #[test]
    fn test_board_frame_then_back_to_messages() {
        let mut framer = Framer::new();
        framer.expect(FrameKind::Board);
        assert_eq!(framer.push(b"XOXO"), (4, None));
        let (used, frame) = framer.push(b"XOXO1extra");
        assert_eq!(used, 5);
        assert_eq!(frame, Some(Frame::Board(*b"XOXOXOXO1")));
        assert_eq!(framer.expecting(), FrameKind::Message);
    }

    #[test]
    fn test_expect_drops_partial_frame() {
        let mut framer = Framer::new();
        framer.push(&wire()[..3]);
        framer.expect(FrameKind::Board);
        assert_eq!(framer.buffered(), 0);
    }
}
