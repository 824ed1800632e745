//! Wire format of protocol messages.
//!
//! Every message is exactly [`MESSAGE_LEN`] single-byte fields, in this
//! order, with no padding:
//!
//! ```text
//! +---------+---------+----------+----+-----+
//! | version | command | position | id | seq |
//! +---------+---------+----------+----+-----+
//! ```
//!
//! Decoding is total. Field values are not range-checked here; the state
//! machine decides what a version, id or position means.

/// Protocol version this server speaks.
pub const PROTOCOL_VERSION: u8 = 0x06;

/// Byte length of a message on the wire.
pub const MESSAGE_LEN: usize = 5;

const OFF_VERSION: usize = 0;
const OFF_COMMAND: usize = 1;
const OFF_POSITION: usize = 2;
const OFF_ID: usize = 3;
const OFF_SEQ: usize = 4;

/// Message command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Command {
    /// Start a game (0x00).
    #[display("NEWGAME")]
    NewGame,
    /// Place a mark (0x01).
    #[display("MOVE")]
    Move,
    /// Game finished (0x02).
    #[display("GAMEOVER")]
    GameOver,
    /// Restore a game from the client's board (0x03).
    #[display("RESUME")]
    Resume,
    /// Any other byte, kept verbatim.
    #[display("UNKNOWN(0x{_0:02x})")]
    Unknown(u8),
}

impl From<u8> for Command {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Command::NewGame,
            0x01 => Command::Move,
            0x02 => Command::GameOver,
            0x03 => Command::Resume,
            other => Command::Unknown(other),
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        match command {
            Command::NewGame => 0x00,
            Command::Move => 0x01,
            Command::GameOver => 0x02,
            Command::Resume => 0x03,
            Command::Unknown(other) => other,
        }
    }
}

/// A protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("v{version} {command} pos={position} id={id} seq={seq}")]
pub struct Message {
    /// Protocol version tag.
    pub version: u8,
    /// What the sender asks for.
    pub command: Command,
    /// Board position 1-9; unused (0) for some commands.
    pub position: u8,
    /// Session id the sender believes it owns.
    pub id: u8,
    /// Exchange counter.
    pub seq: u8,
}

impl Message {
    /// Creates a message tagged with [`PROTOCOL_VERSION`].
    pub fn new(command: Command, position: u8, id: u8, seq: u8) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            command,
            position,
            id,
            seq,
        }
    }

    /// Serialises the message into its wire bytes.
    pub fn encode(&self) -> [u8; MESSAGE_LEN] {
        let mut buf = [0u8; MESSAGE_LEN];
        buf[OFF_VERSION] = self.version;
        buf[OFF_COMMAND] = self.command.into();
        buf[OFF_POSITION] = self.position;
        buf[OFF_ID] = self.id;
        buf[OFF_SEQ] = self.seq;
        buf
    }

    /// Parses wire bytes. Every input decodes.
    pub fn decode(buf: &[u8; MESSAGE_LEN]) -> Self {
        Self {
            version: buf[OFF_VERSION],
            command: Command::from(buf[OFF_COMMAND]),
            position: buf[OFF_POSITION],
            id: buf[OFF_ID],
            seq: buf[OFF_SEQ],
        }
    }
}
