//! Client/server protocol: message codec and stream framing.

mod framer;
mod message;

pub use framer::{Frame, FrameKind, Framer};
pub use message::{Command, MESSAGE_LEN, Message, PROTOCOL_VERSION};
