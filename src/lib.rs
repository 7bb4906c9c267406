//! Serial monitor endpoint exposing a microcontroller's memory to a remote
//! host over a fixed-size binary packet protocol.
//!
//! The host addresses one of several logical boards sharing the link,
//! requests a read or a write of a memory address with up to 8 bytes of
//! payload, and the controller replies with the data read, a write
//! acknowledgement, or an error code.
//!
//! ## Wire format
//!
//! One frame, both directions: `[board:1][act:1][dataNum:1][addr:4][data:8]`,
//! 15 bytes, little endian, no checksum. Frames are delimited by idle-line
//! detection on the transport, not by a length field or terminator. Replies
//! transmit only their leading bytes: 7 for a write acknowledgement, 8 for an
//! error, `7 + n` for a read return.
//!
//! ## Architecture
//!
//! [`RobotMonitor`] is the engine. It owns a [`mailbox::FrameMailbox`]
//! (capacity-1 handoff between the idle-line interrupt and the poll loop) and
//! three integrator-supplied capabilities: a [`link::SerialLink`] for the
//! transport, a [`memory::MemoryBus`] for raw reads, and a
//! [`memory::FlashAccess`] for double-word programming. Wire the transport's
//! idle-line interrupt to [`RobotMonitor::on_idle_line`] and call
//! [`RobotMonitor::poll_once`] on every scheduler tick.
//!
//! Addresses are dereferenced unchecked; the link is a trusted operator
//! channel, and the trust boundary is isolated in the [`memory`] traits.

pub mod constants;
pub mod error;
pub mod link;
pub mod mailbox;
pub mod memory;
pub mod message;
pub mod monitor;
pub mod packet;

#[cfg(test)]
mod tests;

pub use error::MonitorError;
pub use monitor::RobotMonitor;
pub use packet::{Action, Board, MonitorFrame};
