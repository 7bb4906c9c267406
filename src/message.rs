//! Typed request/response layer over raw frames.
//!
//! The engine itself works on [`MonitorFrame`] directly; this module is the
//! host-side view, for operator tooling and tests that build requests and
//! interpret replies without hand-packing bytes.

use crate::constants::{HEADER_LEN, MAX_DATA_LEN};
use crate::error::MonitorError;
use crate::packet::{Action, Board, MonitorFrame};
use bytes::Bytes;
use num_enum::FromPrimitive;
use zerocopy::{FromZeros, IntoBytes};

/// A request as the host builds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Read up to 8 bytes starting at `addr`.
    Read { board: Board, addr: u32, len: u8 },
    /// Program one double-word at `addr`.
    Write { board: Board, addr: u32, data: u64 },
}

impl Request {
    pub fn to_frame(&self) -> MonitorFrame {
        let mut frame = MonitorFrame::new_zeroed();
        match *self {
            Request::Read { board, addr, len } => {
                frame.board = board.into();
                frame.act = Action::Read.into();
                frame.data_num = len.min(MAX_DATA_LEN as u8);
                frame.addr = addr.into();
            }
            Request::Write { board, addr, data } => {
                frame.board = board.into();
                frame.act = Action::Write.into();
                frame.data_num = MAX_DATA_LEN as u8;
                frame.addr = addr.into();
                frame.data = data.to_le_bytes();
            }
        }
        frame
    }

    /// Full 15-byte wire image. Requests always go out at full frame length;
    /// only replies are truncated.
    pub fn to_wire(&self) -> Bytes {
        Bytes::copy_from_slice(self.to_frame().as_bytes())
    }
}

/// A reply as it comes back over the link: 7 bytes (write ack), 8 bytes
/// (error), or `7 + n` bytes (read return).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    ReadReturn { board: Board, addr: u32, data: Vec<u8> },
    WriteReturn { board: Board, addr: u32 },
    Error { code: Action, board: Board, addr: u32, data_num: u8 },
}

impl Response {
    /// Parse one reply.
    ///
    /// A write that failed inside the flash sequence comes back with a zero
    /// action byte (the controller sends no acknowledgement and no error
    /// code); that surfaces here as `UnexpectedAction(0x00)`.
    pub fn parse(wire: &[u8]) -> Result<Self, MonitorError> {
        if wire.len() < HEADER_LEN {
            return Err(MonitorError::ShortResponse {
                expected: HEADER_LEN,
                actual: wire.len(),
            });
        }
        let board = Board::from_primitive(wire[0]);
        let act = Action::from_primitive(wire[1]);
        let data_num = wire[2];
        let addr = u32::from_le_bytes([wire[3], wire[4], wire[5], wire[6]]);

        match act {
            Action::ReadReturn => {
                let len = usize::from(data_num).min(MAX_DATA_LEN);
                if wire.len() < HEADER_LEN + len {
                    return Err(MonitorError::ShortResponse {
                        expected: HEADER_LEN + len,
                        actual: wire.len(),
                    });
                }
                Ok(Response::ReadReturn {
                    board,
                    addr,
                    data: wire[HEADER_LEN..HEADER_LEN + len].to_vec(),
                })
            }
            Action::WriteReturn => Ok(Response::WriteReturn { board, addr }),
            Action::NoSuchBoard | Action::NoSuchAct | Action::NoSuchAddr => Ok(Response::Error {
                code: act,
                board,
                addr,
                data_num,
            }),
            other => Err(MonitorError::UnexpectedAction(other.into())),
        }
    }
}
