use crate::constants::{FRAME_LEN, MAX_DATA_LEN};
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Logical sub-target addressed by the `board` byte. Several boards share one
/// serial link; only the first has handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Board {
    Board1 = 0x01,
    // Reserved for future sub-targets, dispatched to a no-op
    Board2 = 0x02,
    Board3 = 0x03,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Action byte of a frame: the requested operation, the return variant stamped
/// on a reply, or an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Action {
    Read = 0x01,
    ReadReturn = 0x02,
    Write = 0x03,
    WriteReturn = 0x04,

    /// Defined in the error taxonomy but never raised: no handler validates
    /// the address range.
    NoSuchAddr = 0xFC,
    NoSuchAct = 0xFD,
    NoSuchBoard = 0xFE,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// One frame, request or response alike.
///
/// Wire layout, little endian, no padding:
/// `[board:1][act:1][dataNum:1][addr:4][data:8]` = 15 bytes.
///
/// There is no length prefix, checksum, or sequence number; frame boundaries
/// come from idle-line detection on the transport. Every 15-byte input
/// reinterprets to some frame, so all semantic validation happens at dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct MonitorFrame {
    pub board: u8,
    pub act: u8,
    pub data_num: u8,
    pub addr: U32,
    pub data: [u8; MAX_DATA_LEN],
}

impl MonitorFrame {
    /// Reinterpret 15 raw bytes as a frame. Infallible: values are taken as-is.
    pub fn from_wire(raw: &[u8; FRAME_LEN]) -> Self {
        zerocopy::transmute!(*raw)
    }

    /// The full 15-byte wire image of this frame. Replies transmit only a
    /// leading slice of it (see [`crate::constants::HEADER_LEN`]).
    pub fn to_wire(&self) -> [u8; FRAME_LEN] {
        zerocopy::transmute!(*self)
    }

    pub fn board_id(&self) -> Board {
        Board::from_primitive(self.board)
    }

    pub fn action(&self) -> Action {
        Action::from_primitive(self.act)
    }

    /// Payload length, clamped to the 8-byte data field. `dataNum` above 8 is
    /// not rejected anywhere, but it must never index past the field.
    pub fn payload_len(&self) -> usize {
        usize::from(self.data_num).min(MAX_DATA_LEN)
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.payload_len()]
    }

    /// The data field as one little-endian double-word, the unit the flash
    /// programming primitive consumes.
    pub fn dword(&self) -> u64 {
        u64::from_le_bytes(self.data)
    }
}
