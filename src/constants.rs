// Protocol constants for the monitor link

/// Size of a complete frame on the wire (15 bytes)
pub const FRAME_LEN: usize = 15;

/// Size of the frame header: board, act, dataNum, addr (7 bytes)
pub const HEADER_LEN: usize = 7;

/// Size of an error reply: the header plus one zero data byte (8 bytes)
pub const ERROR_FRAME_LEN: usize = 8;

/// Maximum payload carried by one frame (8 bytes)
pub const MAX_DATA_LEN: usize = 8;
