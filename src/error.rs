use std::convert::Infallible;
use thiserror::Error;

/// The primary error type for the `robomon` library.
///
/// `E` is the serial link's error type; engine entry points propagate only
/// link failures. Flash faults never reach this type: the wire stays silent
/// on them and they are reported through `tracing` instead.
#[derive(Error, Debug)]
pub enum MonitorError<E: core::fmt::Debug = Infallible> {
    #[error("serial link error: {0:?}")]
    Link(E),

    #[error("short response: expected at least {expected} bytes, got {actual}")]
    ShortResponse { expected: usize, actual: usize },

    #[error("unexpected action code {0:#04x} in response")]
    UnexpectedAction(u8),
}
