//! Serial transport interface.
//!
//! The engine never touches the UART itself. The integrator supplies a
//! [`SerialLink`] wrapping the platform's DMA receive/transmit primitives and
//! wires the idle-line interrupt to [`crate::RobotMonitor::on_idle_line`].

/// One serial link with DMA-style reception into an internal capture buffer
/// and idle-line frame delimiting.
pub trait SerialLink {
    /// Error type for arm/transmit operations.
    type Error: core::fmt::Debug;

    /// Arm reception of the next frame into the link's capture buffer.
    ///
    /// Reception stays armed until [`halt_receive`](Self::halt_receive);
    /// bytes beyond one frame's worth may be discarded by the implementation.
    fn arm_receive(&mut self) -> Result<(), Self::Error>;

    /// Stop an in-progress receive and return the bytes captured since the
    /// last arm. May be shorter than a full frame; the line-idle gap is the
    /// only frame delimiter, so the caller decides what a short capture means.
    fn halt_receive(&mut self) -> &[u8];

    /// Queue exactly `frame` for transmission.
    fn transmit(&mut self, frame: &[u8]) -> Result<(), Self::Error>;
}
