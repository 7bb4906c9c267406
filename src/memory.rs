//! Raw memory and flash capabilities.
//!
//! The protocol performs no bounds checking: any address the host supplies is
//! dereferenced as-is. That trust boundary lives entirely behind these two
//! traits, so it is auditable in one place. The link is assumed to belong to
//! a trusted operator tool, not a hostile peer.

/// Byte-wise read access to the controller's address space.
pub trait MemoryBus {
    /// Read one byte from an absolute address.
    ///
    /// Precondition: `addr` is mapped and readable. Implementations do not
    /// check this; an invalid address is a hardware-level fault, not an error
    /// return.
    fn read_byte(&self, addr: u32) -> u8;
}

/// The flash controller's unlock/program/lock sequence.
///
/// Programming commits one fixed 8-byte double-word per call. Timing and
/// device-specific register handling belong to the implementation.
pub trait FlashAccess {
    type Error: core::fmt::Debug;

    fn unlock(&mut self) -> Result<(), Self::Error>;

    fn program_double_word(&mut self, addr: u32, value: u64) -> Result<(), Self::Error>;

    fn lock(&mut self) -> Result<(), Self::Error>;
}

/// [`MemoryBus`] over the current process's own address space, for use on the
/// target itself.
pub struct DirectMemory {
    _priv: (),
}

impl DirectMemory {
    /// # Safety
    ///
    /// The caller guarantees that every address later handed to
    /// [`MemoryBus::read_byte`] on this instance is mapped and readable for
    /// the lifetime of the instance. On a bare-metal target that means the
    /// host tool only requests addresses inside the device's RAM and flash
    /// ranges.
    pub unsafe fn new() -> Self {
        Self { _priv: () }
    }
}

impl MemoryBus for DirectMemory {
    fn read_byte(&self, addr: u32) -> u8 {
        // SAFETY: mapped-and-readable precondition on `DirectMemory::new`.
        unsafe { core::ptr::read_volatile(addr as usize as *const u8) }
    }
}
