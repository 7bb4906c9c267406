use crate::constants::FRAME_LEN;
use crate::packet::MonitorFrame;

/// Single-slot handoff between the idle-line interrupt path and the poll
/// loop.
///
/// Exactly one frame can be pending at a time. The producer copies the
/// transport's capture into the slot, so the DMA buffer and the in-flight
/// request never alias. Policy when the slot is still occupied: the new frame
/// is dropped and counted, never overwriting the pending one.
#[derive(Debug)]
pub struct FrameMailbox {
    slot: [u8; FRAME_LEN],
    ready: bool,
    overruns: u32,
}

impl FrameMailbox {
    pub const fn new() -> Self {
        Self {
            slot: [0; FRAME_LEN],
            ready: false,
            overruns: 0,
        }
    }

    /// Park one captured frame. Returns `false` (and counts an overrun) if
    /// the previous frame has not been taken yet.
    ///
    /// A capture shorter than 15 bytes overlays only the front of the slot;
    /// the trailing bytes decode as whatever the slot last held. Frame length
    /// is never validated, matching the wire protocol's timing-only framing.
    pub fn offer(&mut self, captured: &[u8]) -> bool {
        if self.ready {
            self.overruns = self.overruns.saturating_add(1);
            return false;
        }
        let n = captured.len().min(FRAME_LEN);
        self.slot[..n].copy_from_slice(&captured[..n]);
        self.ready = true;
        true
    }

    /// Take the pending frame, if any, freeing the slot for the next capture.
    pub fn take(&mut self) -> Option<MonitorFrame> {
        if !self.ready {
            return None;
        }
        self.ready = false;
        Some(MonitorFrame::from_wire(&self.slot))
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Frames dropped because the slot was still occupied.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

impl Default for FrameMailbox {
    fn default() -> Self {
        Self::new()
    }
}
