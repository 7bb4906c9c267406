use crate::constants::{ERROR_FRAME_LEN, HEADER_LEN};
use crate::error::MonitorError;
use crate::link::SerialLink;
use crate::mailbox::FrameMailbox;
use crate::memory::{FlashAccess, MemoryBus};
use crate::packet::{Action, Board, MonitorFrame};
use tracing::{debug, error, trace, warn};
use zerocopy::{FromZeros, IntoBytes};

/// The monitor engine: frame reception, dispatch, memory-access handlers and
/// reply transmission over one serial link.
///
/// Two entry points map to the two execution contexts of the original design:
/// [`on_idle_line`](Self::on_idle_line) from the transport's idle-line
/// interrupt, and [`poll_once`](Self::poll_once) from the host scheduler on
/// every tick. The engine itself is not synchronized; the integrator must
/// keep the two calls from preempting each other (on a single-core target, a
/// critical section around the interrupt-side call).
pub struct RobotMonitor<L, M, F> {
    link: L,
    mem: M,
    flash: F,
    mailbox: FrameMailbox,
}

impl<L, M, F> RobotMonitor<L, M, F>
where
    L: SerialLink,
    M: MemoryBus,
    F: FlashAccess,
{
    /// Build the engine and arm the first receive.
    pub fn new(link: L, mem: M, flash: F) -> Result<Self, MonitorError<L::Error>> {
        let mut monitor = Self {
            link,
            mem,
            flash,
            mailbox: FrameMailbox::new(),
        };
        monitor.link.arm_receive().map_err(MonitorError::Link)?;
        Ok(monitor)
    }

    /// Idle-line notification: the line has been quiet long enough to close a
    /// frame.
    ///
    /// Halts the in-progress receive, parks the capture in the mailbox, then
    /// rearms reception. The parking happens first: once rearmed, the very
    /// next byte may start overwriting the link's capture buffer. Returns
    /// whether the frame was accepted; `false` means the previous request was
    /// still pending and the new frame was dropped.
    pub fn on_idle_line(&mut self) -> Result<bool, MonitorError<L::Error>> {
        let captured = self.link.halt_receive();
        let accepted = self.mailbox.offer(captured);
        if !accepted {
            warn!(
                "Frame dropped, previous request still pending (overruns: {})",
                self.mailbox.overruns()
            );
        }
        self.link.arm_receive().map_err(MonitorError::Link)?;
        Ok(accepted)
    }

    /// Scheduler-tick entry point: handle at most one pending request.
    ///
    /// Returns whether a frame was dispatched. The handler runs to completion
    /// inside this call; there is no queue and no retry.
    pub fn poll_once(&mut self) -> Result<bool, MonitorError<L::Error>> {
        let Some(request) = self.mailbox.take() else {
            return Ok(false);
        };
        self.dispatch(&request)?;
        Ok(true)
    }

    fn dispatch(&mut self, request: &MonitorFrame) -> Result<(), MonitorError<L::Error>> {
        trace!(
            "Dispatching frame: board {:#04x}, act {:#04x}, addr {:#010x}",
            request.board,
            request.act,
            request.addr.get()
        );
        match request.board_id() {
            Board::Board1 => match request.action() {
                Action::Read => self.read(request),
                Action::Write => self.write(request),
                other => {
                    debug!("Unknown action {} ({:#04x})", other, request.act);
                    self.report_error(request, Action::NoSuchAct)
                }
            },
            // Reserved sub-targets: no handler, no reply
            Board::Board2 | Board::Board3 => {
                debug!("Reserved board {:#04x}, frame ignored", request.board);
                Ok(())
            }
            Board::Unknown(id) => {
                debug!("Unknown board {:#04x}", id);
                self.report_error(request, Action::NoSuchBoard)
            }
        }
    }

    /// Read `dataNum` bytes (clamped to 8) starting at the requested address
    /// and reply with them. Reply length is `7 + n`.
    fn read(&mut self, request: &MonitorFrame) -> Result<(), MonitorError<L::Error>> {
        let mut reply = MonitorFrame::new_zeroed();
        reply.board = request.board;
        reply.act = Action::ReadReturn.into();
        reply.addr = request.addr;

        let addr = request.addr.get();
        let len = request.payload_len();
        for i in 0..len {
            reply.data[i] = self.mem.read_byte(addr.wrapping_add(i as u32));
        }
        reply.data_num = len as u8;

        self.transmit(&reply, HEADER_LEN + len)
    }

    /// Program the full 8-byte data field (regardless of `dataNum`) as one
    /// double-word at the requested address. The fixed 7-byte reply carries
    /// `WriteReturn` only if the whole unlock/program/lock sequence succeeded;
    /// on a flash fault the action byte stays zero and the host infers
    /// failure from the missing acknowledgement.
    fn write(&mut self, request: &MonitorFrame) -> Result<(), MonitorError<L::Error>> {
        let mut reply = MonitorFrame::new_zeroed();
        reply.board = request.board;
        reply.addr = request.addr;

        let addr = request.addr.get();
        match self.program(addr, request.dword()) {
            Ok(()) => reply.act = Action::WriteReturn.into(),
            Err(e) => error!("Flash program at {:#010x} failed: {:?}", addr, e),
        }

        self.transmit(&reply, HEADER_LEN)
    }

    fn program(&mut self, addr: u32, value: u64) -> Result<(), F::Error> {
        self.flash.unlock()?;
        if let Err(e) = self.flash.program_double_word(addr, value) {
            // Best-effort relock; the program fault is what gets reported
            let _ = self.flash.lock();
            return Err(e);
        }
        self.flash.lock()
    }

    /// Send a fixed 8-byte error reply echoing board, address and dataNum
    /// from the request.
    fn report_error(
        &mut self,
        request: &MonitorFrame,
        code: Action,
    ) -> Result<(), MonitorError<L::Error>> {
        let mut reply = MonitorFrame::new_zeroed();
        reply.board = request.board;
        reply.act = code.into();
        reply.data_num = request.data_num;
        reply.addr = request.addr;

        self.transmit(&reply, ERROR_FRAME_LEN)
    }

    fn transmit(&mut self, reply: &MonitorFrame, len: usize) -> Result<(), MonitorError<L::Error>> {
        // Only the leading `len` bytes go out; the zeroed tail never does
        debug!("Transmitting {} byte reply, act {:#04x}", len, reply.act);
        self.link
            .transmit(&reply.as_bytes()[..len])
            .map_err(MonitorError::Link)
    }

    /// Frames dropped by the capacity-1 handoff (see [`FrameMailbox`]).
    pub fn overruns(&self) -> u32 {
        self.mailbox.overruns()
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// The underlying link, e.g. to reconfigure it between polls.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }
}
