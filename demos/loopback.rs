//! Loopback demo: the monitor engine wired to in-process mocks.
//!
//! Builds a read and a write request the way the host tool would, pushes them
//! through the idle-line + poll path, and prints the parsed replies.
//!
//! Run with `cargo run --example loopback`.

use std::convert::Infallible;

use robomon::RobotMonitor;
use robomon::link::SerialLink;
use robomon::memory::{FlashAccess, MemoryBus};
use robomon::message::{Request, Response};
use robomon::packet::Board;
use tracing::info;

#[derive(Default)]
struct LoopLink {
    capture: Vec<u8>,
    sent: Vec<Vec<u8>>,
}

impl SerialLink for LoopLink {
    type Error = Infallible;

    fn arm_receive(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn halt_receive(&mut self) -> &[u8] {
        &self.capture
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.sent.push(frame.to_vec());
        Ok(())
    }
}

struct RamImage {
    base: u32,
    bytes: Vec<u8>,
}

impl MemoryBus for RamImage {
    fn read_byte(&self, addr: u32) -> u8 {
        self.bytes[(addr - self.base) as usize]
    }
}

struct LoggingFlash;

impl FlashAccess for LoggingFlash {
    type Error = Infallible;

    fn unlock(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn program_double_word(&mut self, addr: u32, value: u64) -> Result<(), Self::Error> {
        info!("Programming {:#018x} at {:#010x}", value, addr);
        Ok(())
    }

    fn lock(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mem = RamImage {
        base: 0x2000_0000,
        bytes: (0..16).collect(),
    };
    let mut monitor = RobotMonitor::new(LoopLink::default(), mem, LoggingFlash)?;

    let requests = [
        Request::Read {
            board: Board::Board1,
            addr: 0x2000_0004,
            len: 4,
        },
        Request::Write {
            board: Board::Board1,
            addr: 0x0801_0000,
            data: 0xDEAD_BEEF_CAFE_F00D,
        },
    ];

    for request in requests {
        monitor.link_mut().capture = request.to_wire().to_vec();
        monitor.on_idle_line()?;
        monitor.poll_once()?;

        let reply = monitor.link_mut().sent.pop().expect("engine sent no reply");
        info!("{:?} -> {:?}", request, Response::parse(&reply)?);
    }

    Ok(())
}
