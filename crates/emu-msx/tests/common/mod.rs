#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

use emu_core::Clock;
use emu_msx::{Machine, MsxConfig, SoundChips};

/// Program load address used by every test.
pub const ORG: u16 = 0x0100;
pub const STACK: u16 = 0xD400;

/// Time only moves when a test or a sleep moves it.
#[derive(Clone, Default)]
pub struct FakeClock {
    now: Rc<Cell<u64>>,
    slept: Rc<Cell<u64>>,
}

impl FakeClock {
    pub fn advance(&self, micros: u64) {
        self.now.set(self.now.get() + micros);
    }

    /// Total microseconds spent in `sleep_micros`.
    pub fn slept(&self) -> u64 {
        self.slept.get()
    }
}

impl Clock for FakeClock {
    fn now_micros(&self) -> u64 {
        self.now.get()
    }

    fn sleep_micros(&mut self, micros: u64) {
        self.advance(micros);
        self.slept.set(self.slept.get() + micros);
    }
}

/// DOS console capture.
#[derive(Clone, Default)]
pub struct Console(Rc<RefCell<Vec<u8>>>);

impl Console {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Console {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Rig {
    pub msx: Machine,
    pub clock: FakeClock,
    pub console: Console,
}

pub fn rig_with(config: &MsxConfig, sound: SoundChips) -> Rig {
    let clock = FakeClock::default();
    let console = Console::default();
    let msx = Machine::with_parts(config, sound, Box::new(clock.clone()), Box::new(console.clone()));
    Rig { msx, clock, console }
}

pub fn rig() -> Rig {
    rig_with(&MsxConfig::default().with_strict_dos(true), SoundChips::silent())
}

/// Load `program` at 0x0100 and run it with the usual stack.
pub fn run(rig: &mut Rig, program: &[u8]) -> Result<emu_msx::RunExit, emu_msx::MsxError> {
    rig.msx.memory_write_block(ORG, program);
    rig.msx.run(ORG, STACK, None)
}
