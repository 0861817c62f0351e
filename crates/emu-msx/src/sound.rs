//! Register-level contract with the sound chip cores.
//!
//! Synthesis lives outside this crate. Devices only forward the bytes the
//! CPU writes, in order, to a [`SoundChip`].

use std::cell::RefCell;
use std::rc::Rc;

/// A sound core that accepts register writes.
pub trait SoundChip {
    /// Latch the register number for the next data write.
    fn write_address(&mut self, value: u8);

    /// Write to the latched register.
    fn write_data(&mut self, value: u8);

    /// Write `value` to `register` directly.
    ///
    /// Memory-mapped chips (SCC) pass the CPU address as the register.
    fn write_register(&mut self, register: u16, value: u8) {
        self.write_address(register as u8);
        self.write_data(value);
    }
}

/// Discards every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentChip;

impl SoundChip for SilentChip {
    fn write_address(&mut self, _value: u8) {}

    fn write_data(&mut self, _value: u8) {}

    fn write_register(&mut self, _register: u16, _value: u8) {}
}

/// One forwarded write, as seen by a [`RecordingChip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    Address(u8),
    Data(u8),
    Register(u16, u8),
}

/// Appends every write to a shared log.
///
/// Clones share the log, so keep one handle and give the other to the
/// machine.
#[derive(Debug, Default, Clone)]
pub struct RecordingChip {
    log: Rc<RefCell<Vec<SoundEvent>>>,
}

impl RecordingChip {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<SoundEvent> {
        self.log.borrow().clone()
    }
}

impl SoundChip for RecordingChip {
    fn write_address(&mut self, value: u8) {
        self.log.borrow_mut().push(SoundEvent::Address(value));
    }

    fn write_data(&mut self, value: u8) {
        self.log.borrow_mut().push(SoundEvent::Data(value));
    }

    fn write_register(&mut self, register: u16, value: u8) {
        self.log.borrow_mut().push(SoundEvent::Register(register, value));
    }
}

/// The three cores an MSX-MUSIC + SCC setup drives.
pub struct SoundChips {
    /// FM (YM2413), behind ports 0x7C/0x7D.
    pub opll: Box<dyn SoundChip>,
    /// PSG (AY-3-8910), behind ports 0xA0/0xA1.
    pub psg: Box<dyn SoundChip>,
    /// Konami SCC, memory-mapped in slot 1.
    pub scc: Box<dyn SoundChip>,
}

impl SoundChips {
    #[must_use]
    pub fn silent() -> Self {
        Self {
            opll: Box::new(SilentChip),
            psg: Box::new(SilentChip),
            scc: Box::new(SilentChip),
        }
    }
}

impl Default for SoundChips {
    fn default() -> Self {
        Self::silent()
    }
}
