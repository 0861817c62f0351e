//! The assembled machine and its run loop.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use emu_core::{Bus, Clock, IoDevice, MemoryDevice, SystemClock};
use zilog_z80::Z80;

use crate::bus::MsxBus;
use crate::config::MsxConfig;
use crate::device::{DeviceId, Devices, MapperRam, MsxMusic, Scc};
use crate::error::MsxError;
use crate::intercept::{Bios, Dos, ExtendedBios, Interceptor, SegmentTable};
use crate::io::{IoDispatch, IoTarget};
use crate::player::{PLAYER_COM, SONG_ADDRESS, STACK_TOP, TPA_START};
use crate::slot::{SlotAddress, SlotMatrix};
use crate::sound::SoundChips;

/// Top of the TPA as seen by COM programs (the operand of `JP BDOS` at 0x0005).
const TPA_TOP: u16 = 0x0006;

/// Cells seeded at setup, standing in for what the ROM and DOS leave behind.
const SEED: &[(u16, u8)] = &[
    // Slot of the RAM in each page: 3-0, expanded.
    (0xF341, 0x83),
    (0xF342, 0x83),
    (0xF343, 0x83),
    (0xF344, 0x83),
    // EXPTBL: every basic slot expanded.
    (0xFCC1, 0x80),
    (0xFCC2, 0x80),
    (0xFCC3, 0x80),
    (0xFCC4, 0x80),
    (0xFFF7, 0x80),
    // FDC work area, as MSX-DOS leaves it.
    (0xF349, 0xBB),
    (0xF34A, 0xE7),
    // H.NEWS and H.TIMI hooks: RET.
    (0xFF3E, 0xC9),
    (0xFD9F, 0xC9),
];

/// Segments paged in at boot.
const BOOT_SEGMENTS: std::ops::Range<u8> = 12..16;

/// Why [`Machine::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// PC reached 0x0000.
    Returned,
    /// The stop flag was raised.
    Stopped,
}

pub struct Machine {
    cpu: Z80,
    bus: MsxBus,
    intercept: Interceptor,
}

impl Machine {
    /// Real-time clock, silent sound chips, DOS output on stdout.
    #[must_use]
    pub fn setup(config: &MsxConfig) -> Self {
        Self::with_parts(config, SoundChips::silent(), Box::new(SystemClock::new()), Box::new(io::stdout()))
    }

    #[must_use]
    pub fn with_parts(
        config: &MsxConfig,
        sound: SoundChips,
        clock: Box<dyn Clock>,
        console: Box<dyn Write>,
    ) -> Self {
        let SoundChips { opll, psg, scc } = sound;
        let devices = Devices::new(MapperRam::new(config.mapper_fill), MsxMusic::new(opll, psg), Scc::new(scc));

        let mut slots = SlotMatrix::new();
        slots.bind(SlotAddress::new(3, 0), DeviceId::Mapper);
        slots.bind(SlotAddress::new(0, 2), DeviceId::Music);
        slots.bind(SlotAddress::new(1, 0), DeviceId::Scc);

        let mut io = IoDispatch::new();
        io.join(IoTarget::SlotSelect);
        io.join(IoTarget::Mapper);
        io.join(IoTarget::Music);

        let segments = if config.reserve_boot_segments {
            SegmentTable::with_reserved(BOOT_SEGMENTS)
        } else {
            SegmentTable::new()
        };
        let intercept = Interceptor::new(
            Bios::new(clock, config.vsync_micros),
            Dos::new(console, config.strict_dos),
            ExtendedBios::new(segments),
        );

        #[allow(unused_mut)]
        let mut cpu = Z80::new();
        #[cfg(feature = "pc-history")]
        cpu.set_history_capacity(config.pc_history);

        let mut machine = Self {
            cpu,
            bus: MsxBus::new(slots, devices, io),
            intercept,
        };
        machine.seed_memory();
        machine
    }

    fn seed_memory(&mut self) {
        self.bus.binary_to(0x0000, &[0; 0xF0]);
        for &(address, value) in SEED {
            self.bus.write(address, value);
        }
    }

    /// Write one byte through the current slot layout.
    pub fn memory_write(&mut self, address: u16, value: u8) {
        self.bus.write(address, value);
    }

    /// Load a block through the current slot layout.
    pub fn memory_write_block(&mut self, address: u16, bytes: &[u8]) {
        self.bus.binary_to(address, bytes);
    }

    /// Run from `start_pc` until PC returns to 0x0000 or `stop` is raised.
    ///
    /// The stack starts at `start_sp` with a 0x0000 return address on it, so
    /// a program that returns ends the run.
    pub fn run(&mut self, start_pc: u16, start_sp: u16, stop: Option<&AtomicBool>) -> Result<RunExit, MsxError> {
        self.bus.write_word(TPA_TOP, start_sp);
        self.cpu.reset_to(start_pc, start_sp);
        self.cpu.push16(&mut self.bus, 0x0000);
        log::debug!("run: PC={start_pc:#06X} SP={start_sp:#06X}");

        loop {
            if self.cpu.pc() == 0x0000 {
                return Ok(RunExit::Returned);
            }
            if stop.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Ok(RunExit::Stopped);
            }
            if let Err(error) = self.step() {
                self.log_history();
                return Err(error);
            }
        }
    }

    /// One instruction followed by call interception.
    pub fn step(&mut self) -> Result<(), MsxError> {
        self.cpu.step(&mut self.bus)?;
        self.intercept.service(&mut self.cpu, &mut self.bus)
    }

    /// Make `driver` resident, then play `song` with the bundled player.
    pub fn play(&mut self, driver: &[u8], song: &[u8], stop: Option<&AtomicBool>) -> Result<RunExit, MsxError> {
        self.memory_write_block(TPA_START, driver);
        if self.run(TPA_START, STACK_TOP, stop)? == RunExit::Stopped {
            return Ok(RunExit::Stopped);
        }
        self.memory_write_block(SONG_ADDRESS, song);
        self.memory_write_block(TPA_START, &PLAYER_COM);
        self.run(TPA_START, STACK_TOP, stop)
    }

    /// Mute every sound chip.
    pub fn silence(&mut self) {
        self.bus.devices.silence();
    }

    /// Plug a collaborator's memory device into a slot cell.
    pub fn attach_memory(&mut self, slot: SlotAddress, device: Box<dyn MemoryDevice>) {
        let id = self.bus.devices.add_memory(device);
        self.bus.slots.bind(slot, id);
    }

    /// Append a collaborator's I/O device to the end of the port chain.
    pub fn attach_io(&mut self, device: Box<dyn IoDevice>) {
        let index = self.bus.devices.add_io(device);
        self.bus.io.join(IoTarget::External(index));
    }

    #[must_use]
    pub fn cpu(&self) -> &Z80 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Z80 {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &MsxBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MsxBus {
        &mut self.bus
    }

    #[must_use]
    pub fn segments(&self) -> &SegmentTable {
        self.intercept.ext_bios.segments()
    }

    #[cfg(feature = "pc-history")]
    fn log_history(&self) {
        for regs in self.cpu.history().iter() {
            log::error!(
                "  PC={:04X} AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X}",
                regs.pc,
                regs.af(),
                regs.bc(),
                regs.de(),
                regs.hl(),
                regs.sp
            );
        }
    }

    #[cfg(not(feature = "pc-history"))]
    #[allow(clippy::unused_self)]
    fn log_history(&self) {}
}

impl Drop for Machine {
    fn drop(&mut self) {
        self.silence();
    }
}
