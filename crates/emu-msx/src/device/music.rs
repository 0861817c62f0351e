//! MSX-MUSIC (FM-PAC style) cartridge with the PSG ports alongside.
//!
//! | Port | Direction | Function            |
//! |------|-----------|---------------------|
//! | 0x7C | out       | OPLL register latch |
//! | 0x7D | out       | OPLL register data  |
//! | 0xA0 | out       | PSG register latch  |
//! | 0xA1 | out       | PSG register data   |
//!
//! Drivers find the FM BIOS by reading its signature at 0x4018.

use emu_core::{IoDevice, MemoryDevice};

use crate::sound::SoundChip;

/// Signature bytes at 0x4018-0x401F.
pub const FM_SIGNATURE: &[u8; 8] = b"APRLOPLL";

const SIGNATURE_START: u16 = 0x4018;

pub struct MsxMusic {
    opll: Box<dyn SoundChip>,
    psg: Box<dyn SoundChip>,
}

impl MsxMusic {
    #[must_use]
    pub fn new(opll: Box<dyn SoundChip>, psg: Box<dyn SoundChip>) -> Self {
        Self { opll, psg }
    }

    /// Turn every FM channel and PSG voice all the way down.
    pub fn silence(&mut self) {
        for register in 0x30..=0x38 {
            self.opll.write_register(register, 0x0F);
        }
        for register in 0x08..=0x0A {
            self.psg.write_register(register, 0x00);
        }
    }
}

impl MemoryDevice for MsxMusic {
    fn write_mem(&mut self, _address: u16, _value: u8) -> bool {
        true
    }

    fn read_mem(&self, address: u16) -> u8 {
        address
            .checked_sub(SIGNATURE_START)
            .and_then(|i| FM_SIGNATURE.get(usize::from(i)))
            .copied()
            .unwrap_or(0xFF)
    }
}

impl IoDevice for MsxMusic {
    fn out_port(&mut self, port: u8, value: u8) -> bool {
        match port {
            0x7C => self.opll.write_address(value),
            0x7D => self.opll.write_data(value),
            0xA0 => self.psg.write_address(value),
            0xA1 => self.psg.write_data(value),
            _ => return false,
        }
        true
    }

    fn in_port(&mut self, _port: u8) -> Option<u8> {
        None
    }
}
