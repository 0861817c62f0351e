//! MSX bus: memory through the slot matrix, ports through the I/O chain.

use emu_core::Bus;

use crate::device::Devices;
use crate::io::IoDispatch;
use crate::slot::{SECONDARY_SLOT_LATCH, SlotMatrix};

/// JIFFY, the BIOS frame counter.
pub const JIFFY: u16 = 0xFC9E;

pub struct MsxBus {
    pub slots: SlotMatrix,
    pub devices: Devices,
    pub io: IoDispatch,
}

impl MsxBus {
    #[must_use]
    pub fn new(slots: SlotMatrix, devices: Devices, io: IoDispatch) -> Self {
        Self { slots, devices, io }
    }

    /// Read through the current page table, bypassing the 0xFFFF latch.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.devices.memory(self.slots.device_for(address)).read_mem(address)
    }

    fn poke(&mut self, address: u16, value: u8) {
        let id = self.slots.device_for(address);
        self.devices.memory_mut(id).write_mem(address, value);
    }

    /// Little-endian word at JIFFY.
    ///
    /// `_address` is ignored: the only caller reads the frame counter, and
    /// this accessor has always read that fixed cell.
    #[must_use]
    pub fn read_word(&mut self, _address: u16) -> u16 {
        let lo = self.read(JIFFY);
        let hi = self.read(JIFFY.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub fn write_word(&mut self, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(address, lo);
        self.write(address.wrapping_add(1), hi);
    }

    /// Bytes from `address` up to the next NUL, one char per byte.
    ///
    /// Stops after one full trip round the address space if no NUL turns up.
    #[must_use]
    pub fn read_string(&self, address: u16) -> String {
        let mut text = String::new();
        let mut cursor = address;
        for _ in 0..=u16::MAX {
            let byte = self.peek(cursor);
            if byte == 0 {
                break;
            }
            text.push(char::from(byte));
            cursor = cursor.wrapping_add(1);
        }
        text
    }

    /// Copy `bytes` to consecutive addresses from `dest`, wrapping at 64K.
    pub fn binary_to(&mut self, dest: u16, bytes: &[u8]) {
        let mut cursor = dest;
        for &byte in bytes {
            self.poke(cursor, byte);
            cursor = cursor.wrapping_add(1);
        }
    }
}

impl Bus for MsxBus {
    fn read(&mut self, address: u16) -> u8 {
        if address == SECONDARY_SLOT_LATCH {
            self.slots.read_secondary()
        } else {
            self.peek(address)
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        if address == SECONDARY_SLOT_LATCH {
            self.slots.write_secondary(value);
        } else {
            self.poke(address, value);
        }
    }

    fn input(&mut self, port: u8) -> u8 {
        self.io.input(&mut self.slots, &mut self.devices, port)
    }

    fn output(&mut self, port: u8, value: u8) {
        self.io.out(&mut self.slots, &mut self.devices, port, value);
    }
}
