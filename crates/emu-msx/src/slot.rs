//! Slot matrix and page table.
//!
//! Sixteen cells (4 basic slots x 4 extended slots) each name a device.
//! Every CPU page selects one cell. Port 0xA8 selects basic slots for all
//! four pages at once, and the latch at 0xFFFF selects extended slots.

use std::fmt;

use emu_core::{IoDevice, Observable, Value};

use crate::device::DeviceId;

/// Port carrying the basic-slot byte.
pub const PRIMARY_SLOT_PORT: u8 = 0xA8;

/// Memory address of the extended-slot latch.
pub const SECONDARY_SLOT_LATCH: u16 = 0xFFFF;

/// A (basic, extended) slot pair. Both fields are two bits wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotAddress {
    basic: u8,
    ext: u8,
}

impl SlotAddress {
    /// Out-of-range values are masked to two bits.
    #[must_use]
    pub const fn new(basic: u8, ext: u8) -> Self {
        Self {
            basic: basic & 3,
            ext: ext & 3,
        }
    }

    /// Decode the `E000BBBB` style slot byte the BIOS uses: bits 0-1 basic,
    /// bits 2-3 extended.
    #[must_use]
    pub const fn from_bios_byte(value: u8) -> Self {
        Self::new(value, value >> 2)
    }

    #[must_use]
    pub const fn basic(self) -> u8 {
        self.basic
    }

    #[must_use]
    pub const fn ext(self) -> u8 {
        self.ext
    }
}

impl fmt::Display for SlotAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.basic, self.ext)
    }
}

/// Page of a CPU address.
#[must_use]
pub const fn page_of(address: u16) -> u8 {
    (address >> 14) as u8
}

pub struct SlotMatrix {
    cells: [[DeviceId; 4]; 4],
    pages: [SlotAddress; 4],
}

impl SlotMatrix {
    /// Every cell void, every page on slot 3-0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: [[DeviceId::Void; 4]; 4],
            pages: [SlotAddress::new(3, 0); 4],
        }
    }

    /// Put `device` in a cell. A later bind to the same cell replaces it.
    pub fn bind(&mut self, slot: SlotAddress, device: DeviceId) {
        self.cells[usize::from(slot.basic)][usize::from(slot.ext)] = device;
    }

    pub fn change_slot(&mut self, page: u8, slot: SlotAddress) {
        log::debug!("slot: page {} -> {slot}", page & 3);
        self.pages[usize::from(page & 3)] = slot;
    }

    #[must_use]
    pub fn slot(&self, page: u8) -> SlotAddress {
        self.pages[usize::from(page & 3)]
    }

    /// Device answering `address` under the current page table.
    #[must_use]
    pub fn device_for(&self, address: u16) -> DeviceId {
        let slot = self.pages[usize::from(page_of(address))];
        self.cells[usize::from(slot.basic)][usize::from(slot.ext)]
    }

    /// Extended-slot latch write: two bits per page, page 0 lowest.
    pub fn write_secondary(&mut self, value: u8) {
        for (page, slot) in self.pages.iter_mut().enumerate() {
            slot.ext = (value >> (page * 2)) & 3;
        }
    }

    /// Extended-slot latch readback. The hardware latch reads inverted.
    #[must_use]
    pub fn read_secondary(&self) -> u8 {
        !self.pack(|slot| slot.ext)
    }

    pub fn write_primary(&mut self, value: u8) {
        for (page, slot) in self.pages.iter_mut().enumerate() {
            slot.basic = (value >> (page * 2)) & 3;
        }
    }

    #[must_use]
    pub fn read_primary(&self) -> u8 {
        self.pack(|slot| slot.basic)
    }

    fn pack(&self, field: impl Fn(&SlotAddress) -> u8) -> u8 {
        self.pages
            .iter()
            .enumerate()
            .fold(0, |acc, (page, slot)| acc | (field(slot) << (page * 2)))
    }
}

impl Default for SlotMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl IoDevice for SlotMatrix {
    fn out_port(&mut self, port: u8, value: u8) -> bool {
        if port != PRIMARY_SLOT_PORT {
            return false;
        }
        self.write_primary(value);
        true
    }

    fn in_port(&mut self, port: u8) -> Option<u8> {
        (port == PRIMARY_SLOT_PORT).then(|| self.read_primary())
    }
}

impl Observable for SlotMatrix {
    fn query(&self, path: &str) -> Option<Value> {
        let page = match path {
            "page0" => 0,
            "page1" => 1,
            "page2" => 2,
            "page3" => 3,
            "primary" => return Some(self.read_primary().into()),
            "secondary" => return Some(self.read_secondary().into()),
            _ => return None,
        };
        Some(self.pages[page].to_string().into())
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["page0", "page1", "page2", "page3", "primary", "secondary"]
    }
}
