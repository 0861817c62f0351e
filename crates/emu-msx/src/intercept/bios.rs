//! Main BIOS entry points in page 0.

use emu_core::{Bus, Clock};
use zilog_z80::Z80;

use crate::bus::MsxBus;
use crate::error::MsxError;
use crate::slot::{SlotAddress, page_of};

/// Read a byte from another slot.
pub const RDSLT: u16 = 0x000C;
/// Write a byte to another slot.
pub const WRSLT: u16 = 0x0014;
/// Inter-slot call.
pub const CALSL: u16 = 0x001C;
/// Select a slot for a page.
pub const ENASLT: u16 = 0x0024;
/// Far call with the slot and address inline after the call.
pub const CALLF: u16 = 0x0030;
pub const KEYINT: u16 = 0x0038;
/// Start a 16ms frame.
pub const ST16MS: u16 = 0x0039;
/// Wait for the end of the frame started by [`ST16MS`].
pub const WT16MS: u16 = 0x003A;

/// Slot-select mirror for page 0, pages 1-3 follow.
pub const EXPTBL_MIRROR: u16 = 0xF341;

/// Sub-ROM routine CALSL is allowed to reach.
const GETCPU: u16 = 0x0183;

pub struct Bios {
    clock: Box<dyn Clock>,
    vsync_micros: u64,
    frame_start: u64,
}

impl Bios {
    #[must_use]
    pub fn new(clock: Box<dyn Clock>, vsync_micros: u64) -> Self {
        let frame_start = clock.now_micros();
        Self {
            clock,
            vsync_micros,
            frame_start,
        }
    }

    pub fn service(&mut self, cpu: &mut Z80, bus: &mut MsxBus) -> Result<(), MsxError> {
        let pc = cpu.pc();
        if pc >= 0x0100 {
            return Ok(());
        }
        match pc {
            ST16MS => {
                log::trace!("bios: ST16MS");
                self.frame_start = self.clock.now_micros();
                cpu.ret(bus);
            }
            WT16MS => {
                self.wait_frame();
                cpu.ret(bus);
            }
            RDSLT => {
                let regs = cpu.regs();
                let (address, slot) = (regs.hl(), SlotAddress::from_bios_byte(regs.a));
                let page = page_of(address);
                let saved = bus.slots.slot(page);
                bus.slots.change_slot(page, slot);
                cpu.regs_mut().a = bus.read(address);
                bus.slots.change_slot(page, saved);
                log::trace!("bios: RDSLT {slot}:{address:#06X}");
                cpu.di();
                cpu.ret(bus);
            }
            WRSLT => {
                log::warn!("bios: WRSLT is not implemented, write dropped");
                cpu.di();
                cpu.ret(bus);
            }
            CALSL => {
                let regs = cpu.regs();
                let (slot, ext, ix) = (((regs.iy >> 8) & 3) as u8, ((regs.iy >> 10) & 3) as u8, regs.ix);
                if (slot, ext, ix) != (0, 0, GETCPU) {
                    log::error!("bios: CALSL to {slot}-{ext}:{ix:#06X} is not supported");
                    return Err(MsxError::UnsupportedSlotCall { slot, ext, ix });
                }
                // Z80 mode.
                cpu.regs_mut().a = 0;
                cpu.ret(bus);
            }
            ENASLT => {
                let regs = cpu.regs();
                let (page, value) = ((regs.h >> 6) & 3, regs.a);
                bus.slots.change_slot(page, SlotAddress::from_bios_byte(value));
                bus.write(EXPTBL_MIRROR + u16::from(page), value);
                cpu.di();
                cpu.ret(bus);
            }
            CALLF => {
                // The inline slot byte is skipped and the call stays in the
                // current slot layout.
                let inline = cpu.pop16(bus).wrapping_add(1);
                let lo = bus.read(inline);
                let hi = bus.read(inline.wrapping_add(1));
                cpu.push16(bus, inline.wrapping_add(2));
                let target = u16::from_le_bytes([lo, hi]);
                log::trace!("bios: CALLF {target:#06X}");
                cpu.set_pc(target);
            }
            KEYINT => cpu.ret(bus),
            // Warm boot and the DOS entry belong to other layers.
            0x0000 | 0x0005 => {}
            address => {
                log::error!("bios: unsupported call at {address:#06X}");
                return Err(MsxError::UnsupportedBiosCall { address });
            }
        }
        Ok(())
    }

    /// Block until a full frame has passed since the last frame start.
    fn wait_frame(&mut self) {
        let elapsed = self.clock.now_micros().saturating_sub(self.frame_start);
        if elapsed < self.vsync_micros {
            self.clock.sleep_micros(self.vsync_micros - elapsed);
        }
        self.frame_start = self.clock.now_micros();
    }
}
