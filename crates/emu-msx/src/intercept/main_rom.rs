//! Main ROM exit point.

use zilog_z80::Z80;

use crate::bus::MsxBus;
use crate::slot::SlotAddress;

/// NEWSTT: where a driver ends up when it hands control back to BASIC.
pub const NEWSTT: u16 = 0x4601;

const MAIN_ROM_SLOT: SlotAddress = SlotAddress::new(0, 0);
const RAM_SLOT: SlotAddress = SlotAddress::new(3, 0);

/// End the run if control reaches NEWSTT with the main ROM paged in.
pub fn service(cpu: &mut Z80, bus: &mut MsxBus) {
    if cpu.pc() != NEWSTT || bus.slots.slot(1) != MAIN_ROM_SLOT {
        return;
    }
    log::info!("main rom: NEWSTT reached, ending run");
    cpu.set_pc(0x0000);
    bus.slots.change_slot(0, RAM_SLOT);
    bus.slots.change_slot(1, RAM_SLOT);
}
