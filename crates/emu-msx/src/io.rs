//! I/O port dispatch.
//!
//! Each port access is offered to the chain in join order. The first
//! device that claims the port answers it.

use emu_core::IoDevice;

use crate::device::Devices;
use crate::slot::SlotMatrix;

/// Value read from a port nobody claims.
pub const UNCLAIMED_PORT: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoTarget {
    /// Basic-slot select at 0xA8.
    SlotSelect,
    Mapper,
    Music,
    /// Index into the externally supplied I/O devices.
    External(usize),
}

#[derive(Debug, Default)]
pub struct IoDispatch {
    chain: Vec<IoTarget>,
}

impl IoDispatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, target: IoTarget) {
        self.chain.push(target);
    }

    #[must_use]
    pub fn chain(&self) -> &[IoTarget] {
        &self.chain
    }

    /// Returns whether any device took the write.
    pub fn out(&self, slots: &mut SlotMatrix, devices: &mut Devices, port: u8, value: u8) -> bool {
        let handled = self
            .chain
            .iter()
            .any(|&target| resolve(target, slots, devices).is_some_and(|device| device.out_port(port, value)));
        if !handled {
            log::trace!("io: unclaimed OUT ({port:#04X}),{value:#04X}");
        }
        handled
    }

    pub fn input(&self, slots: &mut SlotMatrix, devices: &mut Devices, port: u8) -> u8 {
        self.chain
            .iter()
            .find_map(|&target| resolve(target, slots, devices).and_then(|device| device.in_port(port)))
            .unwrap_or(UNCLAIMED_PORT)
    }
}

fn resolve<'a>(
    target: IoTarget,
    slots: &'a mut SlotMatrix,
    devices: &'a mut Devices,
) -> Option<&'a mut (dyn IoDevice + 'static)> {
    let device: &'a mut (dyn IoDevice + 'static) = match target {
        IoTarget::SlotSelect => slots,
        IoTarget::Mapper => &mut devices.mapper,
        IoTarget::Music => &mut devices.music,
        IoTarget::External(index) => devices.external_io_mut(index)?,
    };
    Some(device)
}
