//! Devices that can sit in a slot or on the I/O chain.
//!
//! The machine owns every device in one [`Devices`] arena. Slots and the
//! I/O chain refer to them by [`DeviceId`] so one device (the mapper) can
//! be reachable from both.

mod mapper;
mod music;
mod scc;

pub use mapper::{MapperRam, PAGE_SIZE, SEGMENT_COUNT};
pub use music::{FM_SIGNATURE, MsxMusic};
pub use scc::Scc;

use emu_core::{IoDevice, MemoryDevice};

/// An empty slot: reads float high, writes vanish.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoidMemory;

impl MemoryDevice for VoidMemory {
    fn write_mem(&mut self, _address: u16, _value: u8) -> bool {
        false
    }

    fn read_mem(&self, _address: u16) -> u8 {
        0xFF
    }
}

/// Which device a slot cell or I/O chain entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceId {
    Void,
    Mapper,
    Music,
    Scc,
    /// Index into the externally supplied memory devices.
    External(usize),
}

/// Owner of every device in the machine.
pub struct Devices {
    void: VoidMemory,
    pub mapper: MapperRam,
    pub music: MsxMusic,
    pub scc: Scc,
    external_memory: Vec<Box<dyn MemoryDevice>>,
    external_io: Vec<Box<dyn IoDevice>>,
}

impl Devices {
    #[must_use]
    pub fn new(mapper: MapperRam, music: MsxMusic, scc: Scc) -> Self {
        Self {
            void: VoidMemory,
            mapper,
            music,
            scc,
            external_memory: Vec::new(),
            external_io: Vec::new(),
        }
    }

    /// Take ownership of a collaborator's memory device.
    pub fn add_memory(&mut self, device: Box<dyn MemoryDevice>) -> DeviceId {
        self.external_memory.push(device);
        DeviceId::External(self.external_memory.len() - 1)
    }

    /// Take ownership of a collaborator's I/O device. Returns its index.
    pub fn add_io(&mut self, device: Box<dyn IoDevice>) -> usize {
        self.external_io.push(device);
        self.external_io.len() - 1
    }

    /// An unknown external index resolves to the void device.
    #[must_use]
    pub fn memory(&self, id: DeviceId) -> &dyn MemoryDevice {
        match id {
            DeviceId::Void => &self.void,
            DeviceId::Mapper => &self.mapper,
            DeviceId::Music => &self.music,
            DeviceId::Scc => &self.scc,
            DeviceId::External(i) => match self.external_memory.get(i) {
                Some(device) => device.as_ref(),
                None => &self.void,
            },
        }
    }

    pub fn memory_mut(&mut self, id: DeviceId) -> &mut dyn MemoryDevice {
        match id {
            DeviceId::Void => &mut self.void,
            DeviceId::Mapper => &mut self.mapper,
            DeviceId::Music => &mut self.music,
            DeviceId::Scc => &mut self.scc,
            DeviceId::External(i) => match self.external_memory.get_mut(i) {
                Some(device) => device.as_mut(),
                None => &mut self.void,
            },
        }
    }

    pub(crate) fn external_io_mut(&mut self, index: usize) -> Option<&mut (dyn IoDevice + 'static)> {
        self.external_io.get_mut(index).map(AsMut::as_mut)
    }

    /// Mute the sound cores.
    pub fn silence(&mut self) {
        self.music.silence();
        self.scc.silence();
    }
}
