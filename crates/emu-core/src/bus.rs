//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// The CPU performs every memory and port access through this trait. The
/// implementation decides which device answers, so the CPU never knows
/// about banking or slot selection.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte from an 8-bit I/O port.
    fn input(&mut self, port: u8) -> u8;

    /// Write a byte to an 8-bit I/O port.
    fn output(&mut self, port: u8, value: u8);
}

/// Flat 64KB RAM with a 256-byte port file.
///
/// Port writes are latched so a later read of the same port returns the
/// last value written; unwritten ports read 0xFF. Useful for exercising a
/// CPU without any machine around it.
pub struct SimpleBus {
    memory: Box<[u8; 0x1_0000]>,
    ports: [u8; 256],
    outputs: Vec<(u8, u8)>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x1_0000]),
            ports: [0xFF; 256],
            outputs: Vec::new(),
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at 0xFFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.memory[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read memory without going through the `Bus` trait.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    /// Preset the value returned by `input(port)`.
    pub fn set_port(&mut self, port: u8, value: u8) {
        self.ports[port as usize] = value;
    }

    /// Every `(port, value)` pair written so far, in order.
    #[must_use]
    pub fn outputs(&self) -> &[(u8, u8)] {
        &self.outputs
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }

    fn input(&mut self, port: u8) -> u8 {
        self.ports[port as usize]
    }

    fn output(&mut self, port: u8, value: u8) {
        self.ports[port as usize] = value;
        self.outputs.push((port, value));
    }
}
