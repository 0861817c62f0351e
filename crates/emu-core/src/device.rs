//! Contracts for memory-mapped and port-mapped devices.

/// A device that answers CPU memory accesses.
///
/// Devices see the full 16-bit CPU address, not an offset into their page.
/// A device that does not decode an address stays inert: it returns a fill
/// value such as 0xFF and ignores the write.
pub trait MemoryDevice {
    /// Write a byte. Returns true if the device decoded the address.
    fn write_mem(&mut self, address: u16, value: u8) -> bool;

    /// Read a byte.
    fn read_mem(&self, address: u16) -> u8;
}

/// A device that answers 8-bit I/O port accesses.
pub trait IoDevice {
    /// Write to a port. Returns true if the device claimed the port.
    fn out_port(&mut self, port: u8, value: u8) -> bool;

    /// Read from a port. Returns `None` if the device does not claim it.
    fn in_port(&mut self, port: u8) -> Option<u8>;
}
