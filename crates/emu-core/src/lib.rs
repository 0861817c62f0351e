//! Core traits and types for instruction-stepped emulation.
//!
//! CPUs see the machine through [`Bus`]. Machines build that bus out of
//! [`MemoryDevice`] and [`IoDevice`] implementations, and anything that has
//! to wait on wall-clock time goes through a [`Clock`] so tests can fake it.

mod bus;
mod clock;
mod cpu;
mod device;
mod observable;

pub use bus::{Bus, SimpleBus};
pub use clock::{Clock, SystemClock};
pub use cpu::Cpu;
pub use device::{IoDevice, MemoryDevice};
pub use observable::{Observable, Value};
