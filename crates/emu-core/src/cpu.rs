//! CPU core trait.

use crate::Bus;

/// A CPU core that executes one whole instruction per step.
///
/// The bus is passed in, not owned, so the machine can inspect and patch
/// memory between instructions.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Error raised when an instruction cannot be executed.
    type Error;

    /// Fetch, decode and execute one instruction.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<(), Self::Error>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Reset the CPU to its power-on state.
    fn reset(&mut self);
}
