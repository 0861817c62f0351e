//! Instruction-stepped Zilog Z80 interpreter.
//!
//! Each call to [`Z80::step`] fetches, decodes and executes one complete
//! instruction through an [`emu_core::Bus`]. Timing is not modelled.

mod alu;
mod cpu;
mod decode;
mod error;
mod flags;
#[cfg(feature = "pc-history")]
mod history;
mod registers;

pub use alu::{AluResult, AluResult16, adc16, add8, add16, and8, cp8, daa, dec8, inc8, neg8, or8, rotate, sbc16, sub8, xor8};
pub use cpu::Z80;
pub use decode::{AluOp, BlockKind, Cond, IdxOperand, Index, Op, Prefix, Reg8, Reg16, RotOp, StackReg};
pub use error::Z80Error;
pub use flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
#[cfg(feature = "pc-history")]
pub use history::PcHistory;
pub use registers::Registers;

/// Look up the decode tables without executing anything.
pub mod tables {
    pub use crate::decode::{BASE, CB, DD, DDCB, ED, FD, FDCB};
}
