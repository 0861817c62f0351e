//! CPU errors.

use thiserror::Error;

use crate::decode::Prefix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Z80Error {
    /// The byte at `address` (after any prefix bytes) has no meaning.
    #[error("undefined opcode {opcode:#04X} (prefix {prefix}) at {address:#06X}")]
    UndefinedOpcode {
        address: u16,
        prefix: Prefix,
        opcode: u8,
    },
}
