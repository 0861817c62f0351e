//! Errors that end a run.

use std::io;

use thiserror::Error;
use zilog_z80::Z80Error;

#[derive(Debug, Error)]
pub enum MsxError {
    #[error(transparent)]
    Cpu(#[from] Z80Error),

    #[error("unsupported BIOS call at {address:#06X}")]
    UnsupportedBiosCall { address: u16 },

    /// CALSL to anything other than GETCPU in slot 0-0.
    #[error("unsupported inter-slot call to {slot}-{ext}:{ix:#06X}")]
    UnsupportedSlotCall { slot: u8, ext: u8, ix: u16 },

    #[error("unsupported extended BIOS device {device:#04X} (function {function:#04X})")]
    UnsupportedExtendedBios { device: u8, function: u8 },

    #[error("unsupported mapper call {name} at {address:#06X}")]
    UnsupportedMapperCall { address: u16, name: &'static str },

    #[error("unsupported MSX-DOS function {function:#04X}")]
    UnsupportedDosCall { function: u8 },

    #[error("console write failed: {0}")]
    Console(#[from] io::Error),
}
