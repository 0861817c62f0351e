//! MSX-DOS machine without ROMs.
//!
//! A Z80 on a slot-switched bus with a 256KB memory mapper, MSX-MUSIC and
//! SCC sound cartridges, and native stand-ins for the BIOS, MSX-DOS and
//! extended BIOS calls a resident music driver makes. Sound synthesis is
//! left to [`SoundChip`] implementations supplied by the host.
//!
//! ```no_run
//! use emu_msx::{Machine, MsxConfig};
//!
//! let mut msx = Machine::setup(&MsxConfig::default());
//! msx.memory_write_block(0x0100, &[0x3E, 0x2A, 0xC9]);
//! msx.run(0x0100, 0xD400, None)?;
//! assert_eq!(msx.cpu().regs().a, 0x2A);
//! # Ok::<(), emu_msx::MsxError>(())
//! ```

pub mod bus;
pub mod config;
pub mod device;
pub mod error;
pub mod intercept;
pub mod io;
pub mod machine;
pub mod player;
pub mod slot;
pub mod sound;

pub use bus::MsxBus;
pub use config::MsxConfig;
pub use error::MsxError;
pub use machine::{Machine, RunExit};
pub use slot::{SlotAddress, SlotMatrix};
pub use sound::{RecordingChip, SilentChip, SoundChip, SoundChips, SoundEvent};
