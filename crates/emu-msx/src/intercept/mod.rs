//! Native stand-ins for ROM and DOS entry points.
//!
//! After every instruction the layers look at PC in a fixed order: BIOS,
//! MSX-DOS, extended BIOS, main ROM. A layer that services a call usually
//! performs the RET itself, and the next layer sees the resulting PC.

pub mod bios;
pub mod dos;
pub mod extbios;
pub mod main_rom;

use zilog_z80::Z80;

use crate::bus::MsxBus;
use crate::error::MsxError;

pub use bios::Bios;
pub use dos::Dos;
pub use extbios::{ExtendedBios, SegmentOwner, SegmentTable};

pub struct Interceptor {
    pub bios: Bios,
    pub dos: Dos,
    pub ext_bios: ExtendedBios,
}

impl Interceptor {
    #[must_use]
    pub fn new(bios: Bios, dos: Dos, ext_bios: ExtendedBios) -> Self {
        Self { bios, dos, ext_bios }
    }

    pub fn service(&mut self, cpu: &mut Z80, bus: &mut MsxBus) -> Result<(), MsxError> {
        self.bios.service(cpu, bus)?;
        self.dos.service(cpu, bus)?;
        self.ext_bios.service(cpu, bus)?;
        main_rom::service(cpu, bus);
        Ok(())
    }
}
