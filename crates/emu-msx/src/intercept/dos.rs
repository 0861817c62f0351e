//! MSX-DOS function calls through 0x0005.

use std::io::Write;

use emu_core::Bus;
use zilog_z80::{Z80, ZF};

use crate::bus::MsxBus;
use crate::error::MsxError;

pub const BDOS: u16 = 0x0005;

/// Console output, character in E.
pub const CONOUT: u8 = 0x02;
/// String output from DE.
pub const STROUT: u8 = 0x09;
/// Terminate with error code in B.
pub const TERM: u8 = 0x62;
/// Get environment item.
pub const GENV: u8 = 0x6B;
/// Set environment item.
pub const SENV: u8 = 0x6C;
/// Get MSX-DOS version.
pub const DOSVER: u8 = 0x6F;

/// Kernel 2.30.
const KERNEL_VERSION: u16 = 0x0230;
/// MSXDOS2.SYS 2.20.
const SYSTEM_VERSION: u16 = 0x0220;

/// Environment items the resident drivers ask for.
const ENVIRONMENT: &[(&str, &str)] = &[("PARAMETERS", "/K0 /Z"), ("SHELL", "A:\\COMMAND2.COM")];

pub struct Dos {
    console: Box<dyn Write>,
    strict: bool,
}

impl Dos {
    #[must_use]
    pub fn new(console: Box<dyn Write>, strict: bool) -> Self {
        Self { console, strict }
    }

    pub fn service(&mut self, cpu: &mut Z80, bus: &mut MsxBus) -> Result<(), MsxError> {
        if cpu.pc() != BDOS {
            return Ok(());
        }
        let function = cpu.regs().c;
        log::trace!("dos: function {function:#04X}");
        match function {
            CONOUT => {
                self.console.write_all(&[cpu.regs().e])?;
                self.console.flush()?;
            }
            STROUT => {
                let mut text = Vec::new();
                let mut address = cpu.regs().de();
                loop {
                    let byte = bus.read(address);
                    if byte == b'$' || byte == 0 {
                        break;
                    }
                    text.push(byte);
                    address = address.wrapping_add(1);
                }
                self.console.write_all(&text)?;
                self.console.flush()?;
            }
            TERM => {
                log::info!("dos: terminate with error code {}", cpu.regs().b);
                cpu.set_pc(0x0000);
                return Ok(());
            }
            GENV => {
                let regs = cpu.regs();
                let (name, dest) = (bus.read_string(regs.hl()), regs.de());
                let value = ENVIRONMENT
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map_or("", |(_, value)| *value);
                log::debug!("dos: GENV {name:?} = {value:?}");
                let mut bytes = value.as_bytes().to_vec();
                bytes.push(0);
                bus.binary_to(dest, &bytes);
                let regs = cpu.regs_mut();
                regs.a = 0;
                regs.set_flag(ZF, true);
            }
            SENV => cpu.regs_mut().a = 0,
            DOSVER => {
                let regs = cpu.regs_mut();
                regs.set_bc(KERNEL_VERSION);
                regs.set_de(SYSTEM_VERSION);
                regs.a = 0;
            }
            function if self.strict => {
                log::error!("dos: unsupported function {function:#04X}");
                return Err(MsxError::UnsupportedDosCall { function });
            }
            function => {
                log::warn!("dos: unsupported function {function:#04X}, returning A=B=0");
                let regs = cpu.regs_mut();
                regs.a = 0;
                regs.b = 0;
            }
        }
        cpu.ret(bus);
        Ok(())
    }
}
