//! Z80 CPU core.

mod execute;

use emu_core::{Bus, Cpu, Observable, Value};

use crate::decode::{BASE, Cond, IdxOperand, Index, Prefix, Reg8, Reg16};
use crate::error::Z80Error;
use crate::flags::{CF, HF, NF, PF, SF, ZF};
#[cfg(feature = "pc-history")]
use crate::history::PcHistory;
use crate::registers::Registers;

/// Z80 CPU.
///
/// The CPU does not own the bus. It is passed to [`Z80::step`] so the
/// machine can reach into memory between instructions.
pub struct Z80 {
    pub(crate) regs: Registers,
    /// Address of the first byte of the most recently started instruction.
    instruction_pc: u16,
    #[cfg(feature = "pc-history")]
    history: PcHistory,
}

impl Z80 {
    #[must_use]
    pub fn new() -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            instruction_pc: 0,
            #[cfg(feature = "pc-history")]
            history: PcHistory::new(0),
        };
        cpu.reset();
        cpu
    }

    /// Power-on state: AF and SP all ones, everything else zero,
    /// interrupts disabled in mode 0.
    pub fn reset(&mut self) {
        self.regs = Registers {
            a: 0xFF,
            f: 0xFF,
            sp: 0xFFFF,
            ..Registers::default()
        };
        self.instruction_pc = 0;
    }

    /// Reset, then start at `pc` with the stack at `sp`.
    pub fn reset_to(&mut self, pc: u16, sp: u16) {
        self.reset();
        self.regs.pc = pc;
        self.regs.sp = sp;
    }

    #[must_use]
    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.regs.pc = pc;
    }

    #[must_use]
    pub fn sp(&self) -> u16 {
        self.regs.sp
    }

    pub fn set_sp(&mut self, sp: u16) {
        self.regs.sp = sp;
    }

    /// Address of the instruction executed by the last `step()`.
    #[must_use]
    pub fn instruction_pc(&self) -> u16 {
        self.instruction_pc
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.regs.halted
    }

    /// Push a word: SP is decremented before each byte is written.
    pub fn push16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, (value >> 8) as u8);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, value as u8);
    }

    /// Pop a word: SP is incremented after each byte is read.
    pub fn pop16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from(hi) << 8 | u16::from(lo)
    }

    /// Return from a call made into code the machine handles natively.
    pub fn ret<B: Bus>(&mut self, bus: &mut B) {
        self.regs.pc = self.pop16(bus);
    }

    /// Disable maskable interrupts.
    pub fn di(&mut self) {
        self.regs.iff1 = false;
        self.regs.iff2 = false;
    }

    /// Fetch, decode and execute one instruction.
    ///
    /// A halted CPU stays put and returns immediately.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<(), Z80Error> {
        #[cfg(feature = "pc-history")]
        self.history.record(&self.regs);

        if self.regs.halted {
            return Ok(());
        }
        self.instruction_pc = self.regs.pc;
        let opcode = self.fetch_opcode(bus);
        self.dispatch(bus, Prefix::None, opcode, BASE[opcode as usize])
    }

    #[cfg(feature = "pc-history")]
    #[must_use]
    pub fn history(&self) -> &PcHistory {
        &self.history
    }

    /// Start keeping the last `capacity` register snapshots.
    #[cfg(feature = "pc-history")]
    pub fn set_history_capacity(&mut self, capacity: usize) {
        self.history = PcHistory::new(capacity);
    }

    // === Operand helpers ===

    fn fetch<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Opcode fetch (M1): also advances the low seven bits of R.
    fn fetch_opcode<B: Bus>(&mut self, bus: &mut B) -> u8 {
        self.regs.r = (self.regs.r & 0x80) | (self.regs.r.wrapping_add(1) & 0x7F);
        self.fetch(bus)
    }

    fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch(bus);
        let hi = self.fetch(bus);
        u16::from(hi) << 8 | u16::from(lo)
    }

    fn fetch_displacement<B: Bus>(&mut self, bus: &mut B) -> i16 {
        i16::from(self.fetch(bus) as i8)
    }

    fn read_word<B: Bus>(bus: &mut B, address: u16) -> u16 {
        let lo = bus.read(address);
        let hi = bus.read(address.wrapping_add(1));
        u16::from(hi) << 8 | u16::from(lo)
    }

    fn write_word<B: Bus>(bus: &mut B, address: u16, value: u16) {
        bus.write(address, value as u8);
        bus.write(address.wrapping_add(1), (value >> 8) as u8);
    }

    fn reg8(&self, r: Reg8) -> u8 {
        match r {
            Reg8::B => self.regs.b,
            Reg8::C => self.regs.c,
            Reg8::D => self.regs.d,
            Reg8::E => self.regs.e,
            Reg8::H => self.regs.h,
            Reg8::L => self.regs.l,
            Reg8::A => self.regs.a,
        }
    }

    fn set_reg8(&mut self, r: Reg8, value: u8) {
        match r {
            Reg8::B => self.regs.b = value,
            Reg8::C => self.regs.c = value,
            Reg8::D => self.regs.d = value,
            Reg8::E => self.regs.e = value,
            Reg8::H => self.regs.h = value,
            Reg8::L => self.regs.l = value,
            Reg8::A => self.regs.a = value,
        }
    }

    fn rp(&self, rp: Reg16) -> u16 {
        match rp {
            Reg16::Bc => self.regs.bc(),
            Reg16::De => self.regs.de(),
            Reg16::Hl => self.regs.hl(),
            Reg16::Sp => self.regs.sp,
        }
    }

    fn set_rp(&mut self, rp: Reg16, value: u16) {
        match rp {
            Reg16::Bc => self.regs.set_bc(value),
            Reg16::De => self.regs.set_de(value),
            Reg16::Hl => self.regs.set_hl(value),
            Reg16::Sp => self.regs.sp = value,
        }
    }

    fn index(&self, index: Index) -> u16 {
        match index {
            Index::Ix => self.regs.ix,
            Index::Iy => self.regs.iy,
        }
    }

    fn set_index(&mut self, index: Index, value: u16) {
        match index {
            Index::Ix => self.regs.ix = value,
            Index::Iy => self.regs.iy = value,
        }
    }

    fn idx_operand(&self, index: Index, operand: IdxOperand) -> u8 {
        match operand {
            IdxOperand::Reg(r) => self.reg8(r),
            IdxOperand::High => (self.index(index) >> 8) as u8,
            IdxOperand::Low => self.index(index) as u8,
        }
    }

    fn set_idx_operand(&mut self, index: Index, operand: IdxOperand, value: u8) {
        let word = self.index(index);
        match operand {
            IdxOperand::Reg(r) => self.set_reg8(r, value),
            IdxOperand::High => self.set_index(index, (word & 0x00FF) | (u16::from(value) << 8)),
            IdxOperand::Low => self.set_index(index, (word & 0xFF00) | u16::from(value)),
        }
    }

    /// A register pair as seen from the DD/FD tables, where HL means the index.
    fn index_rp(&self, index: Index, rp: Reg16) -> u16 {
        match rp {
            Reg16::Hl => self.index(index),
            other => self.rp(other),
        }
    }

    /// Consume the displacement byte and form `IX+d` / `IY+d`.
    fn index_address<B: Bus>(&mut self, bus: &mut B, index: Index) -> u16 {
        let d = self.fetch_displacement(bus);
        self.index(index).wrapping_add_signed(d)
    }

    fn condition(&self, cond: Cond) -> bool {
        let f = self.regs.f;
        match cond {
            Cond::Nz => f & ZF == 0,
            Cond::Z => f & ZF != 0,
            Cond::Nc => f & CF == 0,
            Cond::C => f & CF != 0,
            Cond::Po => f & PF == 0,
            Cond::Pe => f & PF != 0,
            Cond::P => f & SF == 0,
            Cond::M => f & SF != 0,
        }
    }
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu for Z80 {
    type Registers = Registers;
    type Error = Z80Error;

    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<(), Z80Error> {
        Z80::step(self, bus)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    fn reset(&mut self) {
        Z80::reset(self);
    }
}

impl Observable for Z80 {
    fn query(&self, path: &str) -> Option<Value> {
        let r = &self.regs;
        let value = match path {
            "pc" => r.pc.into(),
            "sp" => r.sp.into(),
            "a" => r.a.into(),
            "f" => r.f.into(),
            "bc" => r.bc().into(),
            "de" => r.de().into(),
            "hl" => r.hl().into(),
            "ix" => r.ix.into(),
            "iy" => r.iy.into(),
            "i" => r.i.into(),
            "r" => r.r.into(),
            "im" => r.im.into(),
            "iff1" => r.iff1.into(),
            "iff2" => r.iff2.into(),
            "halted" => r.halted.into(),
            "flags.s" => r.flag(SF).into(),
            "flags.z" => r.flag(ZF).into(),
            "flags.h" => r.flag(HF).into(),
            "flags.pv" => r.flag(PF).into(),
            "flags.n" => r.flag(NF).into(),
            "flags.c" => r.flag(CF).into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "sp", "a", "f", "bc", "de", "hl", "ix", "iy", "i", "r", "im", "iff1", "iff2", "halted", "flags.s",
            "flags.z", "flags.h", "flags.pv", "flags.n", "flags.c",
        ]
    }
}
