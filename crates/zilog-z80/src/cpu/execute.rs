//! Instruction execution for the Z80.

use emu_core::Bus;

use crate::alu::{self, AluResult};
use crate::decode::{AluOp, BlockKind, CB, DD, DDCB, ED, FD, FDCB, Index, Op, Prefix, RotOp, StackReg};
use crate::error::Z80Error;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, sz53, sz53p};

use super::Z80;

impl Z80 {
    /// Execute `op`, decoded from `opcode` in the `prefix` table.
    pub(super) fn dispatch<B: Bus>(&mut self, bus: &mut B, prefix: Prefix, opcode: u8, op: Op) -> Result<(), Z80Error> {
        match op {
            Op::Undefined => {
                log::error!(
                    "undefined opcode {opcode:#04X} (prefix {prefix}) at {:#06X}",
                    self.instruction_pc
                );
                return Err(Z80Error::UndefinedOpcode {
                    address: self.instruction_pc,
                    prefix,
                    opcode,
                });
            }

            // =================================================================
            // Prefixes
            // =================================================================
            Op::PrefixCb => {
                let next = self.fetch_opcode(bus);
                return self.dispatch(bus, Prefix::Cb, next, CB[next as usize]);
            }
            Op::PrefixDd => {
                let next = self.fetch_opcode(bus);
                return self.dispatch(bus, Prefix::Dd, next, DD[next as usize]);
            }
            Op::PrefixEd => {
                let next = self.fetch_opcode(bus);
                return self.dispatch(bus, Prefix::Ed, next, ED[next as usize]);
            }
            Op::PrefixFd => {
                let next = self.fetch_opcode(bus);
                return self.dispatch(bus, Prefix::Fd, next, FD[next as usize]);
            }
            Op::PrefixIdxCb(index) => {
                // DD CB d op: the displacement sits at PC and the opcode after
                // it. The handler consumes d; the opcode byte is skipped here.
                let (table, prefix) = match index {
                    Index::Ix => (&DDCB, Prefix::DdCb),
                    Index::Iy => (&FDCB, Prefix::FdCb),
                };
                let last = bus.read(self.regs.pc.wrapping_add(1));
                self.dispatch(bus, prefix, last, table[last as usize])?;
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }

            // =================================================================
            // Unprefixed
            // =================================================================
            Op::Nop => {}

            Op::LdRpImm(rp) => {
                let value = self.fetch_word(bus);
                self.set_rp(rp, value);
            }
            Op::LdBcA => bus.write(self.regs.bc(), self.regs.a),
            Op::LdDeA => bus.write(self.regs.de(), self.regs.a),
            Op::LdABc => self.regs.a = bus.read(self.regs.bc()),
            Op::LdADe => self.regs.a = bus.read(self.regs.de()),
            Op::IncRp(rp) => self.set_rp(rp, self.rp(rp).wrapping_add(1)),
            Op::DecRp(rp) => self.set_rp(rp, self.rp(rp).wrapping_sub(1)),

            Op::IncR(r) => {
                let result = alu::inc8(self.reg8(r));
                self.set_reg8(r, result.value);
                self.keep_carry(result);
            }
            Op::DecR(r) => {
                let result = alu::dec8(self.reg8(r));
                self.set_reg8(r, result.value);
                self.keep_carry(result);
            }
            Op::IncHlInd => {
                let addr = self.regs.hl();
                self.inc_mem(bus, addr);
            }
            Op::DecHlInd => {
                let addr = self.regs.hl();
                self.dec_mem(bus, addr);
            }
            Op::LdRImm(r) => {
                let value = self.fetch(bus);
                self.set_reg8(r, value);
            }
            Op::LdHlIndImm => {
                let value = self.fetch(bus);
                bus.write(self.regs.hl(), value);
            }

            Op::Rlca => {
                let a = self.regs.a;
                self.accumulator_rotate(a.rotate_left(1), a & 0x80 != 0);
            }
            Op::Rrca => {
                let a = self.regs.a;
                self.accumulator_rotate(a.rotate_right(1), a & 0x01 != 0);
            }
            Op::Rla => {
                let a = self.regs.a;
                self.accumulator_rotate((a << 1) | u8::from(self.regs.carry()), a & 0x80 != 0);
            }
            Op::Rra => {
                let a = self.regs.a;
                self.accumulator_rotate((a >> 1) | (u8::from(self.regs.carry()) << 7), a & 0x01 != 0);
            }

            Op::ExAfAf => self.regs.swap_af(),

            Op::AddHlRp(rp) => {
                let result = alu::add16(self.regs.hl(), self.rp(rp));
                self.regs.set_hl(result.value);
                self.regs.f = (self.regs.f & (SF | ZF | PF)) | result.flags;
            }

            Op::Djnz => {
                let d = self.fetch_displacement(bus);
                self.regs.b = self.regs.b.wrapping_sub(1);
                if self.regs.b != 0 {
                    self.regs.pc = self.regs.pc.wrapping_add_signed(d);
                }
            }
            Op::Jr => {
                let d = self.fetch_displacement(bus);
                self.regs.pc = self.regs.pc.wrapping_add_signed(d);
            }
            Op::JrCond(cond) => {
                let d = self.fetch_displacement(bus);
                if self.condition(cond) {
                    self.regs.pc = self.regs.pc.wrapping_add_signed(d);
                }
            }

            Op::LdAbsHl => {
                let addr = self.fetch_word(bus);
                Self::write_word(bus, addr, self.regs.hl());
            }
            Op::LdHlAbs => {
                let addr = self.fetch_word(bus);
                let value = Self::read_word(bus, addr);
                self.regs.set_hl(value);
            }
            Op::LdAbsA => {
                let addr = self.fetch_word(bus);
                bus.write(addr, self.regs.a);
            }
            Op::LdAAbs => {
                let addr = self.fetch_word(bus);
                self.regs.a = bus.read(addr);
            }

            Op::Daa => {
                let result = alu::daa(self.regs.a, self.regs.f);
                self.regs.a = result.value;
                self.regs.f = result.flags;
            }
            Op::Cpl => {
                self.regs.a = !self.regs.a;
                self.regs.f = (self.regs.f & (SF | ZF | PF | CF)) | HF | NF | (self.regs.a & (YF | XF));
            }
            Op::Scf => {
                self.regs.f = (self.regs.f & (SF | ZF | PF)) | CF | (self.regs.a & (YF | XF));
            }
            Op::Ccf => {
                let old_carry = self.regs.f & CF;
                let carry_bits = if old_carry != 0 { HF } else { CF };
                self.regs.f = (self.regs.f & (SF | ZF | PF)) | carry_bits | (self.regs.a & (YF | XF));
            }

            Op::LdRR(dst, src) => self.set_reg8(dst, self.reg8(src)),
            Op::LdRHlInd(r) => {
                let value = bus.read(self.regs.hl());
                self.set_reg8(r, value);
            }
            Op::LdHlIndR(r) => bus.write(self.regs.hl(), self.reg8(r)),

            Op::Halt => self.regs.halted = true,

            Op::AluR(alu_op, r) => self.alu_a(alu_op, self.reg8(r)),
            Op::AluHlInd(alu_op) => {
                let value = bus.read(self.regs.hl());
                self.alu_a(alu_op, value);
            }
            Op::AluImm(alu_op) => {
                let value = self.fetch(bus);
                self.alu_a(alu_op, value);
            }

            Op::RetCond(cond) => {
                if self.condition(cond) {
                    self.ret(bus);
                }
            }
            Op::Ret => self.ret(bus),

            Op::Pop(reg) => {
                let value = self.pop16(bus);
                match reg {
                    StackReg::Bc => self.regs.set_bc(value),
                    StackReg::De => self.regs.set_de(value),
                    StackReg::Hl => self.regs.set_hl(value),
                    StackReg::Af => self.regs.set_af(value),
                }
            }
            Op::Push(reg) => {
                let value = match reg {
                    StackReg::Bc => self.regs.bc(),
                    StackReg::De => self.regs.de(),
                    StackReg::Hl => self.regs.hl(),
                    StackReg::Af => self.regs.af(),
                };
                self.push16(bus, value);
            }

            Op::JpCond(cond) => {
                let target = self.fetch_word(bus);
                if self.condition(cond) {
                    self.regs.pc = target;
                }
            }
            Op::Jp => self.regs.pc = self.fetch_word(bus),
            Op::CallCond(cond) => {
                let target = self.fetch_word(bus);
                if self.condition(cond) {
                    self.call(bus, target);
                }
            }
            Op::Call => {
                let target = self.fetch_word(bus);
                self.call(bus, target);
            }
            Op::Rst(vector) => self.call(bus, u16::from(vector)),

            Op::OutImmA => {
                let port = self.fetch(bus);
                bus.output(port, self.regs.a);
            }
            Op::InAImm => {
                let port = self.fetch(bus);
                self.regs.a = bus.input(port);
            }

            Op::Exx => self.regs.swap_main(),
            Op::ExSpHl => {
                let sp = self.regs.sp;
                let value = Self::read_word(bus, sp);
                Self::write_word(bus, sp, self.regs.hl());
                self.regs.set_hl(value);
            }
            Op::JpHl => self.regs.pc = self.regs.hl(),
            Op::ExDeHl => {
                let de = self.regs.de();
                self.regs.set_de(self.regs.hl());
                self.regs.set_hl(de);
            }
            Op::LdSpHl => self.regs.sp = self.regs.hl(),
            Op::Di => self.di(),
            Op::Ei => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
            }

            // =================================================================
            // CB: rotates, shifts and bit operations
            // =================================================================
            Op::Rot(rot, r) => {
                let result = alu::rotate(rot, self.reg8(r), self.regs.carry());
                self.set_reg8(r, result.value);
                self.regs.f = result.flags;
            }
            Op::RotHlInd(rot) => {
                let addr = self.regs.hl();
                self.rotate_mem(bus, rot, addr);
            }
            Op::Bit(bit, r) => {
                let value = self.reg8(r);
                self.bit_test(bit, value, value);
            }
            Op::BitHlInd(bit) => {
                let addr = self.regs.hl();
                let value = bus.read(addr);
                self.bit_test(bit, value, (addr >> 8) as u8);
            }
            Op::Res(bit, r) => self.set_reg8(r, self.reg8(r) & !(1 << bit)),
            Op::ResHlInd(bit) => {
                let addr = self.regs.hl();
                let value = bus.read(addr);
                bus.write(addr, value & !(1 << bit));
            }
            Op::Set(bit, r) => self.set_reg8(r, self.reg8(r) | (1 << bit)),
            Op::SetHlInd(bit) => {
                let addr = self.regs.hl();
                let value = bus.read(addr);
                bus.write(addr, value | (1 << bit));
            }

            // =================================================================
            // ED
            // =================================================================
            Op::InRC(r) => {
                let value = bus.input(self.regs.c);
                self.set_reg8(r, value);
                self.regs.f = (self.regs.f & CF) | sz53p(value);
            }
            Op::OutCR(r) => bus.output(self.regs.c, self.reg8(r)),
            Op::SbcHl(rp) => {
                let result = alu::sbc16(self.regs.hl(), self.rp(rp), self.regs.carry());
                self.regs.set_hl(result.value);
                self.regs.f = result.flags;
            }
            Op::AdcHl(rp) => {
                let result = alu::adc16(self.regs.hl(), self.rp(rp), self.regs.carry());
                self.regs.set_hl(result.value);
                self.regs.f = result.flags;
            }
            Op::LdAbsRp(rp) => {
                let addr = self.fetch_word(bus);
                Self::write_word(bus, addr, self.rp(rp));
            }
            Op::LdRpAbs(rp) => {
                let addr = self.fetch_word(bus);
                let value = Self::read_word(bus, addr);
                self.set_rp(rp, value);
            }
            Op::Neg => {
                let result = alu::neg8(self.regs.a);
                self.regs.a = result.value;
                self.regs.f = result.flags;
            }
            Op::Retn | Op::Reti => {
                self.ret(bus);
                self.regs.iff1 = self.regs.iff2;
            }
            Op::Im(mode) => self.regs.im = mode,
            Op::LdIA => self.regs.i = self.regs.a,
            Op::LdRA => self.regs.r = self.regs.a,
            Op::LdAI => {
                self.regs.a = self.regs.i;
                self.load_special_flags();
            }
            Op::LdAR => {
                self.regs.a = self.regs.r;
                self.load_special_flags();
            }
            Op::Rrd => {
                let addr = self.regs.hl();
                let mem = bus.read(addr);
                let a = self.regs.a;
                bus.write(addr, (a << 4) | (mem >> 4));
                self.regs.a = (a & 0xF0) | (mem & 0x0F);
                self.regs.f = (self.regs.f & CF) | sz53p(self.regs.a);
            }
            Op::Rld => {
                let addr = self.regs.hl();
                let mem = bus.read(addr);
                let a = self.regs.a;
                bus.write(addr, (mem << 4) | (a & 0x0F));
                self.regs.a = (a & 0xF0) | (mem >> 4);
                self.regs.f = (self.regs.f & CF) | sz53p(self.regs.a);
            }
            Op::Block {
                kind,
                increment,
                repeat,
            } => self.block(bus, kind, increment, repeat),

            // =================================================================
            // DD / FD: index registers
            // =================================================================
            Op::AddIdxRp(index, rp) => {
                let result = alu::add16(self.index(index), self.index_rp(index, rp));
                self.set_index(index, result.value);
                self.regs.f = (self.regs.f & (SF | ZF | PF)) | result.flags;
            }
            Op::LdIdxImm(index) => {
                let value = self.fetch_word(bus);
                self.set_index(index, value);
            }
            Op::LdAbsIdx(index) => {
                let addr = self.fetch_word(bus);
                Self::write_word(bus, addr, self.index(index));
            }
            Op::LdIdxAbs(index) => {
                let addr = self.fetch_word(bus);
                let value = Self::read_word(bus, addr);
                self.set_index(index, value);
            }
            Op::IncIdx(index) => self.set_index(index, self.index(index).wrapping_add(1)),
            Op::DecIdx(index) => self.set_index(index, self.index(index).wrapping_sub(1)),
            Op::IncIdxInd(index) => {
                let addr = self.index_address(bus, index);
                self.inc_mem(bus, addr);
            }
            Op::DecIdxInd(index) => {
                let addr = self.index_address(bus, index);
                self.dec_mem(bus, addr);
            }
            Op::LdIdxIndImm(index) => {
                // DD 36 d n: displacement first, then the immediate.
                let addr = self.index_address(bus, index);
                let value = self.fetch(bus);
                bus.write(addr, value);
            }
            Op::LdRIdxInd(index, r) => {
                let addr = self.index_address(bus, index);
                let value = bus.read(addr);
                self.set_reg8(r, value);
            }
            Op::LdIdxIndR(index, r) => {
                let addr = self.index_address(bus, index);
                bus.write(addr, self.reg8(r));
            }
            Op::LdIdxHalf(index, dst, src) => {
                let value = self.idx_operand(index, src);
                self.set_idx_operand(index, dst, value);
            }
            Op::AluIdxInd(index, alu_op) => {
                let addr = self.index_address(bus, index);
                let value = bus.read(addr);
                self.alu_a(alu_op, value);
            }
            Op::PopIdx(index) => {
                let value = self.pop16(bus);
                self.set_index(index, value);
            }
            Op::PushIdx(index) => self.push16(bus, self.index(index)),
            Op::ExSpIdx(index) => {
                let sp = self.regs.sp;
                let value = Self::read_word(bus, sp);
                Self::write_word(bus, sp, self.index(index));
                self.set_index(index, value);
            }
            Op::JpIdx(index) => self.regs.pc = self.index(index),
            Op::LdSpIdx(index) => self.regs.sp = self.index(index),

            // =================================================================
            // DD CB / FD CB
            // =================================================================
            Op::RotIdxInd(index, rot) => {
                let addr = self.index_address(bus, index);
                self.rotate_mem(bus, rot, addr);
            }
            Op::BitIdxInd(index, bit) => {
                let addr = self.index_address(bus, index);
                let value = bus.read(addr);
                self.bit_test(bit, value, (addr >> 8) as u8);
            }
            Op::ResIdxInd(index, bit) => {
                let addr = self.index_address(bus, index);
                let value = bus.read(addr);
                bus.write(addr, value & !(1 << bit));
            }
            Op::SetIdxInd(index, bit) => {
                let addr = self.index_address(bus, index);
                let value = bus.read(addr);
                bus.write(addr, value | (1 << bit));
            }
        }
        Ok(())
    }

    fn call<B: Bus>(&mut self, bus: &mut B, target: u16) {
        self.push16(bus, self.regs.pc);
        self.regs.pc = target;
    }

    /// Store an INC/DEC style result, keeping the old carry.
    fn keep_carry(&mut self, result: AluResult) {
        self.regs.f = (self.regs.f & CF) | result.flags;
    }

    fn inc_mem<B: Bus>(&mut self, bus: &mut B, addr: u16) {
        let result = alu::inc8(bus.read(addr));
        bus.write(addr, result.value);
        self.keep_carry(result);
    }

    fn dec_mem<B: Bus>(&mut self, bus: &mut B, addr: u16) {
        let result = alu::dec8(bus.read(addr));
        bus.write(addr, result.value);
        self.keep_carry(result);
    }

    fn rotate_mem<B: Bus>(&mut self, bus: &mut B, rot: RotOp, addr: u16) {
        let result = alu::rotate(rot, bus.read(addr), self.regs.carry());
        bus.write(addr, result.value);
        self.regs.f = result.flags;
    }

    /// RLCA/RRCA/RLA/RRA: S, Z and P/V survive.
    fn accumulator_rotate(&mut self, value: u8, carry: bool) {
        self.regs.a = value;
        self.regs.f = (self.regs.f & (SF | ZF | PF)) | (value & (YF | XF)) | if carry { CF } else { 0 };
    }

    /// Apply an accumulator ALU op. CP leaves A alone.
    fn alu_a(&mut self, op: AluOp, value: u8) {
        let a = self.regs.a;
        let carry = self.regs.carry();
        let result = match op {
            AluOp::Add => alu::add8(a, value, false),
            AluOp::Adc => alu::add8(a, value, carry),
            AluOp::Sub => alu::sub8(a, value, false),
            AluOp::Sbc => alu::sub8(a, value, carry),
            AluOp::And => alu::and8(a, value),
            AluOp::Xor => alu::xor8(a, value),
            AluOp::Or => alu::or8(a, value),
            AluOp::Cp => alu::cp8(a, value),
        };
        self.regs.a = result.value;
        self.regs.f = result.flags;
    }

    /// BIT n: Z and P/V mirror the inverted bit; X/Y come from `undoc`.
    fn bit_test(&mut self, bit: u8, value: u8, undoc: u8) {
        let set = value & (1 << bit) != 0;
        let mut f = (self.regs.f & CF) | HF | (undoc & (YF | XF));
        if !set {
            f |= ZF | PF;
        }
        if set && bit == 7 {
            f |= SF;
        }
        self.regs.f = f;
    }

    /// LD A,I and LD A,R: P/V reports IFF2.
    fn load_special_flags(&mut self) {
        let mut f = (self.regs.f & CF) | sz53(self.regs.a);
        if self.regs.iff2 {
            f |= PF;
        }
        self.regs.f = f;
    }

    /// LDI/LDD/CPI/CPD/INI/IND/OUTI/OUTD and their repeating forms.
    ///
    /// Repeating forms run to completion inside one step.
    fn block<B: Bus>(&mut self, bus: &mut B, kind: BlockKind, increment: bool, repeat: bool) {
        let step = |v: u16| if increment { v.wrapping_add(1) } else { v.wrapping_sub(1) };
        match kind {
            BlockKind::Load => loop {
                let value = bus.read(self.regs.hl());
                bus.write(self.regs.de(), value);
                self.regs.set_hl(step(self.regs.hl()));
                self.regs.set_de(step(self.regs.de()));
                let bc = self.regs.bc().wrapping_sub(1);
                self.regs.set_bc(bc);

                let n = value.wrapping_add(self.regs.a);
                let mut f = (self.regs.f & (SF | ZF | CF)) | (n & XF) | ((n << 4) & YF);
                if bc != 0 {
                    f |= PF;
                }
                self.regs.f = f;
                if !repeat || bc == 0 {
                    break;
                }
            },
            BlockKind::Compare => loop {
                let value = bus.read(self.regs.hl());
                let diff = alu::sub8(self.regs.a, value, false);
                self.regs.set_hl(step(self.regs.hl()));
                let bc = self.regs.bc().wrapping_sub(1);
                self.regs.set_bc(bc);

                let n = diff.value.wrapping_sub(u8::from(diff.flags & HF != 0));
                let mut f = (self.regs.f & CF) | (diff.flags & (SF | ZF | HF)) | NF | (n & XF) | ((n << 4) & YF);
                if bc != 0 {
                    f |= PF;
                }
                self.regs.f = f;
                if !repeat || bc == 0 || diff.value == 0 {
                    break;
                }
            },
            BlockKind::In => loop {
                let value = bus.input(self.regs.c);
                bus.write(self.regs.hl(), value);
                self.regs.set_hl(step(self.regs.hl()));
                self.regs.b = self.regs.b.wrapping_sub(1);
                self.regs.f = (self.regs.f & CF) | sz53(self.regs.b) | NF;
                if !repeat || self.regs.b == 0 {
                    break;
                }
            },
            BlockKind::Out => loop {
                let value = bus.read(self.regs.hl());
                self.regs.b = self.regs.b.wrapping_sub(1);
                bus.output(self.regs.c, value);
                self.regs.set_hl(step(self.regs.hl()));
                self.regs.f = (self.regs.f & CF) | sz53(self.regs.b) | NF;
                if !repeat || self.regs.b == 0 {
                    break;
                }
            },
        }
    }
}
