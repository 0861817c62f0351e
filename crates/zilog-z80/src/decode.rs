//! Opcode decode tables.
//!
//! Each instruction family has a 256-entry table built at compile time.
//! Every byte decodes to an [`Op`]; bytes with no documented meaning decode
//! to [`Op::Undefined`], so a lookup never misses.

/// 8-bit register operand, in encoding order (6 is `(HL)` and has no variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
}

/// 16-bit register pair in the `dd`/`ss` encoding.
///
/// Inside the DD/FD tables, `Hl` stands for the selected index register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg16 {
    Bc,
    De,
    Hl,
    Sp,
}

/// 8-bit operand of a DD/FD register-to-register load, where the `H` and
/// `L` codes name the high and low halves of the index register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdxOperand {
    Reg(Reg8),
    High,
    Low,
}

/// 16-bit register pair in the PUSH/POP (`qq`) encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackReg {
    Bc,
    De,
    Hl,
    Af,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Nz,
    Z,
    Nc,
    C,
    Po,
    Pe,
    P,
    M,
}

/// Accumulator operation selected by bits 3-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

/// CB-family rotate or shift selected by bits 3-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Sll,
    Srl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    Ix,
    Iy,
}

/// What a block instruction moves or compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Load,
    Compare,
    In,
    Out,
}

/// The table an opcode was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    None,
    Cb,
    Dd,
    Ed,
    Fd,
    DdCb,
    FdCb,
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Prefix::None => "none",
            Prefix::Cb => "CB",
            Prefix::Dd => "DD",
            Prefix::Ed => "ED",
            Prefix::Fd => "FD",
            Prefix::DdCb => "DD CB",
            Prefix::FdCb => "FD CB",
        };
        f.write_str(name)
    }
}

/// A decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Undefined,

    // Unprefixed
    Nop,
    LdRpImm(Reg16),
    LdBcA,
    LdDeA,
    LdABc,
    LdADe,
    IncRp(Reg16),
    DecRp(Reg16),
    IncR(Reg8),
    DecR(Reg8),
    IncHlInd,
    DecHlInd,
    LdRImm(Reg8),
    LdHlIndImm,
    Rlca,
    Rrca,
    Rla,
    Rra,
    ExAfAf,
    AddHlRp(Reg16),
    Djnz,
    Jr,
    JrCond(Cond),
    LdAbsHl,
    LdHlAbs,
    LdAbsA,
    LdAAbs,
    Daa,
    Cpl,
    Scf,
    Ccf,
    LdRR(Reg8, Reg8),
    LdRHlInd(Reg8),
    LdHlIndR(Reg8),
    Halt,
    AluR(AluOp, Reg8),
    AluHlInd(AluOp),
    AluImm(AluOp),
    RetCond(Cond),
    Ret,
    Pop(StackReg),
    Push(StackReg),
    JpCond(Cond),
    Jp,
    CallCond(Cond),
    Call,
    Rst(u8),
    OutImmA,
    InAImm,
    Exx,
    ExSpHl,
    JpHl,
    ExDeHl,
    LdSpHl,
    Di,
    Ei,
    PrefixCb,
    PrefixDd,
    PrefixEd,
    PrefixFd,

    // CB
    Rot(RotOp, Reg8),
    RotHlInd(RotOp),
    Bit(u8, Reg8),
    BitHlInd(u8),
    Res(u8, Reg8),
    ResHlInd(u8),
    Set(u8, Reg8),
    SetHlInd(u8),

    // ED
    InRC(Reg8),
    OutCR(Reg8),
    SbcHl(Reg16),
    AdcHl(Reg16),
    LdAbsRp(Reg16),
    LdRpAbs(Reg16),
    Neg,
    Retn,
    Reti,
    Im(u8),
    LdIA,
    LdRA,
    LdAI,
    LdAR,
    Rrd,
    Rld,
    Block {
        kind: BlockKind,
        increment: bool,
        repeat: bool,
    },

    // DD / FD
    AddIdxRp(Index, Reg16),
    LdIdxImm(Index),
    LdAbsIdx(Index),
    LdIdxAbs(Index),
    IncIdx(Index),
    DecIdx(Index),
    IncIdxInd(Index),
    DecIdxInd(Index),
    LdIdxIndImm(Index),
    LdRIdxInd(Index, Reg8),
    LdIdxIndR(Index, Reg8),
    /// `LD dst,src` with IXH/IXL (or IYH/IYL) in place of H and L.
    LdIdxHalf(Index, IdxOperand, IdxOperand),
    AluIdxInd(Index, AluOp),
    PopIdx(Index),
    PushIdx(Index),
    ExSpIdx(Index),
    JpIdx(Index),
    LdSpIdx(Index),
    PrefixIdxCb(Index),

    // DD CB / FD CB
    RotIdxInd(Index, RotOp),
    BitIdxInd(Index, u8),
    ResIdxInd(Index, u8),
    SetIdxInd(Index, u8),
}

const fn reg8(code: u8) -> Option<Reg8> {
    match code & 7 {
        0 => Some(Reg8::B),
        1 => Some(Reg8::C),
        2 => Some(Reg8::D),
        3 => Some(Reg8::E),
        4 => Some(Reg8::H),
        5 => Some(Reg8::L),
        7 => Some(Reg8::A),
        _ => None,
    }
}

const fn idx_operand(code: u8) -> Option<IdxOperand> {
    match code & 7 {
        4 => Some(IdxOperand::High),
        5 => Some(IdxOperand::Low),
        _ => match reg8(code) {
            Some(r) => Some(IdxOperand::Reg(r)),
            None => None,
        },
    }
}

const fn reg16(code: u8) -> Reg16 {
    match code & 3 {
        0 => Reg16::Bc,
        1 => Reg16::De,
        2 => Reg16::Hl,
        _ => Reg16::Sp,
    }
}

const fn stack_reg(code: u8) -> StackReg {
    match code & 3 {
        0 => StackReg::Bc,
        1 => StackReg::De,
        2 => StackReg::Hl,
        _ => StackReg::Af,
    }
}

const fn cond(code: u8) -> Cond {
    match code & 7 {
        0 => Cond::Nz,
        1 => Cond::Z,
        2 => Cond::Nc,
        3 => Cond::C,
        4 => Cond::Po,
        5 => Cond::Pe,
        6 => Cond::P,
        _ => Cond::M,
    }
}

const fn alu_op(code: u8) -> AluOp {
    match code & 7 {
        0 => AluOp::Add,
        1 => AluOp::Adc,
        2 => AluOp::Sub,
        3 => AluOp::Sbc,
        4 => AluOp::And,
        5 => AluOp::Xor,
        6 => AluOp::Or,
        _ => AluOp::Cp,
    }
}

const fn rot_op(code: u8) -> RotOp {
    match code & 7 {
        0 => RotOp::Rlc,
        1 => RotOp::Rrc,
        2 => RotOp::Rl,
        3 => RotOp::Rr,
        4 => RotOp::Sla,
        5 => RotOp::Sra,
        6 => RotOp::Sll,
        _ => RotOp::Srl,
    }
}

// Opcode fields: x = bits 6-7, y = bits 3-5, z = bits 0-2, p = y >> 1, q = y & 1.

const fn decode_base(op: u8) -> Op {
    let x = op >> 6;
    let y = (op >> 3) & 7;
    let z = op & 7;
    let p = y >> 1;
    let q = y & 1;

    match x {
        0 => match z {
            0 => match y {
                0 => Op::Nop,
                1 => Op::ExAfAf,
                2 => Op::Djnz,
                3 => Op::Jr,
                _ => Op::JrCond(cond(y - 4)),
            },
            1 if q == 0 => Op::LdRpImm(reg16(p)),
            1 => Op::AddHlRp(reg16(p)),
            2 => match y {
                0 => Op::LdBcA,
                1 => Op::LdABc,
                2 => Op::LdDeA,
                3 => Op::LdADe,
                4 => Op::LdAbsHl,
                5 => Op::LdHlAbs,
                6 => Op::LdAbsA,
                _ => Op::LdAAbs,
            },
            3 if q == 0 => Op::IncRp(reg16(p)),
            3 => Op::DecRp(reg16(p)),
            4 => match reg8(y) {
                Some(r) => Op::IncR(r),
                None => Op::IncHlInd,
            },
            5 => match reg8(y) {
                Some(r) => Op::DecR(r),
                None => Op::DecHlInd,
            },
            6 => match reg8(y) {
                Some(r) => Op::LdRImm(r),
                None => Op::LdHlIndImm,
            },
            _ => match y {
                0 => Op::Rlca,
                1 => Op::Rrca,
                2 => Op::Rla,
                3 => Op::Rra,
                4 => Op::Daa,
                5 => Op::Cpl,
                6 => Op::Scf,
                _ => Op::Ccf,
            },
        },
        1 => match (reg8(y), reg8(z)) {
            (Some(dst), Some(src)) => Op::LdRR(dst, src),
            (Some(dst), None) => Op::LdRHlInd(dst),
            (None, Some(src)) => Op::LdHlIndR(src),
            (None, None) => Op::Halt,
        },
        2 => match reg8(z) {
            Some(r) => Op::AluR(alu_op(y), r),
            None => Op::AluHlInd(alu_op(y)),
        },
        _ => match z {
            0 => Op::RetCond(cond(y)),
            1 => match (q, p) {
                (0, _) => Op::Pop(stack_reg(p)),
                (_, 0) => Op::Ret,
                (_, 1) => Op::Exx,
                (_, 2) => Op::JpHl,
                _ => Op::LdSpHl,
            },
            2 => Op::JpCond(cond(y)),
            3 => match y {
                0 => Op::Jp,
                1 => Op::PrefixCb,
                2 => Op::OutImmA,
                3 => Op::InAImm,
                4 => Op::ExSpHl,
                5 => Op::ExDeHl,
                6 => Op::Di,
                _ => Op::Ei,
            },
            4 => Op::CallCond(cond(y)),
            5 => match (q, p) {
                (0, _) => Op::Push(stack_reg(p)),
                (_, 0) => Op::Call,
                (_, 1) => Op::PrefixDd,
                (_, 2) => Op::PrefixEd,
                _ => Op::PrefixFd,
            },
            6 => Op::AluImm(alu_op(y)),
            _ => Op::Rst(y * 8),
        },
    }
}

const fn decode_cb(op: u8) -> Op {
    let y = (op >> 3) & 7;
    let r = reg8(op);
    match (op >> 6, r) {
        (0, Some(r)) => Op::Rot(rot_op(y), r),
        (0, None) => Op::RotHlInd(rot_op(y)),
        (1, Some(r)) => Op::Bit(y, r),
        (1, None) => Op::BitHlInd(y),
        (2, Some(r)) => Op::Res(y, r),
        (2, None) => Op::ResHlInd(y),
        (_, Some(r)) => Op::Set(y, r),
        (_, None) => Op::SetHlInd(y),
    }
}

const fn decode_ed(op: u8) -> Op {
    let x = op >> 6;
    let y = (op >> 3) & 7;
    let z = op & 7;
    let p = y >> 1;
    let q = y & 1;

    match x {
        1 => match z {
            0 => match reg8(y) {
                Some(r) => Op::InRC(r),
                None => Op::Undefined,
            },
            1 => match reg8(y) {
                Some(r) => Op::OutCR(r),
                None => Op::Undefined,
            },
            2 if q == 0 => Op::SbcHl(reg16(p)),
            2 => Op::AdcHl(reg16(p)),
            3 if q == 0 => Op::LdAbsRp(reg16(p)),
            3 => Op::LdRpAbs(reg16(p)),
            4 if y == 0 => Op::Neg,
            5 if y == 0 => Op::Retn,
            5 if y == 1 => Op::Reti,
            6 => match y {
                0 => Op::Im(0),
                2 => Op::Im(1),
                3 => Op::Im(2),
                _ => Op::Undefined,
            },
            7 => match y {
                0 => Op::LdIA,
                1 => Op::LdRA,
                2 => Op::LdAI,
                3 => Op::LdAR,
                4 => Op::Rrd,
                5 => Op::Rld,
                _ => Op::Undefined,
            },
            _ => Op::Undefined,
        },
        2 if y >= 4 && z <= 3 => Op::Block {
            kind: match z {
                0 => BlockKind::Load,
                1 => BlockKind::Compare,
                2 => BlockKind::In,
                _ => BlockKind::Out,
            },
            increment: y & 1 == 0,
            repeat: y >= 6,
        },
        _ => Op::Undefined,
    }
}

const fn decode_index(index: Index, op: u8) -> Op {
    let y = (op >> 3) & 7;
    let z = op & 7;
    match op {
        0x09 | 0x19 | 0x29 | 0x39 => Op::AddIdxRp(index, reg16(op >> 4)),
        0x21 => Op::LdIdxImm(index),
        0x22 => Op::LdAbsIdx(index),
        0x2A => Op::LdIdxAbs(index),
        0x23 => Op::IncIdx(index),
        0x2B => Op::DecIdx(index),
        0x34 => Op::IncIdxInd(index),
        0x35 => Op::DecIdxInd(index),
        0x36 => Op::LdIdxIndImm(index),
        0x76 => Op::Undefined,
        0x40..=0x7F if z == 6 => match reg8(y) {
            Some(r) => Op::LdRIdxInd(index, r),
            None => Op::Undefined,
        },
        0x70..=0x77 => match reg8(z) {
            Some(r) => Op::LdIdxIndR(index, r),
            None => Op::Undefined,
        },
        0x40..=0x7F if y == 4 || y == 5 || z == 4 || z == 5 => match (idx_operand(y), idx_operand(z)) {
            (Some(dst), Some(src)) => Op::LdIdxHalf(index, dst, src),
            _ => Op::Undefined,
        },
        0x80..=0xBF if z == 6 => Op::AluIdxInd(index, alu_op(y)),
        0xCB => Op::PrefixIdxCb(index),
        0xE1 => Op::PopIdx(index),
        0xE3 => Op::ExSpIdx(index),
        0xE5 => Op::PushIdx(index),
        0xE9 => Op::JpIdx(index),
        0xF9 => Op::LdSpIdx(index),
        _ => Op::Undefined,
    }
}

/// The final byte of a DD CB d op / FD CB d op sequence.
///
/// Only the `(IX+d)` forms (low bits 110) are defined, except BIT which
/// ignores the register field.
const fn decode_index_cb(index: Index, op: u8) -> Op {
    let y = (op >> 3) & 7;
    let memory = op & 7 == 6;
    match op >> 6 {
        1 => Op::BitIdxInd(index, y),
        0 if memory => Op::RotIdxInd(index, rot_op(y)),
        2 if memory => Op::ResIdxInd(index, y),
        3 if memory => Op::SetIdxInd(index, y),
        _ => Op::Undefined,
    }
}

macro_rules! table {
    ($decode:ident $(, $arg:expr)*) => {{
        let mut table = [Op::Undefined; 256];
        let mut i = 0;
        while i < 256 {
            table[i] = $decode($($arg,)* i as u8);
            i += 1;
        }
        table
    }};
}

pub static BASE: [Op; 256] = table!(decode_base);
pub static CB: [Op; 256] = table!(decode_cb);
pub static ED: [Op; 256] = table!(decode_ed);
pub static DD: [Op; 256] = table!(decode_index, Index::Ix);
pub static FD: [Op; 256] = table!(decode_index, Index::Iy);
pub static DDCB: [Op; 256] = table!(decode_index_cb, Index::Ix);
pub static FDCB: [Op; 256] = table!(decode_index_cb, Index::Iy);
