//! ALU operations for the Z80.
//!
//! Every helper is pure: it takes operands (and the incoming carry where
//! the instruction uses one) and returns the result with a complete flag
//! byte. Callers that must preserve some flags mask them in themselves.

#![allow(clippy::verbose_bit_mask)] // Clearer to read mask comparisons.

use crate::decode::RotOp;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, sz53, sz53p};

/// Result of an 8-bit ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// Result of a 16-bit ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult16 {
    pub value: u16,
    pub flags: u8,
}

/// Add two bytes with optional carry.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let wide = u16::from(a) + u16::from(b) + u16::from(c);
    let value = wide as u8;

    let mut flags = sz53(value);
    if (a & 0x0F) + (b & 0x0F) + c > 0x0F {
        flags |= HF;
    }
    // Both operands share a sign that the result does not.
    if (a ^ b) & 0x80 == 0 && (a ^ value) & 0x80 != 0 {
        flags |= PF;
    }
    if wide > 0xFF {
        flags |= CF;
    }
    AluResult { value, flags }
}

/// Subtract `b` and an optional borrow from `a`.
#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = sz53(value) | NF;
    if (a & 0x0F) < (b & 0x0F) + c {
        flags |= HF;
    }
    // Operands differ in sign and the result took the subtrahend's sign.
    if (a ^ b) & 0x80 != 0 && (b ^ value) & 0x80 == 0 {
        flags |= PF;
    }
    if u16::from(a) < u16::from(b) + u16::from(c) {
        flags |= CF;
    }
    AluResult { value, flags }
}

#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult {
        value,
        flags: sz53p(value) | HF,
    }
}

#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult {
        value,
        flags: sz53p(value),
    }
}

#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult {
        value,
        flags: sz53p(value),
    }
}

/// Compare. The result is `a` unchanged; undocumented bits come from `b`.
#[must_use]
pub fn cp8(a: u8, b: u8) -> AluResult {
    let diff = sub8(a, b, false);
    AluResult {
        value: a,
        flags: (diff.flags & !(YF | XF)) | (b & (YF | XF)),
    }
}

/// Increment. The returned flags never include carry.
#[must_use]
pub fn inc8(a: u8) -> AluResult {
    let value = a.wrapping_add(1);
    let mut flags = sz53(value);
    if a & 0x0F == 0x0F {
        flags |= HF;
    }
    if a == 0x7F {
        flags |= PF;
    }
    AluResult { value, flags }
}

/// Decrement. The returned flags never include carry.
#[must_use]
pub fn dec8(a: u8) -> AluResult {
    let value = a.wrapping_sub(1);
    let mut flags = sz53(value) | NF;
    if a & 0x0F == 0x00 {
        flags |= HF;
    }
    if a == 0x80 {
        flags |= PF;
    }
    AluResult { value, flags }
}

/// NEG: two's complement of A.
#[must_use]
pub fn neg8(a: u8) -> AluResult {
    sub8(0, a, false)
}

/// ADD HL,rr style addition.
///
/// Only H, N, C and the undocumented bits are meaningful; the caller keeps
/// S, Z and P/V from the old flags.
#[must_use]
pub fn add16(a: u16, b: u16) -> AluResult16 {
    let wide = u32::from(a) + u32::from(b);
    let value = wide as u16;
    let mut flags = ((value >> 8) as u8) & (YF | XF);
    if (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF {
        flags |= HF;
    }
    if wide > 0xFFFF {
        flags |= CF;
    }
    AluResult16 { value, flags }
}

/// ADC HL,rr with the full flag set.
#[must_use]
pub fn adc16(a: u16, b: u16, carry: bool) -> AluResult16 {
    let c = u16::from(carry);
    let wide = u32::from(a) + u32::from(b) + u32::from(c);
    let value = wide as u16;

    let mut flags = wide16_sz(value);
    if (a & 0x0FFF) + (b & 0x0FFF) + c > 0x0FFF {
        flags |= HF;
    }
    if (a ^ b) & 0x8000 == 0 && (a ^ value) & 0x8000 != 0 {
        flags |= PF;
    }
    if wide > 0xFFFF {
        flags |= CF;
    }
    AluResult16 { value, flags }
}

/// SBC HL,rr with the full flag set.
#[must_use]
pub fn sbc16(a: u16, b: u16, carry: bool) -> AluResult16 {
    let c = u16::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = wide16_sz(value) | NF;
    if (a & 0x0FFF) < (b & 0x0FFF) + c {
        flags |= HF;
    }
    if (a ^ b) & 0x8000 != 0 && (b ^ value) & 0x8000 == 0 {
        flags |= PF;
    }
    if u32::from(a) < u32::from(b) + u32::from(c) {
        flags |= CF;
    }
    AluResult16 { value, flags }
}

fn wide16_sz(value: u16) -> u8 {
    let mut flags = ((value >> 8) as u8) & (SF | YF | XF);
    if value == 0 {
        flags |= ZF;
    }
    flags
}

/// CB-prefixed rotate or shift with the full flag set.
///
/// The bit shifted out becomes the new carry.
#[must_use]
pub fn rotate(op: RotOp, a: u8, carry: bool) -> AluResult {
    let (value, out) = match op {
        RotOp::Rlc => (a.rotate_left(1), a & 0x80 != 0),
        RotOp::Rrc => (a.rotate_right(1), a & 0x01 != 0),
        RotOp::Rl => ((a << 1) | u8::from(carry), a & 0x80 != 0),
        RotOp::Rr => ((a >> 1) | (u8::from(carry) << 7), a & 0x01 != 0),
        RotOp::Sla => (a << 1, a & 0x80 != 0),
        RotOp::Sra => ((a >> 1) | (a & 0x80), a & 0x01 != 0),
        RotOp::Sll => ((a << 1) | 1, a & 0x80 != 0),
        RotOp::Srl => (a >> 1, a & 0x01 != 0),
    };
    AluResult {
        value,
        flags: sz53p(value) | if out { CF } else { 0 },
    }
}

/// One row of the decimal-adjust truth table.
struct DaaRow {
    carry: bool,
    high: (u8, u8),
    half: bool,
    low: (u8, u8),
    adjust: u8,
    carry_out: bool,
}

const fn row(carry: bool, high: (u8, u8), half: bool, low: (u8, u8), adjust: u8, carry_out: bool) -> DaaRow {
    DaaRow {
        carry,
        high,
        half,
        low,
        adjust,
        carry_out,
    }
}

/// After ADD, ADC or INC.
const DAA_ADD: [DaaRow; 9] = [
    row(false, (0x0, 0x9), false, (0x0, 0x9), 0x00, false),
    row(false, (0x0, 0x8), false, (0xA, 0xF), 0x06, false),
    row(false, (0x0, 0x9), true, (0x0, 0x3), 0x06, false),
    row(false, (0xA, 0xF), false, (0x0, 0x9), 0x60, true),
    row(false, (0x9, 0xF), false, (0xA, 0xF), 0x66, true),
    row(false, (0xA, 0xF), true, (0x0, 0x3), 0x66, true),
    row(true, (0x0, 0x2), false, (0x0, 0x9), 0x60, true),
    row(true, (0x0, 0x2), false, (0xA, 0xF), 0x66, true),
    row(true, (0x0, 0x3), true, (0x0, 0x3), 0x66, true),
];

/// After SUB, SBC, DEC or NEG. The adjustment is added modulo 256.
const DAA_SUB: [DaaRow; 4] = [
    row(false, (0x0, 0x9), false, (0x0, 0x9), 0x00, false),
    row(false, (0x0, 0x8), true, (0x6, 0xF), 0xFA, false),
    row(true, (0x7, 0xF), false, (0x0, 0x9), 0xA0, true),
    row(true, (0x6, 0xF), true, (0x6, 0xF), 0x9A, true),
];

/// Decimal-adjust A after a BCD add or subtract.
///
/// The documented truth table decides the adjustment and the carry. Input
/// combinations the table leaves out (they cannot follow a valid BCD
/// operation) fall back to the general rule the hardware applies.
#[must_use]
pub fn daa(a: u8, flags: u8) -> AluResult {
    let subtract = flags & NF != 0;
    let carry = flags & CF != 0;
    let half = flags & HF != 0;
    let high = a >> 4;
    let low = a & 0x0F;

    let table: &[DaaRow] = if subtract { &DAA_SUB } else { &DAA_ADD };
    let within = |v: u8, (lo, hi): (u8, u8)| lo <= v && v <= hi;
    let (adjust, carry_out) = table
        .iter()
        .find(|r| r.carry == carry && r.half == half && within(high, r.high) && within(low, r.low))
        .map_or_else(
            || {
                let mut diff = 0u8;
                if half || low > 9 {
                    diff |= 0x06;
                }
                let carry_out = carry || a > 0x99;
                if carry_out {
                    diff |= 0x60;
                }
                let diff = if subtract { diff.wrapping_neg() } else { diff };
                (diff, carry_out)
            },
            |r| (r.adjust, r.carry_out),
        );

    let value = a.wrapping_add(adjust);
    let half_out = if subtract { half && low < 6 } else { low > 9 };

    let mut out = sz53p(value) | (flags & NF);
    if half_out {
        out |= HF;
    }
    if carry_out {
        out |= CF;
    }
    AluResult { value, flags: out }
}
