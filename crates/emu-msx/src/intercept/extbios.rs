//! Extended BIOS and the memory mapper support routines.
//!
//! EXTBIO with DE=0x0402 installs a jump table at 0xFF00. Entry `i` is
//! `JP 0xFF01+i`, and those sixteen targets are serviced here. The targets
//! overlap the table itself, so a target only counts as a mapper call when
//! the CPU arrived there through a `JP` aimed at it. Callers may copy the
//! table elsewhere and call through the copy.

use emu_core::Bus;
use zilog_z80::{CF, Z80};

use crate::bus::MsxBus;
use crate::device::SEGMENT_COUNT;
use crate::error::MsxError;

pub const EXTBIO: u16 = 0xFFCA;

/// Base of the installed jump table.
pub const JUMP_TABLE: u16 = 0xFF00;

/// Device selector of the mapper support routines.
const MAPPER_SUPPORT: u16 = 0x0402;
/// Selector some drivers probe with. Accepted and ignored.
const QUIET_SELECTOR: u16 = 0xF000;
/// Slot of the primary mapper.
const MAPPER_SLOT: u8 = 3;

/// Mapper routines in jump-table order.
const ROUTINES: [&str; 16] = [
    "ALL_SEG", "FRE_SEG", "RD_SEG", "WR_SEG", "CAL_SEG", "CALLS", "PUT_PH", "GET_PH", "PUT_P0", "GET_P0",
    "PUT_P1", "GET_P1", "PUT_P2", "GET_P2", "PUT_P3", "GET_P3",
];

const FIRST_ROUTINE: u16 = JUMP_TABLE + 1;
const LAST_ROUTINE: u16 = JUMP_TABLE + ROUTINES.len() as u16;

/// Opcode of `JP nn`.
const JP: u8 = 0xC3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOwner {
    Free,
    User,
    System,
}

/// Ownership of the sixteen mapper segments, as seen by ALL_SEG/FRE_SEG.
#[derive(Debug, Clone)]
pub struct SegmentTable {
    owners: [SegmentOwner; SEGMENT_COUNT],
}

impl SegmentTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            owners: [SegmentOwner::Free; SEGMENT_COUNT],
        }
    }

    /// A table with `segments` already taken by the system.
    #[must_use]
    pub fn with_reserved(segments: impl IntoIterator<Item = u8>) -> Self {
        let mut table = Self::new();
        for segment in segments {
            if let Some(owner) = table.owners.get_mut(usize::from(segment)) {
                *owner = SegmentOwner::System;
            }
        }
        table
    }

    /// Claim the lowest free segment.
    pub fn allocate(&mut self, owner: SegmentOwner) -> Option<u8> {
        let index = self.owners.iter().position(|&o| o == SegmentOwner::Free)?;
        self.owners[index] = owner;
        Some(index as u8)
    }

    /// Returns false for an out-of-range segment.
    pub fn free(&mut self, segment: u8) -> bool {
        match self.owners.get_mut(usize::from(segment)) {
            Some(owner) => {
                *owner = SegmentOwner::Free;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn owner(&self, segment: u8) -> Option<SegmentOwner> {
        self.owners.get(usize::from(segment)).copied()
    }

    #[must_use]
    pub fn free_count(&self) -> u8 {
        self.owners.iter().filter(|&&o| o == SegmentOwner::Free).count() as u8
    }
}

impl Default for SegmentTable {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ExtendedBios {
    segments: SegmentTable,
}

impl ExtendedBios {
    #[must_use]
    pub fn new(segments: SegmentTable) -> Self {
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &SegmentTable {
        &self.segments
    }

    pub fn service(&mut self, cpu: &mut Z80, bus: &mut MsxBus) -> Result<(), MsxError> {
        let pc = cpu.pc();
        if pc == EXTBIO {
            self.extbio(cpu, bus)?;
        } else if (FIRST_ROUTINE..=LAST_ROUTINE).contains(&pc) && jumped_to(bus, cpu.instruction_pc(), pc) {
            self.mapper_routine(cpu, bus, pc)?;
        } else {
            return Ok(());
        }
        cpu.ret(bus);
        Ok(())
    }

    fn extbio(&mut self, cpu: &mut Z80, bus: &mut MsxBus) -> Result<(), MsxError> {
        let regs = cpu.regs();
        match regs.de() {
            MAPPER_SUPPORT => {
                let free = self.segments.free_count();
                let regs = cpu.regs_mut();
                regs.a = SEGMENT_COUNT as u8;
                regs.b = MAPPER_SLOT;
                regs.c = free;
                regs.set_hl(JUMP_TABLE);
                for i in 0..ROUTINES.len() as u16 {
                    let [lo, hi] = (FIRST_ROUTINE + i).to_le_bytes();
                    bus.binary_to(JUMP_TABLE + 3 * i, &[0xC3, lo, hi]);
                }
                log::debug!("extbios: mapper jump table at {JUMP_TABLE:#06X}, {free} segments free");
                Ok(())
            }
            QUIET_SELECTOR => Ok(()),
            _ => {
                let (device, function) = (regs.d, regs.e);
                log::error!("extbios: unsupported device {device:#04X} function {function:#04X}");
                Err(MsxError::UnsupportedExtendedBios { device, function })
            }
        }
    }

    fn mapper_routine(&mut self, cpu: &mut Z80, bus: &mut MsxBus, address: u16) -> Result<(), MsxError> {
        let index = usize::from(address - FIRST_ROUTINE);
        let name = ROUTINES[index];
        log::trace!("extbios: {name}");
        match index {
            // ALL_SEG: A=0 user, A=1 system. Carry set when nothing is free.
            0 => {
                let owner = if cpu.regs().a == 0 { SegmentOwner::User } else { SegmentOwner::System };
                let allocated = self.segments.allocate(owner);
                let regs = cpu.regs_mut();
                if let Some(segment) = allocated {
                    regs.a = segment;
                }
                regs.set_flag(CF, allocated.is_none());
            }
            1 => {
                let freed = self.segments.free(cpu.regs().a);
                cpu.regs_mut().set_flag(CF, !freed);
            }
            // PUT_Pn and GET_Pn alternate from PUT_P0.
            8..=15 => {
                let port = 0xFC + ((index - 8) / 2) as u8;
                if index % 2 == 0 {
                    bus.output(port, cpu.regs().a);
                } else {
                    cpu.regs_mut().a = bus.input(port);
                }
            }
            _ => {
                log::error!("extbios: {name} is not implemented");
                return Err(MsxError::UnsupportedMapperCall { address, name });
            }
        }
        Ok(())
    }
}

/// Whether the instruction at `from` is a `JP` to `target`.
fn jumped_to(bus: &MsxBus, from: u16, target: u16) -> bool {
    let operand = u16::from_le_bytes([bus.peek(from.wrapping_add(1)), bus.peek(from.wrapping_add(2))]);
    bus.peek(from) == JP && operand == target
}
