//! Unit tests for individual Z80 instructions.
//!
//! Each test loads a short program into a flat bus, runs it until HALT
//! and checks registers, flags and memory.

use emu_core::{Bus, Cpu, SimpleBus};
use zilog_z80::{CF, HF, NF, PF, Prefix, SF, XF, YF, Z80, Z80Error, ZF};

/// Run until HALT, return the number of instructions executed.
fn run_until_halt(cpu: &mut Z80, bus: &mut SimpleBus) -> u64 {
    let mut count = 0;
    while !cpu.is_halted() && count < 100_000 {
        cpu.step(bus).expect("instruction should be defined");
        count += 1;
    }
    count
}

fn run_program(program: &[u8]) -> (Z80, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, program);
    let mut cpu = Z80::new();
    cpu.reset_to(0x0000, 0xF000);
    run_until_halt(&mut cpu, &mut bus);
    (cpu, bus)
}

#[test]
fn test_nop() {
    let (cpu, _) = run_program(&[0x00, 0x76]); // NOP; HALT
    assert_eq!(cpu.pc(), 0x0002);
}

#[test]
fn test_ld_a_n() {
    let (cpu, _) = run_program(&[0x3E, 0x42, 0x76]); // LD A, 0x42; HALT
    assert_eq!(cpu.regs().a, 0x42);
}

#[test]
fn test_ld_bc_nn() {
    let (cpu, _) = run_program(&[0x01, 0x34, 0x12, 0x76]); // LD BC, 0x1234; HALT
    assert_eq!(cpu.regs().bc(), 0x1234);
    assert_eq!(cpu.regs().b, 0x12);
}

#[test]
fn test_add_a_a_at_0x80() {
    let (cpu, _) = run_program(&[
        0x3E, 0x80, // LD A, 0x80
        0x87, // ADD A, A
        0x76, // HALT
    ]);
    let f = cpu.regs().f;
    assert_eq!(cpu.regs().a, 0x00);
    assert_ne!(f & CF, 0, "carry");
    assert_ne!(f & ZF, 0, "zero");
    assert_ne!(f & PF, 0, "overflow");
    assert_eq!(f & SF, 0, "sign");
    assert_eq!(f & NF, 0, "add");
    assert_eq!(f & HF, 0, "no carry out of bit 3");
}

#[test]
fn test_daa_after_add() {
    let (cpu, _) = run_program(&[
        0x3E, 0x0A, // LD A, 0x0A
        0xC6, 0x99, // ADD A, 0x99
        0x27, // DAA
        0x76, // HALT
    ]);
    assert_eq!(cpu.regs().a, 0x09);
    assert_ne!(cpu.regs().f & CF, 0);
}

#[test]
fn test_daa_bcd_addition() {
    let (cpu, _) = run_program(&[
        0x3E, 0x38, // LD A, 0x38
        0xC6, 0x45, // ADD A, 0x45
        0x27, // DAA
        0x76, // HALT
    ]);
    assert_eq!(cpu.regs().a, 0x83);
    assert_eq!(cpu.regs().f & CF, 0);
}

#[test]
fn test_inc_keeps_carry() {
    let (cpu, _) = run_program(&[
        0x37, // SCF
        0x3E, 0xFF, // LD A, 0xFF
        0x3C, // INC A
        0x76, // HALT
    ]);
    assert_eq!(cpu.regs().a, 0x00);
    assert_eq!(cpu.regs().f & (ZF | HF | CF), ZF | HF | CF);
}

#[test]
fn test_push_pop_round_trip() {
    for value in [0x0000u16, 0x1234, 0xFFFF] {
        let mut bus = SimpleBus::new();
        let mut cpu = Z80::new();
        cpu.set_sp(0xD400);
        cpu.push16(&mut bus, value);
        assert_eq!(cpu.sp(), 0xD3FE);
        assert_eq!(cpu.pop16(&mut bus), value);
        assert_eq!(cpu.sp(), 0xD400);
    }
}

#[test]
fn test_push_stores_high_byte_first() {
    let mut bus = SimpleBus::new();
    let mut cpu = Z80::new();
    cpu.set_sp(0x8000);
    cpu.push16(&mut bus, 0xABCD);
    assert_eq!(bus.peek(0x7FFF), 0xAB);
    assert_eq!(bus.peek(0x7FFE), 0xCD);
}

#[test]
fn test_call_and_ret() {
    let (cpu, _) = run_program(&[
        0xCD, 0x10, 0x00, // CALL 0x0010
        0x76, // HALT
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // padding to 0x0010
        0x3E, 0x55, // LD A, 0x55
        0xC9, // RET
    ]);
    assert_eq!(cpu.regs().a, 0x55);
    assert_eq!(cpu.pc(), 0x0004);
    assert_eq!(cpu.sp(), 0xF000);
}

#[test]
fn test_jr_backwards() {
    let (cpu, _) = run_program(&[
        0x06, 0x03, // LD B, 3
        0xAF, // XOR A
        0x3C, // loop: INC A
        0x10, 0xFD, // DJNZ loop
        0x76, // HALT
    ]);
    assert_eq!(cpu.regs().a, 3);
    assert_eq!(cpu.regs().b, 0);
}

#[test]
fn test_jr_conditional_not_taken() {
    let (cpu, _) = run_program(&[
        0xAF, // XOR A (Z set)
        0x20, 0x02, // JR NZ, +2
        0x3E, 0x11, // LD A, 0x11
        0x76, // HALT
    ]);
    assert_eq!(cpu.regs().a, 0x11);
}

#[test]
fn test_ldir_copies_block() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[
        0x21, 0x00, 0x40, // LD HL, 0x4000
        0x11, 0x00, 0x50, // LD DE, 0x5000
        0x01, 0x04, 0x00, // LD BC, 4
        0xED, 0xB0, // LDIR
        0x76, // HALT
    ]);
    bus.load(0x4000, &[1, 2, 3, 4]);
    let mut cpu = Z80::new();
    cpu.reset_to(0, 0xF000);
    let steps = run_until_halt(&mut cpu, &mut bus);

    assert_eq!(steps, 5, "LDIR completes in one step");
    assert_eq!((0..4).map(|i| bus.peek(0x5000 + i)).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(cpu.regs().bc(), 0);
    assert_eq!(cpu.regs().hl(), 0x4004);
    assert_eq!(cpu.regs().de(), 0x5004);
    assert_eq!(cpu.regs().f & PF, 0);
}

#[test]
fn test_lddr_copies_downwards() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[
        0x21, 0x02, 0x40, // LD HL, 0x4002
        0x11, 0x02, 0x50, // LD DE, 0x5002
        0x01, 0x03, 0x00, // LD BC, 3
        0xED, 0xB8, // LDDR
        0x76, // HALT
    ]);
    bus.load(0x4000, &[7, 8, 9]);
    let mut cpu = Z80::new();
    cpu.reset_to(0, 0xF000);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!([bus.peek(0x5000), bus.peek(0x5001), bus.peek(0x5002)], [7, 8, 9]);
    assert_eq!(cpu.regs().hl(), 0x3FFF);
}

#[test]
fn test_cpir_stops_on_match() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[
        0x21, 0x00, 0x40, // LD HL, 0x4000
        0x01, 0x10, 0x00, // LD BC, 16
        0x3E, 0x33, // LD A, 0x33
        0xED, 0xB1, // CPIR
        0x76, // HALT
    ]);
    bus.load(0x4000, &[0x11, 0x22, 0x33, 0x44]);
    let mut cpu = Z80::new();
    cpu.reset_to(0, 0xF000);
    run_until_halt(&mut cpu, &mut bus);

    assert_eq!(cpu.regs().hl(), 0x4003, "HL points past the match");
    assert_eq!(cpu.regs().bc(), 13);
    assert_ne!(cpu.regs().f & ZF, 0);
    assert_ne!(cpu.regs().f & PF, 0, "BC not exhausted");
}

#[test]
fn test_otir_writes_port_until_b_zero() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[
        0x21, 0x00, 0x40, // LD HL, 0x4000
        0x01, 0x7C, 0x03, // LD BC, 0x037C (B=3, C=0x7C)
        0xED, 0xB3, // OTIR
        0x76, // HALT
    ]);
    bus.load(0x4000, &[0xA0, 0xA1, 0xA2]);
    let mut cpu = Z80::new();
    cpu.reset_to(0, 0xF000);
    run_until_halt(&mut cpu, &mut bus);

    assert_eq!(bus.outputs(), &[(0x7C, 0xA0), (0x7C, 0xA1), (0x7C, 0xA2)]);
    assert_eq!(cpu.regs().b, 0);
    assert_ne!(cpu.regs().f & ZF, 0);
}

#[test]
fn test_inir_reads_port_into_memory() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[
        0x21, 0x00, 0x60, // LD HL, 0x6000
        0x01, 0x10, 0x02, // LD BC, 0x0210
        0xED, 0xB2, // INIR
        0x76, // HALT
    ]);
    bus.set_port(0x10, 0x5A);
    let mut cpu = Z80::new();
    cpu.reset_to(0, 0xF000);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!([bus.peek(0x6000), bus.peek(0x6001)], [0x5A, 0x5A]);
    assert_eq!(cpu.regs().hl(), 0x6002);
}

#[test]
fn test_ix_displacement_load_and_store() {
    let (cpu, bus) = run_program(&[
        0xDD, 0x21, 0x00, 0x40, // LD IX, 0x4000
        0xDD, 0x36, 0xFE, 0x99, // LD (IX-2), 0x99
        0xDD, 0x7E, 0xFE, // LD A, (IX-2)
        0x76, // HALT
    ]);
    assert_eq!(bus.peek(0x3FFE), 0x99);
    assert_eq!(cpu.regs().a, 0x99);
}

#[test]
fn test_iy_alu_with_displacement() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[
        0xFD, 0x21, 0x00, 0x40, // LD IY, 0x4000
        0x3E, 0x10, // LD A, 0x10
        0xFD, 0x86, 0x05, // ADD A, (IY+5)
        0x76, // HALT
    ]);
    bus.load(0x4005, &[0x22]);
    let mut cpu = Z80::new();
    cpu.reset_to(0, 0xF000);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.regs().a, 0x32);
}

#[test]
fn test_ddcb_set_reads_displacement_before_opcode() {
    let (cpu, bus) = run_program(&[
        0xDD, 0x21, 0x00, 0x40, // LD IX, 0x4000
        0xDD, 0xCB, 0x03, 0xC6, // SET 0, (IX+3)
        0x3E, 0x77, // LD A, 0x77
        0x76, // HALT
    ]);
    assert_eq!(bus.peek(0x4003), 0x01);
    assert_eq!(cpu.regs().a, 0x77, "execution resumes right after the opcode byte");
    assert_eq!(cpu.pc(), 0x000B);
}

#[test]
fn test_fdcb_bit_sets_zero_for_clear_bit() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[
        0xFD, 0x21, 0x00, 0x40, // LD IY, 0x4000
        0xFD, 0xCB, 0x01, 0x7E, // BIT 7, (IY+1)
        0x76, // HALT
    ]);
    bus.load(0x4001, &[0x7F]);
    let mut cpu = Z80::new();
    cpu.reset_to(0, 0xF000);
    run_until_halt(&mut cpu, &mut bus);
    assert_ne!(cpu.regs().f & ZF, 0);
    assert_ne!(cpu.regs().f & HF, 0);
}

#[test]
fn test_cb_rotate_register() {
    let (cpu, _) = run_program(&[
        0x06, 0x81, // LD B, 0x81
        0xCB, 0x00, // RLC B
        0x76, // HALT
    ]);
    assert_eq!(cpu.regs().b, 0x03);
    assert_ne!(cpu.regs().f & CF, 0);
}

#[test]
fn test_sbc_hl_and_adc_hl() {
    let (cpu, _) = run_program(&[
        0x21, 0x00, 0x10, // LD HL, 0x1000
        0x11, 0x01, 0x00, // LD DE, 1
        0x37, // SCF
        0xED, 0x52, // SBC HL, DE
        0x76, // HALT
    ]);
    assert_eq!(cpu.regs().hl(), 0x0FFE);
    assert_ne!(cpu.regs().f & NF, 0);
    assert_ne!(cpu.regs().f & HF, 0);
}

#[test]
fn test_neg() {
    let (cpu, _) = run_program(&[0x3E, 0x01, 0xED, 0x44, 0x76]); // LD A,1; NEG; HALT
    assert_eq!(cpu.regs().a, 0xFF);
    assert_ne!(cpu.regs().f & (SF | CF | NF), 0);
}

#[test]
fn test_ex_and_exx() {
    let (cpu, _) = run_program(&[
        0x01, 0x11, 0x11, // LD BC, 0x1111
        0xD9, // EXX
        0x01, 0x22, 0x22, // LD BC, 0x2222
        0xD9, // EXX
        0x76, // HALT
    ]);
    assert_eq!(cpu.regs().bc(), 0x1111);
    assert_eq!(u16::from(cpu.regs().b_alt) << 8 | u16::from(cpu.regs().c_alt), 0x2222);
}

#[test]
fn test_out_and_in_immediate() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[
        0x3E, 0x04, // LD A, 4
        0xD3, 0xFD, // OUT (0xFD), A
        0xDB, 0xA8, // IN A, (0xA8)
        0x76, // HALT
    ]);
    bus.set_port(0xA8, 0xF0);
    let mut cpu = Z80::new();
    cpu.reset_to(0, 0xF000);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(bus.outputs(), &[(0xFD, 0x04)]);
    assert_eq!(cpu.regs().a, 0xF0);
}

#[test]
fn test_di_ei_and_im() {
    let (cpu, _) = run_program(&[0xFB, 0xED, 0x56, 0x76]); // EI; IM 1; HALT
    assert!(cpu.regs().iff1 && cpu.regs().iff2);
    assert_eq!(cpu.regs().im, 1);
}

#[test]
fn test_cpl_sets_h_and_n() {
    let (cpu, _) = run_program(&[0x3E, 0x5A, 0x2F, 0x76]); // LD A,0x5A; CPL; HALT
    assert_eq!(cpu.regs().a, 0xA5);
    assert_eq!(cpu.regs().f & (HF | NF), HF | NF);
    assert_eq!(cpu.regs().f & (YF | XF), 0xA5 & (YF | XF));
}

#[test]
fn test_rld_rotates_nibbles() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[
        0x21, 0x00, 0x40, // LD HL, 0x4000
        0x3E, 0x12, // LD A, 0x12
        0xED, 0x6F, // RLD
        0x76, // HALT
    ]);
    bus.load(0x4000, &[0x34]);
    let mut cpu = Z80::new();
    cpu.reset_to(0, 0xF000);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.regs().a, 0x13);
    assert_eq!(bus.peek(0x4000), 0x42);
}

#[test]
fn test_undefined_opcode_is_an_error() {
    let mut bus = SimpleBus::new();
    bus.load(0x0100, &[0x00, 0xED, 0x00]); // NOP; ED 00
    let mut cpu = Z80::new();
    cpu.reset_to(0x0100, 0xF000);

    cpu.step(&mut bus).expect("NOP is defined");
    let err = cpu.step(&mut bus).expect_err("ED 00 is undefined");
    assert_eq!(
        err,
        Z80Error::UndefinedOpcode {
            address: 0x0101,
            prefix: Prefix::Ed,
            opcode: 0x00
        }
    );
}

#[test]
fn test_halted_cpu_does_not_advance() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0x76, 0x3C]); // HALT; INC A
    let mut cpu = Z80::new();
    cpu.reset_to(0, 0xF000);
    cpu.step(&mut bus).expect("HALT");
    cpu.step(&mut bus).expect("halted step");
    assert!(cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0001);
}

#[test]
fn test_writes_go_through_bus() {
    let mut bus = SimpleBus::new();
    bus.write(0x9000, 0x3F);
    assert_eq!(bus.read(0x9000), 0x3F);
}

#[test]
fn test_cpu_trait_reports_state() {
    let mut cpu = Z80::new();
    cpu.reset_to(0x0100, 0xD400);
    assert_eq!(Cpu::pc(&cpu), 0x0100);
    assert_eq!(cpu.registers().sp, 0xD400);
    Cpu::reset(&mut cpu);
    assert_eq!(cpu.registers().sp, 0xFFFF);
}

#[test]
fn test_observable_paths() {
    use emu_core::{Observable, Value};

    let (cpu, _) = run_program(&[0x21, 0x34, 0x12, 0xAF, 0x76]); // LD HL,0x1234; XOR A; HALT
    assert_eq!(cpu.query("hl"), Some(Value::U16(0x1234)));
    assert_eq!(cpu.query("flags.z"), Some(Value::Bool(true)));
    assert_eq!(cpu.query("halted"), Some(Value::Bool(true)));
    assert_eq!(cpu.query("bogus"), None);
    assert!(cpu.query_paths().iter().all(|p| cpu.query(p).is_some()));
}

/// Runs `LD IY,0x1234` then one FD-prefixed opcode, with A=0xAA and E=0xEE.
fn run_iy_half(opcode: u8) -> Z80 {
    let (cpu, _) = run_program(&[
        0x3E, 0xAA, // LD A, 0xAA
        0x1E, 0xEE, // LD E, 0xEE
        0xFD, 0x21, 0x34, 0x12, // LD IY, 0x1234
        0xFD, opcode, 0x76, // op; HALT
    ]);
    cpu
}

#[test]
fn test_ld_b_iyh() {
    assert_eq!(run_iy_half(0x44).regs().b, 0x12);
}

#[test]
fn test_ld_b_iyl() {
    assert_eq!(run_iy_half(0x45).regs().b, 0x34);
}

#[test]
fn test_ld_c_iyh() {
    assert_eq!(run_iy_half(0x4C).regs().c, 0x12);
}

#[test]
fn test_ld_c_iyl() {
    assert_eq!(run_iy_half(0x4D).regs().c, 0x34);
}

#[test]
fn test_ld_iyh_e() {
    assert_eq!(run_iy_half(0x63).regs().iy, 0xEE34);
}

#[test]
fn test_ld_iyl_iyh() {
    assert_eq!(run_iy_half(0x6C).regs().iy, 0x1212);
}

#[test]
fn test_ld_iyl_iyl() {
    let cpu = run_iy_half(0x6D);
    assert_eq!(cpu.regs().iy, 0x1234);
    assert_eq!(cpu.pc(), 0x000B);
}

#[test]
fn test_ld_iyl_a() {
    assert_eq!(run_iy_half(0x6F).regs().iy, 0x12AA);
}

#[test]
fn test_ld_a_iyh() {
    assert_eq!(run_iy_half(0x7C).regs().a, 0x12);
}

#[test]
fn test_ld_a_iyl() {
    assert_eq!(run_iy_half(0x7D).regs().a, 0x34);
}

#[test]
fn test_index_half_loads_leave_hl_alone() {
    let (cpu, _) = run_program(&[
        0x21, 0x78, 0x56, // LD HL, 0x5678
        0xDD, 0x21, 0x34, 0x12, // LD IX, 0x1234
        0xDD, 0x65, // LD IXH, IXL
        0xDD, 0x44, // LD B, IXH
        0x76, // HALT
    ]);
    assert_eq!(cpu.regs().ix, 0x3434);
    assert_eq!(cpu.regs().b, 0x34);
    assert_eq!(cpu.regs().hl(), 0x5678);
}
