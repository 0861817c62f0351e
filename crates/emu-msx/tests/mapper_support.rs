mod common;

use common::{rig, rig_with, run};
use emu_msx::intercept::SegmentOwner;
use emu_msx::{MsxConfig, MsxError, SoundChips};
use zilog_z80::CF;

/// LD DE,0x0402 / CALL EXTBIO
const INSTALL: [u8; 6] = [0x11, 0x02, 0x04, 0xCD, 0xCA, 0xFF];

fn with_install(body: &[u8]) -> Vec<u8> {
    let mut program = INSTALL.to_vec();
    program.extend_from_slice(body);
    program
}

#[test]
fn test_extbio_installs_jump_table() {
    let mut rig = rig();
    run(&mut rig, &with_install(&[0xC9])).expect("run");

    let regs = rig.msx.cpu().regs();
    assert_eq!((regs.a, regs.b, regs.c, regs.hl()), (16, 3, 16, 0xFF00));
    let bus = rig.msx.bus();
    for i in 0..16u16 {
        let entry = 0xFF00 + 3 * i;
        let bytes = [bus.peek(entry), bus.peek(entry + 1), bus.peek(entry + 2)];
        assert_eq!(bytes, [0xC3, 0x01 + i as u8, 0xFF], "entry {i}");
    }
}

#[test]
fn test_extbio_reports_free_segments_left() {
    let config = MsxConfig::default().with_strict_dos(true).with_reserved_boot_segments(true);
    let mut rig = rig_with(&config, SoundChips::silent());
    run(&mut rig, &with_install(&[0xC9])).expect("run");
    assert_eq!(rig.msx.cpu().regs().c, 12);
}

/// Allocate 17 times, storing A and a carry byte per attempt from 0x9000.
const ALLOCATE_17: [u8; 17] = [
    0x21, 0x00, 0x90, // LD HL,0x9000
    0x06, 0x11, // LD B,17
    0xAF, // loop: XOR A
    0xCD, 0x00, 0xFF, // CALL ALL_SEG
    0x77, // LD (HL),A
    0x23, // INC HL
    0x9F, // SBC A,A
    0x77, // LD (HL),A
    0x23, // INC HL
    0x10, 0xF5, // DJNZ loop
    0xC9, // RET
];

#[test]
fn test_all_seg_hands_out_sixteen_then_sets_carry() {
    let mut rig = rig();
    run(&mut rig, &with_install(&ALLOCATE_17)).expect("run");

    let bus = rig.msx.bus();
    let results: Vec<(u8, u8)> = (0..17).map(|i| (bus.peek(0x9000 + 2 * i), bus.peek(0x9001 + 2 * i))).collect();
    let expected: Vec<(u8, u8)> = (0..16).map(|s| (s, 0x00)).chain([(0x00, 0xFF)]).collect();
    assert_eq!(results, expected);
    assert_eq!(rig.msx.segments().free_count(), 0);
    assert_eq!(rig.msx.segments().owner(3), Some(SegmentOwner::User));
}

#[test]
fn test_fre_seg_makes_segment_available_again() {
    let mut rig = rig();
    run(&mut rig, &with_install(&ALLOCATE_17)).expect("fill");

    // LD A,5 / CALL FRE_SEG / XOR A / CALL ALL_SEG / LD (0x9100),A / RET
    run(&mut rig, &[0x3E, 0x05, 0xCD, 0x03, 0xFF, 0xAF, 0xCD, 0x00, 0xFF, 0x32, 0x00, 0x91, 0xC9]).expect("refill");
    assert_eq!(rig.msx.bus().peek(0x9100), 5);
    assert!(!rig.msx.cpu().regs().flag(CF));
}

#[test]
fn test_system_allocation_records_owner() {
    let mut rig = rig();
    // LD A,1 / CALL ALL_SEG / RET
    run(&mut rig, &with_install(&[0x3E, 0x01, 0xCD, 0x00, 0xFF, 0xC9])).expect("run");
    assert_eq!(rig.msx.cpu().regs().a, 0);
    assert_eq!(rig.msx.segments().owner(0), Some(SegmentOwner::System));
}

#[test]
fn test_put_and_get_page_segment() {
    let mut rig = rig();
    // LD A,7 / CALL PUT_P2 / LD A,0 / CALL GET_P2 / RET
    run(&mut rig, &with_install(&[0x3E, 0x07, 0xCD, 0x24, 0xFF, 0x3E, 0x00, 0xCD, 0x27, 0xFF, 0xC9])).expect("run");
    assert_eq!(rig.msx.cpu().regs().a, 7);
    assert_eq!(rig.msx.bus().devices.mapper.segment(2), 7);
}

#[test]
fn test_mapper_calls_through_a_copied_jump_table() {
    let mut rig = rig();
    let program = with_install(&[
        0x21, 0x00, 0xFF, // LD HL,0xFF00
        0x11, 0x00, 0xC0, // LD DE,0xC000
        0x01, 0x30, 0x00, // LD BC,0x0030
        0xED, 0xB0, // LDIR
        0x3E, 0x09, // LD A,9
        0xCD, 0x24, 0xC0, // CALL PUT_P2 (copy)
        0x3E, 0x00, // LD A,0
        0xCD, 0x27, 0xC0, // CALL GET_P2 (copy)
        0xC9,
    ]);
    run(&mut rig, &program).expect("run");
    assert_eq!(rig.msx.bus().devices.mapper.segment(2), 9);
    assert_eq!(rig.msx.cpu().regs().a, 9);
}

#[test]
fn test_first_entry_of_copied_table_allocates() {
    let mut rig = rig();
    let program = with_install(&[
        0x21, 0x00, 0xFF, // LD HL,0xFF00
        0x11, 0x00, 0xC0, // LD DE,0xC000
        0x01, 0x30, 0x00, // LD BC,0x0030
        0xED, 0xB0, // LDIR
        0xAF, // XOR A
        0xCD, 0x00, 0xC0, // CALL ALL_SEG (copy)
        0xC9,
    ]);
    run(&mut rig, &program).expect("run");
    assert_eq!(rig.msx.segments().owner(0), Some(SegmentOwner::User));
}

#[test]
fn test_unimplemented_mapper_routine_is_an_error() {
    let mut rig = rig();
    // CALL RD_SEG (table entry 2)
    let err = run(&mut rig, &with_install(&[0xCD, 0x06, 0xFF])).expect_err("RD_SEG");
    assert!(matches!(err, MsxError::UnsupportedMapperCall { address: 0xFF03, name: "RD_SEG" }));
}

#[test]
fn test_unknown_extbio_device_is_an_error() {
    let mut rig = rig();
    // LD DE,0x1234 / CALL EXTBIO
    let err = run(&mut rig, &[0x11, 0x34, 0x12, 0xCD, 0xCA, 0xFF]).expect_err("device 0x12");
    assert!(matches!(err, MsxError::UnsupportedExtendedBios { device: 0x12, function: 0x34 }));
}

#[test]
fn test_extbio_selector_f000_is_ignored() {
    let mut rig = rig();
    // LD A,0x42 / LD DE,0xF000 / CALL EXTBIO / RET
    run(&mut rig, &[0x3E, 0x42, 0x11, 0x00, 0xF0, 0xCD, 0xCA, 0xFF, 0xC9]).expect("run");
    assert_eq!(rig.msx.cpu().regs().a, 0x42);
}
