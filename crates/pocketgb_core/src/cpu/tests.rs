use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::memory::FetchedInstruction;

const PROGRAM_START: u16 = 0xC000;

/// CPU with PC at the start of work RAM and `program` loaded there.
fn setup(program: &[u8]) -> (Cpu, Memory) {
    let mut mem = Memory::new();
    mem.load_bytes(PROGRAM_START, program);

    let mut cpu = Cpu::new();
    cpu.regs.pc = PROGRAM_START;
    (cpu, mem)
}

fn step(cpu: &mut Cpu, mem: &mut Memory) -> u32 {
    cpu.step(mem).expect("instruction should decode")
}

#[test]
fn nop_advances_pc() {
    let (mut cpu, mut mem) = setup(&[0x00]);

    let cycles = step(&mut cpu, &mut mem);

    assert_eq!(cpu.regs.pc, 0xC001);
    assert_eq!(cycles, 4);
    assert_eq!(cpu.clock().total_cycles(), 4);
}

#[test]
fn add_register_laws_hold_for_every_pair() {
    // 0x80: ADD A,B
    let (mut cpu, mut mem) = setup(&[0x80]);

    for a in 0..=u8::MAX {
        for b in 0..=u8::MAX {
            cpu.regs.pc = PROGRAM_START;
            cpu.regs.a = a;
            cpu.regs.b = b;
            cpu.regs.f = Flags::all();

            assert_eq!(step(&mut cpu, &mut mem), 4);

            let sum = a as u16 + b as u16;
            assert_eq!(cpu.regs.a, sum as u8, "{a:#04x} + {b:#04x}");
            assert_eq!(cpu.get_flag(Flags::Z), sum as u8 == 0);
            assert!(!cpu.get_flag(Flags::N));
            assert_eq!(cpu.get_flag(Flags::H), (a & 0x0F) + (b & 0x0F) > 0x0F);
            assert_eq!(cpu.get_flag(Flags::C), sum > 0xFF);
        }
    }
}

#[test]
fn sub_register_laws_hold_for_every_pair() {
    // 0x90: SUB B
    let (mut cpu, mut mem) = setup(&[0x90]);

    for a in 0..=u8::MAX {
        for b in 0..=u8::MAX {
            cpu.regs.pc = PROGRAM_START;
            cpu.regs.a = a;
            cpu.regs.b = b;
            cpu.regs.f = Flags::empty();

            step(&mut cpu, &mut mem);

            assert_eq!(cpu.regs.a, a.wrapping_sub(b));
            assert_eq!(cpu.get_flag(Flags::Z), a == b);
            assert!(cpu.get_flag(Flags::N));
            assert_eq!(cpu.get_flag(Flags::H), (a & 0x0F) < (b & 0x0F));
            assert_eq!(cpu.get_flag(Flags::C), a < b);
        }
    }
}

#[test]
fn push_bc_pop_de_copies_pair_and_restores_sp() {
    // 0xC5: PUSH BC, 0xD1: POP DE
    let (mut cpu, mut mem) = setup(&[0xC5, 0xD1]);
    cpu.regs.set_bc(0x1234);

    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(mem.read_byte(0xFFFD), 0x12);
    assert_eq!(mem.read_byte(0xFFFC), 0x34);

    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(cpu.regs.de(), 0x1234);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn pop_af_discards_low_flag_bits() {
    // 0xF1: POP AF
    let (mut cpu, mut mem) = setup(&[0xF1]);
    cpu.regs.sp = 0xFFFC;
    mem.write_word(0xFFFC, 0x12FF);

    step(&mut cpu, &mut mem);

    assert_eq!(cpu.regs.a, 0x12);
    assert_eq!(cpu.regs.af(), 0x12F0);
    assert_eq!(cpu.regs.f, Flags::all());
}

#[test]
fn jr_minus_two_jumps_to_itself() {
    let mut mem = Memory::new();
    mem.load_bytes(0x0150, &[0x18, 0xFE]);
    let mut cpu = Cpu::new();
    cpu.regs.pc = 0x0150;

    for _ in 0..3 {
        assert_eq!(step(&mut cpu, &mut mem), 12);
        assert_eq!(cpu.regs.pc, 0x0150);
    }
}

#[test]
fn jr_relative_forward_and_backward() {
    // 0xC000: JR +2 ; 0xC004: JR -6
    let (mut cpu, mut mem) = setup(&[0x18, 0x02, 0x00, 0x00, 0x18, 0xFA]);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.pc, 0xC004);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.pc, 0xC000);
}

#[test]
fn unassigned_opcode_leaves_state_untouched() {
    let (mut cpu, mut mem) = setup(&[0xED, 0x42]);
    cpu.regs.set_bc(0xBEEF);
    let regs_before = *cpu.registers();
    let clock_before = *cpu.clock();

    let err = cpu.step(&mut mem).unwrap_err();

    assert_eq!(
        err,
        EmuError::UnimplementedOpcode {
            opcode: 0xED,
            pc: 0xC000
        }
    );
    assert_eq!(*cpu.registers(), regs_before);
    assert_eq!(*cpu.clock(), clock_before);
    assert_eq!(mem.read_byte(0xC000), 0xED);
    assert_eq!(mem.read_byte(0xC001), 0x42);
}

#[test]
fn every_unassigned_opcode_is_rejected() {
    for &opcode in UNASSIGNED_OPCODES.iter() {
        let (mut cpu, mut mem) = setup(&[opcode]);
        match cpu.step(&mut mem) {
            Err(EmuError::UnimplementedOpcode { opcode: got, pc }) => {
                assert_eq!(got, opcode);
                assert_eq!(pc, PROGRAM_START);
            }
            other => panic!("opcode {opcode:#04x}: expected decode error, got {other:?}"),
        }
        assert_eq!(cpu.regs.pc, PROGRAM_START);
    }
}

#[test]
fn xor_a_zeroes_a_and_sets_only_z() {
    // 0xAF: XOR A
    let (mut cpu, mut mem) = setup(&[0xAF]);
    cpu.regs.a = 0x5A;
    cpu.regs.f = Flags::N | Flags::H | Flags::C;

    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.regs.f, Flags::Z);
}

#[test]
fn ld_16bit_and_basic_ld_indirect_work() {
    // LD BC,0xC100 ; LD (BC),A ; LD A,(BC)
    let (mut cpu, mut mem) = setup(&[0x01, 0x00, 0xC1, 0x02, 0x0A]);
    cpu.regs.a = 0xAB;

    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(cpu.regs.bc(), 0xC100);
    assert_eq!(cpu.regs.pc, 0xC003);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(mem.read_byte(0xC100), 0xAB);

    cpu.regs.a = 0x00;
    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.a, 0xAB);
}

#[test]
fn ld_r_r_and_hl_inc_dec_forms_work() {
    // LD HL,0xC100 ; LD B,0x12 ; LD (HL),B ; LD A,(HL+) ; LD (HL-),A ; LD C,A
    let (mut cpu, mut mem) = setup(&[0x21, 0x00, 0xC1, 0x06, 0x12, 0x70, 0x2A, 0x32, 0x4F]);

    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(cpu.regs.hl(), 0xC100);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.b, 0x12);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(mem.read_byte(0xC100), 0x12);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.a, 0x12);
    assert_eq!(cpu.regs.hl(), 0xC101);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(mem.read_byte(0xC101), 0x12);
    assert_eq!(cpu.regs.hl(), 0xC100);

    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert_eq!(cpu.regs.c, 0x12);
}

#[test]
fn ld_d8_into_hl_memory() {
    // LD HL,0xC200 ; LD (HL),0x99 ; LD E,(HL)
    let (mut cpu, mut mem) = setup(&[0x21, 0x00, 0xC2, 0x36, 0x99, 0x5E]);

    step(&mut cpu, &mut mem);
    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(mem.read_byte(0xC200), 0x99);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.e, 0x99);
}

#[test]
fn high_page_and_absolute_loads() {
    // LDH (0x80),A ; LDH A,(0x81) ; LD (C),A ; LD (0xC300),A ; LD A,(0xC301)
    let (mut cpu, mut mem) = setup(&[
        0xE0, 0x80, 0xF0, 0x81, 0xE2, 0xEA, 0x00, 0xC3, 0xFA, 0x01, 0xC3,
    ]);
    mem.write_byte(0xFF81, 0x5C);
    mem.write_byte(0xC301, 0x3D);
    cpu.regs.a = 0x11;
    cpu.regs.c = 0x90;

    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(mem.read_byte(0xFF80), 0x11);

    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(cpu.regs.a, 0x5C);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(mem.read_byte(0xFF90), 0x5C);

    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(mem.read_byte(0xC300), 0x5C);

    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(cpu.regs.a, 0x3D);
    assert_eq!(cpu.regs.pc, 0xC00B);
}

#[test]
fn ld_a16_sp_stores_little_endian() {
    // LD (0xC100),SP
    let (mut cpu, mut mem) = setup(&[0x08, 0x00, 0xC1]);
    cpu.regs.sp = 0xBEEF;

    assert_eq!(step(&mut cpu, &mut mem), 20);
    assert_eq!(mem.read_byte(0xC100), 0xEF);
    assert_eq!(mem.read_byte(0xC101), 0xBE);
}

#[test]
fn inc_dec_8bit_update_flags_and_preserve_c() {
    // INC B ; DEC B ; DEC B ; INC A
    let (mut cpu, mut mem) = setup(&[0x04, 0x05, 0x05, 0x3C]);
    cpu.regs.b = 0x0F;
    cpu.regs.a = 0xFF;
    cpu.set_flag(Flags::C, true);

    // 0x0F -> 0x10: half carry out of bit 3.
    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert_eq!(cpu.regs.b, 0x10);
    assert!(!cpu.get_flag(Flags::Z));
    assert!(!cpu.get_flag(Flags::N));
    assert!(cpu.get_flag(Flags::H));
    assert!(cpu.get_flag(Flags::C));

    // 0x10 -> 0x0F: borrow into bit 4.
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.b, 0x0F);
    assert!(cpu.get_flag(Flags::N));
    assert!(cpu.get_flag(Flags::H));
    assert!(cpu.get_flag(Flags::C));

    // 0x0F -> 0x0E: no borrow.
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.b, 0x0E);
    assert!(!cpu.get_flag(Flags::H));

    // 0xFF -> 0x00 wraps and sets Z.
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flags::Z));
    assert!(cpu.get_flag(Flags::H));
    assert!(cpu.get_flag(Flags::C));
}

#[test]
fn inc_dec_on_hl_memory() {
    // INC (HL) ; DEC (HL) ; DEC (HL)
    let (mut cpu, mut mem) = setup(&[0x34, 0x35, 0x35]);
    cpu.regs.set_hl(0xC100);
    mem.write_byte(0xC100, 0x01);

    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(mem.read_byte(0xC100), 0x02);

    step(&mut cpu, &mut mem);
    step(&mut cpu, &mut mem);
    assert_eq!(mem.read_byte(0xC100), 0x00);
    assert!(cpu.get_flag(Flags::Z));
    assert!(cpu.get_flag(Flags::N));
}

#[test]
fn inc_dec_16bit_wrap_and_leave_flags() {
    // INC BC ; DEC BC ; INC SP
    let (mut cpu, mut mem) = setup(&[0x03, 0x0B, 0x33]);
    cpu.regs.set_bc(0xFFFF);
    cpu.regs.f = Flags::Z | Flags::H;

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.bc(), 0x0000);
    assert_eq!(cpu.regs.f, Flags::Z | Flags::H);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.bc(), 0xFFFF);
    assert_eq!(cpu.regs.f, Flags::Z | Flags::H);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.sp, 0xFFFF);
}

#[test]
fn add_hl_rr_keeps_z_and_reports_bit_11_and_15_carries() {
    // ADD HL,BC ; ADD HL,BC
    let (mut cpu, mut mem) = setup(&[0x09, 0x09]);
    cpu.regs.set_hl(0x0FFF);
    cpu.regs.set_bc(0x0001);
    cpu.regs.f = Flags::Z | Flags::N;

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.hl(), 0x1000);
    assert_eq!(cpu.regs.f, Flags::Z | Flags::H);

    cpu.regs.set_hl(0xFFFF);
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.hl(), 0x0000);
    assert_eq!(cpu.regs.f, Flags::Z | Flags::H | Flags::C);
}

#[test]
fn add_sp_r8_signed_and_flags() {
    // ADD SP,-2 ; ADD SP,+2
    let (mut cpu, mut mem) = setup(&[0xE8, 0xFE, 0xE8, 0x02]);
    cpu.regs.sp = 0xFFF8;
    cpu.regs.f = Flags::Z | Flags::N;

    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(cpu.regs.sp, 0xFFF6);
    assert_eq!(cpu.regs.f, Flags::H | Flags::C);

    cpu.regs.sp = 0x000F;
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.sp, 0x0011);
    assert_eq!(cpu.regs.f, Flags::H);
}

#[test]
fn ld_hl_sp_plus_r8_and_ld_sp_hl() {
    // LD HL,SP+1 ; LD SP,HL
    let (mut cpu, mut mem) = setup(&[0xF8, 0x01, 0xF9]);
    cpu.regs.sp = 0x00FF;

    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(cpu.regs.hl(), 0x0100);
    assert_eq!(cpu.regs.sp, 0x00FF);
    assert_eq!(cpu.regs.f, Flags::H | Flags::C);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.sp, 0x0100);
}

#[test]
fn call_and_ret_round_trip() {
    // 0xC000: CALL 0xD000 ; 0xD000: RET
    let (mut cpu, mut mem) = setup(&[0xCD, 0x00, 0xD0]);
    mem.write_byte(0xD000, 0xC9);

    assert_eq!(step(&mut cpu, &mut mem), 24);
    assert_eq!(cpu.regs.pc, 0xD000);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(mem.read_word(0xFFFC), 0xC003);

    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(cpu.regs.pc, 0xC003);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn rst_pushes_return_address() {
    // RST 38H
    let (mut cpu, mut mem) = setup(&[0xFF]);

    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(cpu.regs.pc, 0x0038);
    assert_eq!(mem.read_word(cpu.regs.sp), 0xC001);
}

#[test]
fn reti_returns_and_enables_interrupts() {
    let (mut cpu, mut mem) = setup(&[0xD9]);
    cpu.regs.sp = 0xFFFC;
    mem.write_word(0xFFFC, 0xC123);

    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(cpu.regs.pc, 0xC123);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert!(cpu.ime());
}

#[test]
fn ei_and_di_toggle_ime() {
    let (mut cpu, mut mem) = setup(&[0xFB, 0xF3]);
    assert!(!cpu.ime());

    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert!(cpu.ime());

    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert!(!cpu.ime());
}

#[test]
fn jr_nz_taken_and_not_taken() {
    // JR NZ,+5
    let (mut cpu, mut mem) = setup(&[0x20, 0x05]);
    cpu.set_flag(Flags::Z, true);
    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.pc, 0xC002);

    cpu.regs.pc = PROGRAM_START;
    cpu.set_flag(Flags::Z, false);
    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(cpu.regs.pc, 0xC007);
}

#[test]
fn jp_z_taken_and_not_taken() {
    // JP Z,0x1234
    let (mut cpu, mut mem) = setup(&[0xCA, 0x34, 0x12]);
    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(cpu.regs.pc, 0xC003);

    cpu.regs.pc = PROGRAM_START;
    cpu.set_flag(Flags::Z, true);
    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(cpu.regs.pc, 0x1234);
}

#[test]
fn jp_absolute_and_jp_hl() {
    // JP 0xC010 ; at 0xC010: JP (HL)
    let (mut cpu, mut mem) = setup(&[0xC3, 0x10, 0xC0]);
    mem.write_byte(0xC010, 0xE9);
    cpu.regs.set_hl(0x4000);

    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(cpu.regs.pc, 0xC010);

    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert_eq!(cpu.regs.pc, 0x4000);
}

#[test]
fn call_nc_and_ret_c() {
    // CALL NC,0xD000 ; at 0xD000: RET C
    let (mut cpu, mut mem) = setup(&[0xD4, 0x00, 0xD0]);
    mem.write_byte(0xD000, 0xD8);

    cpu.set_flag(Flags::C, true);
    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert_eq!(cpu.regs.pc, 0xC003);
    assert_eq!(cpu.regs.sp, 0xFFFE);

    cpu.regs.pc = PROGRAM_START;
    cpu.set_flag(Flags::C, false);
    assert_eq!(step(&mut cpu, &mut mem), 24);
    assert_eq!(cpu.regs.pc, 0xD000);

    // Carry clear: RET C falls through.
    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.pc, 0xD001);

    cpu.regs.pc = 0xD000;
    cpu.set_flag(Flags::C, true);
    assert_eq!(step(&mut cpu, &mut mem), 20);
    assert_eq!(cpu.regs.pc, 0xC003);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn rlca_rrca_rla_rra_behaviour() {
    let (mut cpu, mut mem) = setup(&[0x07, 0x0F, 0x17, 0x1F]);
    cpu.regs.a = 0b1000_0001;

    // RLCA: 1000_0001 -> 0000_0011, C=1.
    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert_eq!(cpu.regs.a, 0b0000_0011);
    assert_eq!(cpu.regs.f, Flags::C);

    // RRCA: 0000_0011 -> 1000_0001, C=1.
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0b1000_0001);
    assert_eq!(cpu.regs.f, Flags::C);

    // RLA with C=1: 1000_0001 -> 0000_0011, C=1.
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0b0000_0011);
    assert_eq!(cpu.regs.f, Flags::C);

    // RRA with C=0: 0000_0011 -> 0000_0001, C=1.
    cpu.set_flag(Flags::C, false);
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0b0000_0001);
    assert_eq!(cpu.regs.f, Flags::C);
}

#[test]
fn accumulator_rotate_always_clears_z() {
    // RLCA on zero.
    let (mut cpu, mut mem) = setup(&[0x07]);
    cpu.regs.a = 0;
    cpu.regs.f = Flags::Z;

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0);
    assert!(cpu.regs.f.is_empty());
}

#[test]
fn daa_cpl_scf_ccf_behaviour() {
    // ADD A,0x15 ; DAA ; CPL ; SCF ; CCF
    let (mut cpu, mut mem) = setup(&[0xC6, 0x15, 0x27, 0x2F, 0x37, 0x3F]);
    cpu.regs.a = 0x27;

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.a, 0x3C);

    // 27 + 15 = 42 in BCD.
    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert_eq!(cpu.regs.a, 0x42);
    assert!(!cpu.get_flag(Flags::Z));
    assert!(!cpu.get_flag(Flags::N));
    assert!(!cpu.get_flag(Flags::H));
    assert!(!cpu.get_flag(Flags::C));

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, !0x42);
    assert!(cpu.get_flag(Flags::H));
    assert!(cpu.get_flag(Flags::N));

    step(&mut cpu, &mut mem);
    assert!(cpu.get_flag(Flags::C));
    assert!(!cpu.get_flag(Flags::H));
    assert!(!cpu.get_flag(Flags::N));

    step(&mut cpu, &mut mem);
    assert!(!cpu.get_flag(Flags::C));
    assert!(!cpu.get_flag(Flags::H));
    assert!(!cpu.get_flag(Flags::N));
}

#[test]
fn daa_after_subtraction() {
    // SUB 0x15 ; DAA
    let (mut cpu, mut mem) = setup(&[0xD6, 0x15, 0x27]);
    cpu.regs.a = 0x42;

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0x2D);
    assert!(cpu.get_flag(Flags::H));

    // 42 - 15 = 27 in BCD.
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0x27);
    assert!(cpu.get_flag(Flags::N));
    assert!(!cpu.get_flag(Flags::C));
}

#[test]
fn daa_sets_carry_on_decimal_overflow() {
    // ADD A,0x01 ; DAA
    let (mut cpu, mut mem) = setup(&[0xC6, 0x01, 0x27]);
    cpu.regs.a = 0x99;

    step(&mut cpu, &mut mem);
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flags::Z));
    assert!(cpu.get_flag(Flags::C));
}

#[test]
fn adc_and_sbc_use_incoming_carry() {
    // ADC A,0x00 ; SBC A,0x0F
    let (mut cpu, mut mem) = setup(&[0xCE, 0x00, 0xDE, 0x0F]);
    cpu.regs.a = 0x0F;
    cpu.set_flag(Flags::C, true);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0x10);
    assert_eq!(cpu.regs.f, Flags::H);

    cpu.set_flag(Flags::C, true);
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.get_flag(Flags::Z));
    assert!(cpu.get_flag(Flags::N));
    assert!(cpu.get_flag(Flags::H));
    assert!(!cpu.get_flag(Flags::C));
}

#[test]
fn cp_sets_flags_without_touching_a() {
    // CP 0x3C ; CP 0x40 ; CP (HL)
    let (mut cpu, mut mem) = setup(&[0xFE, 0x3C, 0xFE, 0x40, 0xBE]);
    cpu.regs.a = 0x3C;
    cpu.regs.set_hl(0xC100);
    mem.write_byte(0xC100, 0x0D);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.a, 0x3C);
    assert_eq!(cpu.regs.f, Flags::Z | Flags::N);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0x3C);
    assert_eq!(cpu.regs.f, Flags::N | Flags::C);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.f, Flags::N | Flags::H);
}

#[test]
fn and_or_flags() {
    // AND 0x0F ; OR 0x00 ; OR B
    let (mut cpu, mut mem) = setup(&[0xE6, 0x0F, 0xF6, 0x00, 0xB0]);
    cpu.regs.a = 0xF0;
    cpu.regs.b = 0x81;
    cpu.set_flag(Flags::C, true);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.regs.f, Flags::Z | Flags::H);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.f, Flags::Z);

    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert_eq!(cpu.regs.a, 0x81);
    assert!(cpu.regs.f.is_empty());
}

#[test]
fn cb_rlc_b_and_flags() {
    // RLC B
    let (mut cpu, mut mem) = setup(&[0xCB, 0x00]);
    cpu.regs.b = 0b1000_0001;

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.pc, 0xC002);
    assert_eq!(cpu.regs.b, 0b0000_0011);
    assert_eq!(cpu.regs.f, Flags::C);
}

#[test]
fn cb_swap_sra_srl() {
    // SWAP A ; SRA A ; SRL A
    let (mut cpu, mut mem) = setup(&[0xCB, 0x37, 0xCB, 0x2F, 0xCB, 0x3F]);
    cpu.regs.a = 0xF1;
    cpu.set_flag(Flags::C, true);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0x1F);
    assert!(cpu.regs.f.is_empty());

    cpu.regs.a = 0x81;
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0xC0);
    assert_eq!(cpu.regs.f, Flags::C);

    cpu.regs.a = 0x01;
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.regs.f, Flags::Z | Flags::C);
}

#[test]
fn cb_bit_keeps_carry() {
    // BIT 7,H
    let (mut cpu, mut mem) = setup(&[0xCB, 0x7C, 0xCB, 0x7C]);
    cpu.regs.h = 0x80;
    cpu.regs.f = Flags::N | Flags::C;

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.f, Flags::H | Flags::C);

    cpu.regs.h = 0x7F;
    step(&mut cpu, &mut mem);
    assert_eq!(cpu.regs.f, Flags::Z | Flags::H | Flags::C);
}

#[test]
fn cb_bit_res_set_on_hl() {
    // SET 7,(HL) ; BIT 7,(HL) ; RES 7,(HL) ; RES 0,A
    let (mut cpu, mut mem) = setup(&[0xCB, 0xFE, 0xCB, 0x7E, 0xCB, 0xBE, 0xCB, 0x87]);
    cpu.regs.set_hl(0xC100);
    mem.write_byte(0xC100, 0x01);
    cpu.regs.a = 0xFF;

    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(mem.read_byte(0xC100), 0x81);

    assert_eq!(step(&mut cpu, &mut mem), 12);
    assert!(!cpu.get_flag(Flags::Z));

    assert_eq!(step(&mut cpu, &mut mem), 16);
    assert_eq!(mem.read_byte(0xC100), 0x01);

    assert_eq!(step(&mut cpu, &mut mem), 8);
    assert_eq!(cpu.regs.a, 0xFE);
}

#[test]
fn stop_consumes_padding_and_freezes_cpu() {
    // STOP 0 ; NOP
    let (mut cpu, mut mem) = setup(&[0x10, 0x00, 0x00]);

    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert_eq!(cpu.regs.pc, 0xC002);
    assert!(cpu.is_stopped());

    assert_eq!(step(&mut cpu, &mut mem), 0);
    assert_eq!(cpu.regs.pc, 0xC002);
    assert_eq!(cpu.clock().total_cycles(), 4);

    cpu.reset();
    assert!(!cpu.is_stopped());
    assert_eq!(cpu.regs.pc, ENTRY_POINT);
}

#[test]
fn halt_idles_until_reset() {
    let (mut cpu, mut mem) = setup(&[0x76, 0x00]);

    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert!(cpu.is_halted());
    assert_eq!(cpu.regs.pc, 0xC001);

    assert_eq!(step(&mut cpu, &mut mem), 4);
    assert_eq!(cpu.regs.pc, 0xC001);
    assert_eq!(cpu.clock().total_cycles(), 8);

    cpu.reset();
    assert!(!cpu.is_halted());
    assert_eq!(cpu.clock().total_cycles(), 0);
}

#[test]
fn refresh_counter_counts_executed_instructions() {
    let (mut cpu, mut mem) = setup(&[0x00, 0x00, 0x00, 0xED]);

    for _ in 0..3 {
        step(&mut cpu, &mut mem);
    }
    assert_eq!(cpu.regs.r, 3);

    assert!(cpu.step(&mut mem).is_err());
    assert_eq!(cpu.regs.r, 3);
}

#[test]
fn clock_accumulates_instruction_costs() {
    // LD BC,d16 ; NOP ; PUSH BC
    let (mut cpu, mut mem) = setup(&[0x01, 0x00, 0x00, 0x00, 0xC5]);

    step(&mut cpu, &mut mem);
    step(&mut cpu, &mut mem);
    step(&mut cpu, &mut mem);

    assert_eq!(cpu.clock().total_cycles(), 32);
    assert_eq!(cpu.clock().total_m_cycles(), 8);
    assert_eq!(cpu.clock().last_cycles(), 16);
}

#[test]
fn dmg_boot_state_registers() {
    let mut cpu = Cpu::new();
    cpu.regs.pc = 0x1234;
    cpu.apply_dmg_boot_state();

    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp, INITIAL_SP);
    assert_eq!(cpu.regs.pc, ENTRY_POINT);
}

#[test]
fn table_covers_every_assigned_opcode() {
    let table = InstructionTable::global();
    assert_eq!(table.len(), 256 - UNASSIGNED_OPCODES.len());

    for opcode in 0..=u8::MAX {
        match table.lookup(opcode) {
            Some(instruction) => {
                assert_eq!(instruction.opcode, opcode);
                assert!((1..=3).contains(&instruction.length));
            }
            None => assert!(UNASSIGNED_OPCODES.contains(&opcode)),
        }
    }

    assert_eq!(table.lookup(0xCB).map(|i| i.mnemonic), Some("PREFIX CB"));
    assert_eq!(table.lookup(0x76).map(|i| i.mnemonic), Some("HALT"));
}

#[test]
fn pc_advances_by_encoded_length() {
    let is_branch = |mnemonic: &str| {
        ["JP", "JR", "CALL", "RET", "RST"]
            .iter()
            .any(|prefix| mnemonic.starts_with(prefix))
    };

    let mut mem = Memory::new();
    for instruction in InstructionTable::global().iter() {
        if is_branch(instruction.mnemonic) {
            continue;
        }

        mem.load_bytes(PROGRAM_START, &[instruction.opcode, 0x00, 0x00]);
        let mut cpu = Cpu::new();
        cpu.regs.pc = PROGRAM_START;

        let cycles = step(&mut cpu, &mut mem);
        assert_eq!(
            cpu.regs.pc,
            PROGRAM_START + instruction.length as u16,
            "{instruction}"
        );
        assert!(cycles >= 4 && cycles % 4 == 0, "{instruction}: {cycles}");
    }
}

#[derive(Default)]
struct Recorded {
    pcs: Vec<u16>,
    mnemonics: Vec<&'static str>,
    cycles: u32,
}

struct RecordingTracer(Rc<RefCell<Recorded>>);

impl Tracer for RecordingTracer {
    fn before_step(
        &mut self,
        pc: u16,
        fetched: &FetchedInstruction,
        instruction: &Instruction,
        regs: &Registers,
    ) {
        assert_eq!(pc, regs.pc);
        assert_eq!(fetched.opcode, instruction.opcode);
        let mut recorded = self.0.borrow_mut();
        recorded.pcs.push(pc);
        recorded.mnemonics.push(instruction.mnemonic);
    }

    fn after_step(&mut self, _regs: &Registers, _clock: &Clock, cycles: u32) {
        self.0.borrow_mut().cycles += cycles;
    }
}

#[test]
fn tracer_sees_each_executed_instruction() {
    // NOP ; LD A,0x42 ; <unassigned>
    let (mut cpu, mut mem) = setup(&[0x00, 0x3E, 0x42, 0xD3]);
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    cpu.set_tracer(Box::new(RecordingTracer(Rc::clone(&recorded))));

    step(&mut cpu, &mut mem);
    step(&mut cpu, &mut mem);
    assert!(cpu.step(&mut mem).is_err());

    let recorded = recorded.borrow();
    assert_eq!(recorded.pcs, vec![0xC000, 0xC001]);
    assert_eq!(recorded.mnemonics, vec!["NOP", "LD A,d8"]);
    assert_eq!(recorded.cycles, 12);
}

#[test]
fn reset_keeps_tracer() {
    let (mut cpu, mut mem) = setup(&[0x00]);
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    cpu.set_tracer(Box::new(RecordingTracer(Rc::clone(&recorded))));

    cpu.reset();
    cpu.regs.pc = PROGRAM_START;
    step(&mut cpu, &mut mem);

    assert_eq!(recorded.borrow().pcs, vec![0xC000]);
    assert!(cpu.clear_tracer().is_some());
}
