use crate::cpu::helpers::HL_INDIRECT;
use crate::cpu::{Cpu, Flags};
use crate::memory::Memory;

impl Cpu {
    /// ADD/ADC/SUB/SBC/AND/XOR/OR/CP with a register or (HL), 0x80..0xBF.
    pub(crate) fn exec_alu_reg(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!((0x80..=0xBF).contains(&opcode));

        let src = opcode & 0x07;
        let value = self.read_reg8(mem, src);
        self.alu_op(opcode >> 3, value);

        if src == HL_INDIRECT { 8 } else { 4 }
    }

    /// The same eight operations with an immediate operand.
    pub(crate) fn exec_alu_imm(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(
            opcode,
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE
        ));

        let value = self.fetch8(mem);
        self.alu_op(opcode >> 3, value);
        8
    }

    pub(crate) fn exec_rotate_a(&mut self, _mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x07 | 0x0F | 0x17 | 0x1F));

        let a = self.regs.a;
        let carry_in = self.get_flag(Flags::C);
        let (result, carry_out) = match opcode {
            // RLCA: bit 7 to carry and bit 0.
            0x07 => (a.rotate_left(1), a & 0x80 != 0),
            // RRCA: bit 0 to carry and bit 7.
            0x0F => (a.rotate_right(1), a & 0x01 != 0),
            // RLA: 9-bit rotate left through carry.
            0x17 => ((a << 1) | u8::from(carry_in), a & 0x80 != 0),
            // RRA: 9-bit rotate right through carry.
            _ => ((a >> 1) | (u8::from(carry_in) << 7), a & 0x01 != 0),
        };

        self.regs.a = result;
        self.clear_flags();
        self.set_flag(Flags::C, carry_out);
        4
    }

    pub(crate) fn exec_add_hl_rr(&mut self, _mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x09 | 0x19 | 0x29 | 0x39));

        let value = self.read_rp(opcode >> 4);
        self.alu_add16_hl(value);
        8
    }

    pub(crate) fn exec_add_sp_r8(&mut self, mem: &mut Memory, _opcode: u8) -> u32 {
        let imm = self.fetch8(mem);
        self.regs.sp = self.alu_add_sp_offset(self.regs.sp, imm);
        16
    }

    pub(crate) fn exec_ld_hl_sp_r8(&mut self, mem: &mut Memory, _opcode: u8) -> u32 {
        let imm = self.fetch8(mem);
        let result = self.alu_add_sp_offset(self.regs.sp, imm);
        self.regs.set_hl(result);
        12
    }

    pub(crate) fn exec_daa(&mut self, _mem: &mut Memory, _opcode: u8) -> u32 {
        self.alu_daa();
        4
    }

    pub(crate) fn exec_cpl(&mut self, _mem: &mut Memory, _opcode: u8) -> u32 {
        self.regs.a = !self.regs.a;
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, true);
        4
    }

    pub(crate) fn exec_scf(&mut self, _mem: &mut Memory, _opcode: u8) -> u32 {
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::C, true);
        4
    }

    pub(crate) fn exec_ccf(&mut self, _mem: &mut Memory, _opcode: u8) -> u32 {
        let carry = self.get_flag(Flags::C);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::C, !carry);
        4
    }
}
