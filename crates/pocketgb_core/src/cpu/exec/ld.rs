use crate::cpu::helpers::HL_INDIRECT;
use crate::cpu::Cpu;
use crate::memory::Memory;

impl Cpu {
    pub(crate) fn exec_ld_rr_d16(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x01 | 0x11 | 0x21 | 0x31));

        let value = self.fetch16(mem);
        self.write_rp(opcode >> 4, value);
        12
    }

    pub(crate) fn exec_ld_r_d8(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(
            opcode,
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E
        ));

        let reg = (opcode >> 3) & 0x07;
        let value = self.fetch8(mem);
        self.write_reg8(mem, reg, value);

        if reg == HL_INDIRECT { 12 } else { 8 }
    }

    /// `LD r,r'` for 0x40..0x7F, except 0x76 which is HALT.
    pub(crate) fn exec_ld_r_r(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!((0x40..=0x7F).contains(&opcode) && opcode != 0x76);

        let dst = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;
        let value = self.read_reg8(mem, src);
        self.write_reg8(mem, dst, value);

        if dst == HL_INDIRECT || src == HL_INDIRECT { 8 } else { 4 }
    }

    pub(crate) fn exec_ld_a16_sp(&mut self, mem: &mut Memory, _opcode: u8) -> u32 {
        let addr = self.fetch16(mem);
        mem.write_word(addr, self.regs.sp);
        20
    }

    pub(crate) fn exec_ldh_a8(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xE0 | 0xF0));

        let offset = self.fetch8(mem) as u16;
        let addr = 0xFF00 | offset;
        match opcode {
            0xE0 => mem.write_byte(addr, self.regs.a),
            _ => self.regs.a = mem.read_byte(addr),
        }
        12
    }

    pub(crate) fn exec_ldh_c(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xE2 | 0xF2));

        let addr = 0xFF00 | self.regs.c as u16;
        match opcode {
            0xE2 => mem.write_byte(addr, self.regs.a),
            _ => self.regs.a = mem.read_byte(addr),
        }
        8
    }

    pub(crate) fn exec_ld_a16_a(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xEA | 0xFA));

        let addr = self.fetch16(mem);
        match opcode {
            0xEA => mem.write_byte(addr, self.regs.a),
            _ => self.regs.a = mem.read_byte(addr),
        }
        16
    }

    /// Resolve the address for `LD (rr),A` / `LD A,(rr)` and apply the HL
    /// post-increment or post-decrement of the `(HL+)` / `(HL-)` forms.
    fn indirect_addr(&mut self, opcode: u8) -> u16 {
        match (opcode >> 4) & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            _ => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    pub(crate) fn exec_ld_indirect_a(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x02 | 0x12 | 0x22 | 0x32));

        let addr = self.indirect_addr(opcode);
        mem.write_byte(addr, self.regs.a);
        8
    }

    pub(crate) fn exec_ld_a_indirect(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x0A | 0x1A | 0x2A | 0x3A));

        let addr = self.indirect_addr(opcode);
        self.regs.a = mem.read_byte(addr);
        8
    }

    pub(crate) fn exec_ld_sp_hl(&mut self, _mem: &mut Memory, _opcode: u8) -> u32 {
        self.regs.sp = self.regs.hl();
        8
    }
}
