use crate::memory::Memory;

use super::Cpu;

/// Register index 6 in the r8 encoding addresses memory at (HL).
pub(super) const HL_INDIRECT: u8 = 6;

impl Cpu {
    /// Read an 8-bit register or (HL) by its opcode encoding:
    /// 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A.
    #[inline]
    pub(super) fn read_reg8(&self, mem: &Memory, index: u8) -> u8 {
        match index & 0x07 {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            HL_INDIRECT => mem.read_byte(self.regs.hl()),
            _ => self.regs.a,
        }
    }

    /// Write an 8-bit register or (HL); same encoding as `read_reg8`.
    #[inline]
    pub(super) fn write_reg8(&mut self, mem: &mut Memory, index: u8, value: u8) {
        match index & 0x07 {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            HL_INDIRECT => mem.write_byte(self.regs.hl(), value),
            _ => self.regs.a = value,
        }
    }

    /// Read a 16-bit pair by its `rp` encoding: 0=BC, 1=DE, 2=HL, 3=SP.
    #[inline]
    pub(super) fn read_rp(&self, rp: u8) -> u16 {
        match rp & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            _ => self.regs.sp,
        }
    }

    #[inline]
    pub(super) fn write_rp(&mut self, rp: u8, value: u16) {
        match rp & 0x03 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            _ => self.regs.sp = value,
        }
    }

    /// Consume one immediate byte at PC.
    #[inline]
    pub(super) fn fetch8(&mut self, mem: &Memory) -> u8 {
        let value = mem.read_byte(self.regs.pc);
        self.regs.increment_pc();
        value
    }

    /// Consume a little-endian immediate word at PC.
    #[inline]
    pub(super) fn fetch16(&mut self, mem: &Memory) -> u16 {
        let lo = self.fetch8(mem);
        let hi = self.fetch8(mem);
        u16::from_le_bytes([lo, hi])
    }

    /// Push a word: high byte at SP-1, then low byte at SP-2.
    #[inline]
    pub(super) fn push_u16(&mut self, mem: &mut Memory, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.decrement_sp();
        mem.write_byte(self.regs.sp, hi);
        self.regs.decrement_sp();
        mem.write_byte(self.regs.sp, lo);
    }

    /// Pop a word: low byte from SP, then high byte from SP+1.
    #[inline]
    pub(super) fn pop_u16(&mut self, mem: &Memory) -> u16 {
        let lo = mem.read_byte(self.regs.sp);
        self.regs.increment_sp();
        let hi = mem.read_byte(self.regs.sp);
        self.regs.increment_sp();
        u16::from_le_bytes([lo, hi])
    }

    /// Relative jump helper used by JR/JR cc.
    ///
    /// The displacement is a signed offset from the address following the
    /// operand byte. The operand is consumed whether or not the jump is taken.
    pub(super) fn jr(&mut self, mem: &Memory, cond: bool) -> u32 {
        let offset = self.fetch8(mem) as i8;
        if cond {
            self.regs.pc = self.regs.pc.wrapping_add_signed(offset as i16);
            12
        } else {
            8
        }
    }

    /// Absolute jump helper used by JP cc,a16.
    pub(super) fn jp_cond(&mut self, mem: &Memory, cond: bool) -> u32 {
        let addr = self.fetch16(mem);
        if cond {
            self.regs.pc = addr;
            16
        } else {
            12
        }
    }

    /// Conditional call helper used by CALL cc,a16.
    pub(super) fn call_cond(&mut self, mem: &mut Memory, cond: bool) -> u32 {
        let addr = self.fetch16(mem);
        if cond {
            let ret = self.regs.pc;
            self.push_u16(mem, ret);
            self.regs.pc = addr;
            24
        } else {
            12
        }
    }

    /// Conditional return helper used by RET cc.
    pub(super) fn ret_cond(&mut self, mem: &Memory, cond: bool) -> u32 {
        if cond {
            self.regs.pc = self.pop_u16(mem);
            20
        } else {
            8
        }
    }
}
