use super::{Cpu, Flags};

impl Cpu {
    /// `A += value`, plus the carry flag when `with_carry` is set (ADC).
    pub(super) fn alu_add(&mut self, value: u8, with_carry: bool) {
        let a = self.regs.a;
        let carry_in = u8::from(with_carry && self.get_flag(Flags::C));

        let half = (a & 0x0F) + (value & 0x0F) + carry_in;
        let full = a as u16 + value as u16 + carry_in as u16;
        let result = full as u8;

        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::H, half > 0x0F);
        self.set_flag(Flags::C, full > 0xFF);
    }

    /// `A -= value`, minus the carry flag when `with_carry` is set (SBC).
    pub(super) fn alu_sub(&mut self, value: u8, with_carry: bool) {
        let borrow_in = u8::from(with_carry && self.get_flag(Flags::C));
        self.regs.a = self.sub_flags(self.regs.a, value, borrow_in);
    }

    /// CP: the flags of `A - value` with A left alone.
    #[inline]
    pub(super) fn alu_cp(&mut self, value: u8) {
        self.sub_flags(self.regs.a, value, 0);
    }

    /// Shared flag computation for SUB/SBC/CP. Returns the truncated result.
    ///
    /// H is a borrow from bit 4: `(a & 0xF) < (value & 0xF) + carry`.
    fn sub_flags(&mut self, a: u8, value: u8, carry_in: u8) -> u8 {
        let result = a.wrapping_sub(value).wrapping_sub(carry_in);

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, (a & 0x0F) < (value & 0x0F) + carry_in);
        self.set_flag(Flags::C, (a as u16) < value as u16 + carry_in as u16);
        result
    }

    #[inline]
    pub(super) fn alu_and(&mut self, value: u8) {
        let result = self.regs.a & value;
        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::H, true);
    }

    #[inline]
    pub(super) fn alu_or(&mut self, value: u8) {
        let result = self.regs.a | value;
        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
    }

    #[inline]
    pub(super) fn alu_xor(&mut self, value: u8) {
        let result = self.regs.a ^ value;
        self.regs.a = result;

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
    }

    /// Dispatch one of the eight accumulator operations by its 3-bit
    /// encoding: ADD, ADC, SUB, SBC, AND, XOR, OR, CP.
    pub(super) fn alu_op(&mut self, operation: u8, value: u8) {
        match operation & 0x07 {
            0 => self.alu_add(value, false),
            1 => self.alu_add(value, true),
            2 => self.alu_sub(value, false),
            3 => self.alu_sub(value, true),
            4 => self.alu_and(value),
            5 => self.alu_xor(value),
            6 => self.alu_or(value),
            _ => self.alu_cp(value),
        }
    }

    /// DAA. N tells whether the previous operation was a subtraction, so it
    /// is read here and never written.
    pub(super) fn alu_daa(&mut self) {
        let mut a = self.regs.a;
        let mut adjust: u8 = if self.get_flag(Flags::C) { 0x60 } else { 0x00 };
        if self.get_flag(Flags::H) {
            adjust |= 0x06;
        }

        if !self.get_flag(Flags::N) {
            if (a & 0x0F) > 0x09 {
                adjust |= 0x06;
            }
            if a > 0x99 {
                adjust |= 0x60;
            }
            a = a.wrapping_add(adjust);
        } else {
            a = a.wrapping_sub(adjust);
        }

        self.set_flag(Flags::C, adjust >= 0x60);
        self.set_flag(Flags::H, false);
        self.set_flag(Flags::Z, a == 0);
        self.regs.a = a;
    }

    /// INC r / INC (HL). Carry is untouched; H means the low nibble was 0xF.
    #[inline]
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, (value & 0x0F) == 0x0F);
        result
    }

    /// DEC r / DEC (HL). Carry is untouched; H means the low nibble was 0.
    #[inline]
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N, true);
        self.set_flag(Flags::H, (value & 0x0F) == 0);
        result
    }

    /// `ADD HL,rr`: Z unaffected, N cleared, H from bit 11, C from bit 15.
    #[inline]
    pub(super) fn alu_add16_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        let result = hl.wrapping_add(value);

        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.set_flag(Flags::C, hl as u32 + value as u32 > 0xFFFF);

        self.regs.set_hl(result);
    }

    /// Signed 8-bit offset added to a 16-bit base, for `ADD SP,r8` and
    /// `LD HL,SP+r8`.
    ///
    /// Z and N are cleared; H and C come from the unsigned low-byte addition.
    #[inline]
    pub(super) fn alu_add_sp_offset(&mut self, base: u16, displacement: u8) -> u16 {
        let offset = displacement as i8 as i16 as u16;
        self.set_flag(Flags::Z, false);
        self.set_flag(Flags::N, false);
        self.set_flag(Flags::H, (base & 0x000F) + (offset & 0x000F) > 0x000F);
        self.set_flag(Flags::C, (base & 0x00FF) + (offset & 0x00FF) > 0x00FF);
        base.wrapping_add(offset)
    }
}
