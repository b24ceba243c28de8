use crate::cpu::{Cpu, Flags};
use crate::memory::Memory;

impl Cpu {
    /// Evaluate the 2-bit condition field: NZ, Z, NC, C.
    #[inline]
    fn cc_condition(&self, opcode: u8) -> bool {
        match (opcode >> 3) & 0x03 {
            0 => !self.get_flag(Flags::Z),
            1 => self.get_flag(Flags::Z),
            2 => !self.get_flag(Flags::C),
            _ => self.get_flag(Flags::C),
        }
    }

    pub(crate) fn exec_jr(&mut self, mem: &mut Memory, _opcode: u8) -> u32 {
        self.jr(mem, true)
    }

    pub(crate) fn exec_jr_cc(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x20 | 0x28 | 0x30 | 0x38));
        self.jr(mem, self.cc_condition(opcode))
    }

    pub(crate) fn exec_jp_a16(&mut self, mem: &mut Memory, _opcode: u8) -> u32 {
        self.regs.pc = self.fetch16(mem);
        16
    }

    pub(crate) fn exec_jp_cc(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xC2 | 0xCA | 0xD2 | 0xDA));
        self.jp_cond(mem, self.cc_condition(opcode))
    }

    pub(crate) fn exec_jp_hl(&mut self, _mem: &mut Memory, _opcode: u8) -> u32 {
        self.regs.pc = self.regs.hl();
        4
    }

    pub(crate) fn exec_call_cc(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xC4 | 0xCC | 0xD4 | 0xDC));
        self.call_cond(mem, self.cc_condition(opcode))
    }

    pub(crate) fn exec_ret_cc(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xC0 | 0xC8 | 0xD0 | 0xD8));
        self.ret_cond(mem, self.cc_condition(opcode))
    }
}
