use crate::cpu::Cpu;
use crate::memory::Memory;

impl Cpu {
    pub(crate) fn exec_push(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xC5 | 0xD5 | 0xE5 | 0xF5));

        let value = match (opcode >> 4) & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            _ => self.regs.af(),
        };

        self.push_u16(mem, value);
        16
    }

    pub(crate) fn exec_pop(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xC1 | 0xD1 | 0xE1 | 0xF1));

        let value = self.pop_u16(mem);
        match (opcode >> 4) & 0x03 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            _ => self.regs.set_af(value),
        }
        12
    }

    pub(crate) fn exec_rst(&mut self, mem: &mut Memory, opcode: u8) -> u32 {
        debug_assert!(matches!(
            opcode,
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF
        ));

        let ret = self.regs.pc;
        self.push_u16(mem, ret);
        self.regs.pc = (opcode & 0x38) as u16;
        16
    }

    pub(crate) fn exec_call_a16(&mut self, mem: &mut Memory, _opcode: u8) -> u32 {
        let addr = self.fetch16(mem);
        let ret = self.regs.pc;
        self.push_u16(mem, ret);
        self.regs.pc = addr;
        24
    }

    pub(crate) fn exec_ret(&mut self, mem: &mut Memory, _opcode: u8) -> u32 {
        self.regs.pc = self.pop_u16(mem);
        16
    }

    /// RETI: return and set IME in one step.
    pub(crate) fn exec_reti(&mut self, mem: &mut Memory, _opcode: u8) -> u32 {
        self.regs.pc = self.pop_u16(mem);
        self.ime = true;
        16
    }
}
