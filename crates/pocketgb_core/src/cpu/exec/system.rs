use crate::cpu::Cpu;
use crate::memory::Memory;

impl Cpu {
    pub(crate) fn exec_nop(&mut self, _mem: &mut Memory, _opcode: u8) -> u32 {
        4
    }

    pub(crate) fn exec_stop(&mut self, mem: &mut Memory, _opcode: u8) -> u32 {
        // STOP is a 2-byte instruction; the second byte is padding (usually
        // 0x00) and is discarded.
        let _padding = self.fetch8(mem);
        self.stopped = true;
        self.halted = false;
        log::debug!("STOP at PC=0x{:04X}", self.regs.pc.wrapping_sub(2));
        4
    }

    pub(crate) fn exec_halt(&mut self, _mem: &mut Memory, _opcode: u8) -> u32 {
        self.halted = true;
        log::debug!("HALT at PC=0x{:04X}", self.regs.pc.wrapping_sub(1));
        4
    }

    pub(crate) fn exec_di(&mut self, _mem: &mut Memory, _opcode: u8) -> u32 {
        self.ime = false;
        4
    }

    pub(crate) fn exec_ei(&mut self, _mem: &mut Memory, _opcode: u8) -> u32 {
        self.ime = true;
        4
    }

    pub(crate) fn exec_prefix_cb(&mut self, mem: &mut Memory, _opcode: u8) -> u32 {
        self.step_cb(mem)
    }
}
