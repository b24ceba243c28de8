use crate::memory::Memory;

use super::helpers::HL_INDIRECT;
use super::{Cpu, Flags};

/// Mnemonics of the eight rotate/shift operations on the CB page, indexed by
/// bits 5..3 of the sub-opcode.
pub(crate) const CB_SHIFT_MNEMONICS: [&str; 8] =
    ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SWAP", "SRL"];

impl Cpu {
    /// Execute the CB-prefixed instruction that follows the 0xCB byte.
    ///
    /// The sub-opcode splits as `xx yyy zzz`: `x` selects the group
    /// (shift/rotate, BIT, RES, SET), `y` the operation or bit number and `z`
    /// the register in the usual r8 encoding. Cycle counts include the
    /// prefix byte.
    pub(super) fn step_cb(&mut self, mem: &mut Memory) -> u32 {
        let cb = self.fetch8(mem);
        let x = cb >> 6;
        let y = (cb >> 3) & 0x07;
        let z = cb & 0x07;
        let on_hl = z == HL_INDIRECT;

        match x {
            0 => {
                let value = self.read_reg8(mem, z);
                let result = self.cb_shift(y, value);
                self.write_reg8(mem, z, result);
                if on_hl { 16 } else { 8 }
            }
            1 => {
                // BIT b,r: Z = !bit, N = 0, H = 1, C unchanged.
                let value = self.read_reg8(mem, z);
                self.set_flag(Flags::Z, value & (1 << y) == 0);
                self.set_flag(Flags::N, false);
                self.set_flag(Flags::H, true);
                if on_hl { 12 } else { 8 }
            }
            2 => {
                let value = self.read_reg8(mem, z) & !(1 << y);
                self.write_reg8(mem, z, value);
                if on_hl { 16 } else { 8 }
            }
            _ => {
                let value = self.read_reg8(mem, z) | (1 << y);
                self.write_reg8(mem, z, value);
                if on_hl { 16 } else { 8 }
            }
        }
    }

    /// Rotate/shift/swap `value` according to `op` (see
    /// [`CB_SHIFT_MNEMONICS`]). Z reflects the result, N and H are cleared,
    /// C receives the bit shifted out (cleared for SWAP).
    fn cb_shift(&mut self, op: u8, value: u8) -> u8 {
        let carry_in = u8::from(self.get_flag(Flags::C));
        let (result, carry_out) = match op {
            0 => (value.rotate_left(1), value & 0x80 != 0),
            1 => (value.rotate_right(1), value & 0x01 != 0),
            2 => ((value << 1) | carry_in, value & 0x80 != 0),
            3 => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
            4 => (value << 1, value & 0x80 != 0),
            5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            6 => (value.rotate_left(4), false),
            _ => (value >> 1, value & 0x01 != 0),
        };

        self.clear_flags();
        self.set_flag(Flags::Z, result == 0);
        self.set_flag(Flags::C, carry_out);
        result
    }
}
