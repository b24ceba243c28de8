use std::fmt;

use crate::clock::Clock;
use crate::error::EmuError;
use crate::memory::Memory;
use crate::trace::Tracer;

mod alu;
mod cb;
mod exec;
mod helpers;
mod regs;
mod table;

#[cfg(test)]
mod tests;

pub(crate) use cb::CB_SHIFT_MNEMONICS;
pub use regs::{Flags, Registers, ENTRY_POINT, INITIAL_SP};
pub use table::{Handler, Instruction, InstructionTable, UNASSIGNED_OPCODES};

/// Game Boy CPU core (Sharp LR35902).
///
/// Owns the register file, the cycle clock and the small amount of control
/// state the instruction set can observe (IME, HALT, STOP). Memory is owned
/// by the caller and lent to [`Cpu::step`] for the duration of one
/// instruction.
pub struct Cpu {
    pub regs: Registers,
    clock: Clock,
    /// Interrupt master enable. Only the flag itself is modelled; no
    /// interrupt is ever delivered.
    ime: bool,
    halted: bool,
    /// Set by STOP. A stopped CPU executes nothing until `reset`.
    stopped: bool,
    tracer: Option<Box<dyn Tracer>>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu")
            .field("regs", &self.regs)
            .field("clock", &self.clock)
            .field("ime", &self.ime)
            .field("halted", &self.halted)
            .field("stopped", &self.stopped)
            .field("tracer", &self.tracer.is_some())
            .finish()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            clock: Clock::new(),
            ime: false,
            halted: false,
            stopped: false,
            tracer: None,
        }
    }

    /// Return the CPU to its power-on state. Any installed tracer is kept.
    pub fn reset(&mut self) {
        self.regs = Registers::new();
        self.clock.reset();
        self.ime = false;
        self.halted = false;
        self.stopped = false;
    }

    /// Load the register values the DMG boot ROM leaves behind when it jumps
    /// to the cartridge entry point.
    pub fn apply_dmg_boot_state(&mut self) {
        self.regs.set_af(0x01B0);
        self.regs.set_bc(0x0013);
        self.regs.set_de(0x00D8);
        self.regs.set_hl(0x014D);
        self.regs.sp = INITIAL_SP;
        self.regs.pc = ENTRY_POINT;
        self.ime = false;
    }

    /// Execute a single instruction and return the number of T-cycles taken.
    ///
    /// The opcode byte is looked up before anything is modified, so an
    /// unassigned opcode leaves registers, memory and clock exactly as they
    /// were. The opcode byte itself is consumed here; handlers consume their
    /// own operand bytes.
    pub fn step(&mut self, memory: &mut Memory) -> Result<u32, EmuError> {
        if self.stopped {
            log::warn!("step() called on a stopped CPU at PC=0x{:04X}", self.regs.pc);
            return Ok(0);
        }

        if self.halted {
            // No interrupt can wake the CPU, so HALT idles one machine cycle
            // per step until reset.
            self.clock.tick(4);
            return Ok(4);
        }

        let pc = self.regs.pc;
        let fetched = memory.fetch_instruction(pc);
        let Some(instruction) = InstructionTable::global().lookup(fetched.opcode) else {
            log::error!(
                "Unimplemented opcode 0x{opcode:02X} at PC=0x{pc:04X} (SP=0x{sp:04X} AF=0x{af:04X} BC=0x{bc:04X} DE=0x{de:04X} HL=0x{hl:04X})",
                opcode = fetched.opcode,
                pc = pc,
                sp = self.regs.sp,
                af = self.regs.af(),
                bc = self.regs.bc(),
                de = self.regs.de(),
                hl = self.regs.hl(),
            );
            return Err(EmuError::UnimplementedOpcode {
                opcode: fetched.opcode,
                pc,
            });
        };

        if let Some(tracer) = self.tracer.as_mut() {
            tracer.before_step(pc, &fetched, instruction, &self.regs);
        }

        self.regs.increment_pc();
        let cycles = (instruction.execute)(self, memory, fetched.opcode);
        self.regs.bump_refresh();
        self.clock.tick(cycles);

        if let Some(tracer) = self.tracer.as_mut() {
            tracer.after_step(&self.regs, &self.clock, cycles);
        }

        Ok(cycles)
    }

    #[inline]
    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    #[inline]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[inline]
    pub fn ime(&self) -> bool {
        self.ime
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn set_tracer(&mut self, tracer: Box<dyn Tracer>) {
        self.tracer = Some(tracer);
    }

    pub fn clear_tracer(&mut self) -> Option<Box<dyn Tracer>> {
        self.tracer.take()
    }

    #[inline]
    pub fn get_flag(&self, flag: Flags) -> bool {
        self.regs.flag(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flags, value: bool) {
        self.regs.set_flag(flag, value);
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.f = Flags::empty();
    }
}
