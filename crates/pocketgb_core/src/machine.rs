use crate::clock::Clock;
use crate::cpu::{Cpu, Registers};
use crate::error::EmuError;
use crate::memory::Memory;
use crate::trace::Tracer;


/// T-cycles in one DMG video frame (154 lines of 456 dots).
pub const CYCLES_PER_FRAME: u32 = 70_224;

/// Why [`GameBoy::step_frame`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A full frame worth of cycles ran and vblank was signalled.
    Completed,
    /// The CPU executed HALT; with no interrupts it will not resume.
    Halted,
    /// The CPU executed STOP.
    Stopped,
}

/// A complete machine: the CPU plus the address space it runs against.
///
/// This is the single owner of all emulated state. Hosts drive it by
/// calling [`GameBoy::step`] once per instruction and
/// [`GameBoy::on_vblank`] once per video frame, or let
/// [`GameBoy::step_frame`] do both.
#[derive(Debug)]
pub struct GameBoy {
    cpu: Cpu,
    memory: Memory,
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBoy {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            memory: Memory::new(),
        }
    }

    /// Load a ROM image into the cartridge window.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), EmuError> {
        self.memory.load_rom(rom)
    }

    /// Put the machine in the state the DMG boot ROM leaves behind: the
    /// documented I/O register values and the boot hand-off register values.
    pub fn set_power_on_defaults(&mut self) {
        self.memory.set_power_on_defaults();
        self.cpu.apply_dmg_boot_state();
    }

    /// Execute exactly one instruction.
    pub fn step(&mut self) -> Result<u32, EmuError> {
        self.cpu.step(&mut self.memory)
    }

    /// Run until one frame's worth of cycles has elapsed, then signal vblank.
    ///
    /// Returns early, without signalling vblank, if the CPU halts or stops.
    pub fn step_frame(&mut self) -> Result<FrameOutcome, EmuError> {
        let mut elapsed = 0u32;

        while elapsed < CYCLES_PER_FRAME {
            if self.cpu.is_stopped() {
                return Ok(FrameOutcome::Stopped);
            }
            if self.cpu.is_halted() {
                return Ok(FrameOutcome::Halted);
            }
            elapsed += self.step()?;
        }

        self.on_vblank();
        Ok(FrameOutcome::Completed)
    }

    /// Frame boundary notification.
    ///
    /// Reserved for interrupt delivery; currently it has no effect on the
    /// emulated machine.
    pub fn on_vblank(&mut self) {
        log::trace!(
            "vblank at {} cycles, PC=0x{:04X}",
            self.cpu.clock().total_cycles(),
            self.cpu.regs.pc
        );
    }

    /// Reset the CPU to power-on state. Memory, including the loaded ROM,
    /// is kept.
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.cpu.is_stopped()
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    #[inline]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    #[inline]
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    #[inline]
    pub fn registers(&self) -> &Registers {
        self.cpu.registers()
    }

    #[inline]
    pub fn clock(&self) -> &Clock {
        self.cpu.clock()
    }

    #[inline]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    #[inline]
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn serial_output(&self) -> &[u8] {
        self.memory.serial_output()
    }

    pub fn take_serial_output(&mut self) -> Vec<u8> {
        self.memory.take_serial_output()
    }

    pub fn set_tracer(&mut self, tracer: Box<dyn Tracer>) {
        self.cpu.set_tracer(tracer);
    }
}
