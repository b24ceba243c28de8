use crate::error::EmuError;

mod init;
mod serial;

use serial::Serial;

/// Size of the CPU-visible address space.
pub const MEMORY_SIZE: usize = 0x10000;
/// Start of the fixed cartridge ROM window.
pub const ROM_BANK_START: u16 = 0x0000;
/// Start of video RAM; the ROM window ends just below it.
pub const VIDEO_RAM_START: u16 = 0x8000;
/// Largest ROM image that fits below video RAM.
pub const MAX_ROM_SIZE: usize = (VIDEO_RAM_START - ROM_BANK_START) as usize;

/// Serial transfer data (SB).
pub const SERIAL_DATA: u16 = 0xFF01;
/// Serial transfer control (SC).
pub const SERIAL_CONTROL: u16 = 0xFF02;
/// LCD control (LCDC).
pub const LCD_CONTROL: u16 = 0xFF40;

const WORK_RAM_START: u16 = 0xC000;
const ECHO_RAM_START: u16 = 0xE000;
const ECHO_RAM_END: u16 = 0xFDFF;

/// Opcode byte at some address plus the two bytes that follow it.
///
/// Handlers that need immediate operands still fetch them through the CPU so
/// that PC advances; this is a read-only peek used for decode and tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchedInstruction {
    pub opcode: u8,
    pub operands: [u8; 2],
}

impl FetchedInstruction {
    #[inline]
    pub fn imm8(&self) -> u8 {
        self.operands[0]
    }

    #[inline]
    pub fn imm16(&self) -> u16 {
        u16::from_le_bytes(self.operands)
    }
}

/// Map a CPU address to an index into the backing buffer.
///
/// Echo RAM (0xE000..0xFDFF) mirrors work RAM (0xC000..0xDDFF); everything
/// else maps to itself.
#[inline]
pub fn translate(addr: u16) -> usize {
    match addr {
        ECHO_RAM_START..=ECHO_RAM_END => (addr - ECHO_RAM_START + WORK_RAM_START) as usize,
        _ => addr as usize,
    }
}

/// Flat 64 KiB address space.
///
/// Every address is readable and writable. The only side effect modelled is
/// the serial port debug channel: writing a "start transfer, internal clock"
/// value to SC emits the byte currently held in SB.
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
    serial: Serial,
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("serial_pending", &self.serial.output.len())
            .finish_non_exhaustive()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: [0; MEMORY_SIZE],
            serial: Serial::default(),
        }
    }

    /// Copy a ROM image into the cartridge window starting at address 0.
    ///
    /// Images larger than 32 KiB are rejected before anything is written.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), EmuError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(EmuError::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }

        let start = ROM_BANK_START as usize;
        self.bytes[start..start + rom.len()].copy_from_slice(rom);
        log::info!("Loaded {} byte ROM image", rom.len());
        Ok(())
    }

    /// Copy `data` into memory starting at `addr`, wrapping at 0xFFFF.
    ///
    /// Bypasses the serial side channel.
    pub fn load_bytes(&mut self, addr: u16, data: &[u8]) {
        let mut addr = addr;
        for &byte in data {
            self.bytes[translate(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    #[inline]
    pub fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[translate(addr)]
    }

    #[inline]
    pub fn write_byte(&mut self, addr: u16, value: u8) {
        if addr == SERIAL_CONTROL {
            self.write_serial_control(value);
            return;
        }
        self.bytes[translate(addr)] = value;
    }

    /// Little-endian 16-bit read: low byte at `addr`, high byte at `addr + 1`.
    #[inline]
    pub fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read_byte(addr);
        let hi = self.read_byte(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    #[inline]
    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(addr, lo);
        self.write_byte(addr.wrapping_add(1), hi);
    }

    /// Peek the opcode at `pc` and the two bytes after it.
    #[inline]
    pub fn fetch_instruction(&self, pc: u16) -> FetchedInstruction {
        FetchedInstruction {
            opcode: self.read_byte(pc),
            operands: [
                self.read_byte(pc.wrapping_add(1)),
                self.read_byte(pc.wrapping_add(2)),
            ],
        }
    }

    /// Bytes written out over the serial port since the last drain.
    pub fn serial_output(&self) -> &[u8] {
        &self.serial.output
    }

    pub fn take_serial_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.serial.output)
    }

    fn write_serial_control(&mut self, value: u8) {
        let data = self.bytes[SERIAL_DATA as usize];
        let stored = self.serial.write_control(value, data);
        self.bytes[SERIAL_CONTROL as usize] = stored;
    }
}
