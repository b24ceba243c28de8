use thiserror::Error;

/// Fatal conditions raised by the emulation core.
///
/// Neither variant is recoverable: the host is expected to stop stepping the
/// machine and report the condition.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EmuError {
    /// The ROM image does not fit in the fixed cartridge window below VRAM.
    #[error("ROM is {size} bytes, larger than the {max}-byte cartridge window")]
    RomTooLarge { size: usize, max: usize },

    /// The byte at `pc` does not decode to any instruction.
    #[error("unimplemented opcode 0x{opcode:02X} at PC=0x{pc:04X}")]
    UnimplementedOpcode { opcode: u8, pc: u16 },
}
