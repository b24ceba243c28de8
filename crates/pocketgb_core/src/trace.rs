use crate::clock::Clock;
use crate::cpu::{Instruction, Registers};
use crate::memory::FetchedInstruction;

/// Observer invoked by the CPU around every executed instruction.
///
/// Both hooks default to doing nothing so implementors only override what
/// they need. Hooks are not called for steps that fail to decode, nor while
/// the CPU is halted or stopped.
pub trait Tracer {
    /// Called after decode, before the instruction runs. `regs` reflects the
    /// state the instruction will see (PC still points at the opcode).
    fn before_step(
        &mut self,
        _pc: u16,
        _fetched: &FetchedInstruction,
        _instruction: &Instruction,
        _regs: &Registers,
    ) {
    }

    /// Called after the instruction has run and its cycles were counted.
    fn after_step(&mut self, _regs: &Registers, _clock: &Clock, _cycles: u32) {}
}

/// Tracer that writes one `trace`-level log line per instruction.
#[derive(Debug, Default)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn before_step(
        &mut self,
        pc: u16,
        fetched: &FetchedInstruction,
        instruction: &Instruction,
        regs: &Registers,
    ) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }

        let raw = match instruction.length {
            1 => format!("{:02X}", fetched.opcode),
            2 => format!("{:02X} {:02X}", fetched.opcode, fetched.operands[0]),
            _ => format!(
                "{:02X} {:02X} {:02X}",
                fetched.opcode, fetched.operands[0], fetched.operands[1]
            ),
        };
        log::trace!(
            "PC={pc:04X} {raw:<8} {asm:<14} AF={af:04X} BC={bc:04X} DE={de:04X} HL={hl:04X} SP={sp:04X}",
            asm = disassemble(instruction, fetched),
            af = regs.af(),
            bc = regs.bc(),
            de = regs.de(),
            hl = regs.hl(),
            sp = regs.sp,
        );
    }
}

/// Render an instruction with its operand placeholders filled in.
///
/// Relative jumps show the signed displacement, not the target address.
/// CB-prefixed instructions are decoded from the byte after the prefix.
pub fn disassemble(instruction: &Instruction, fetched: &FetchedInstruction) -> String {
    if fetched.opcode == 0xCB {
        return cb_mnemonic(fetched.imm8());
    }

    let mnemonic = instruction.mnemonic;
    if mnemonic.contains("d16") {
        mnemonic.replace("d16", &format!("${:04X}", fetched.imm16()))
    } else if mnemonic.contains("a16") {
        mnemonic.replace("a16", &format!("${:04X}", fetched.imm16()))
    } else if mnemonic.contains("d8") {
        mnemonic.replace("d8", &format!("${:02X}", fetched.imm8()))
    } else if mnemonic.contains("a8") {
        mnemonic.replace("a8", &format!("$FF{:02X}", fetched.imm8()))
    } else if mnemonic.contains("+r8") {
        mnemonic.replace("+r8", &format!("{:+}", fetched.imm8() as i8))
    } else if mnemonic.contains("r8") {
        mnemonic.replace("r8", &(fetched.imm8() as i8).to_string())
    } else {
        mnemonic.to_string()
    }
}

/// Mnemonic for a CB-page sub-opcode, e.g. `BIT 7,H` or `SWAP (HL)`.
pub fn cb_mnemonic(sub_opcode: u8) -> String {
    const REGS: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];

    let y = (sub_opcode >> 3) & 0x07;
    let reg = REGS[(sub_opcode & 0x07) as usize];
    match sub_opcode >> 6 {
        0 => format!("{} {reg}", crate::cpu::CB_SHIFT_MNEMONICS[y as usize]),
        1 => format!("BIT {y},{reg}"),
        2 => format!("RES {y},{reg}"),
        _ => format!("SET {y},{reg}"),
    }
}
