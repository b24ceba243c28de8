//! Opcode handlers.
//!
//! Every handler has the [`Handler`](super::Handler) shape
//! `fn(&mut Cpu, &mut Memory, opcode) -> T-cycles` so it can sit in the
//! instruction table. On entry PC already points past the opcode byte;
//! handlers consume their own immediate operands.

mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;
