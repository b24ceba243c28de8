pub mod clock;
pub mod cpu;
pub mod error;
pub mod machine;
pub mod memory;
pub mod trace;

pub use clock::Clock;
pub use cpu::Cpu;
pub use error::EmuError;
pub use machine::{FrameOutcome, GameBoy, CYCLES_PER_FRAME};
pub use memory::Memory;
pub use trace::{LogTracer, Tracer};
